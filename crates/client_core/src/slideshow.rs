//! Pure slideshow state machine. No timers and no rendering: the
//! controller in [`crate::autoplay`] drives ticks, renderers read
//! [`SlideView`] snapshots.

use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::{
    domain::{Course, Role, SlideId},
    error::LearnError,
};
use tracing::{debug, info, warn};

use crate::session::{authorize, AccessGate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Ready,
    Autoplaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Space,
    Home,
    End,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not foregrounded, no listeners, or an unmapped key.
    Ignored,
    Handled,
    /// Playback was torn down; the host returns to the course list.
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// Reached the last slide; autoplay switched itself off.
    Stopped,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Original(String),
    Placeholder(String),
}

impl ImageSource {
    pub fn path(&self) -> &str {
        match self {
            ImageSource::Original(path) | ImageSource::Placeholder(path) => path,
        }
    }
}

/// Display values recomputed after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideView {
    pub course_title: String,
    pub slide_id: SlideId,
    pub index: usize,
    pub slide_count: usize,
    pub image: ImageSource,
    pub description: String,
    pub progress_fraction: f64,
    pub counter_label: String,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub autoplay_active: bool,
}

#[derive(Debug)]
struct Playback {
    course: Course,
    index: usize,
    autoplay: bool,
    failed_images: HashSet<usize>,
}

impl Playback {
    fn last_index(&self) -> usize {
        self.course.slides.len() - 1
    }
}

#[derive(Debug, Default)]
pub struct SlideshowEngine {
    playback: Option<Playback>,
    foreground: bool,
    listening: bool,
}

impl SlideshowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        match &self.playback {
            None => PlaybackState::Idle,
            Some(p) if p.autoplay => PlaybackState::Autoplaying,
            Some(_) => PlaybackState::Ready,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.playback.as_ref().map(|p| p.index)
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Enters Ready at slide 0 and brings the view to the foreground.
    ///
    /// A failed role check changes nothing. An empty course tears down any
    /// current playback, leaving the engine Idle.
    pub fn start(&mut self, gate: &dyn AccessGate, course: Course) -> Result<SlideView, LearnError> {
        authorize(gate, Role::Student)?;
        let course_id = course.id.to_string();
        if course.slides.is_empty() {
            self.stop();
            return Err(LearnError::EmptyCourse { course_id });
        }
        if self.playback.is_some() {
            self.stop();
        }
        info!(course = %course.id, slides = course.slides.len(), "slideshow started");
        self.playback = Some(Playback {
            course,
            index: 0,
            autoplay: false,
            failed_images: HashSet::new(),
        });
        self.foreground = true;
        self.listening = true;
        self.view().ok_or(LearnError::EmptyCourse { course_id })
    }

    pub fn next(&mut self) -> bool {
        let Some(p) = self.playback.as_mut() else {
            return false;
        };
        if p.index >= p.last_index() {
            return false;
        }
        p.index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        let Some(p) = self.playback.as_mut() else {
            return false;
        };
        if p.index == 0 {
            return false;
        }
        p.index -= 1;
        true
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        let Some(p) = self.playback.as_mut() else {
            return false;
        };
        if index > p.last_index() {
            return false;
        }
        p.index = index;
        true
    }

    pub fn go_to_first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn go_to_last(&mut self) -> bool {
        match self.playback.as_ref().map(Playback::last_index) {
            Some(last) => self.go_to(last),
            None => false,
        }
    }

    /// Flips autoplay; returns the new flag, or `None` when idle.
    pub fn toggle_autoplay(&mut self) -> Option<bool> {
        let p = self.playback.as_mut()?;
        p.autoplay = !p.autoplay;
        debug!(course = %p.course.id, active = p.autoplay, "autoplay toggled");
        Some(p.autoplay)
    }

    /// One autoplay timer tick. Never wraps to the first slide.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(p) = self.playback.as_mut() else {
            return TickOutcome::Inactive;
        };
        if !p.autoplay {
            return TickOutcome::Inactive;
        }
        if p.index < p.last_index() {
            p.index += 1;
            TickOutcome::Advanced
        } else {
            p.autoplay = false;
            info!(course = %p.course.id, "autoplay reached the last slide");
            TickOutcome::Stopped
        }
    }

    /// Tears playback down; safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(p) = self.playback.take() {
            info!(course = %p.course.id, "slideshow stopped");
        }
        self.listening = false;
        self.foreground = false;
    }

    /// Hiding the view ends playback.
    pub fn set_foreground(&mut self, foreground: bool) {
        if !foreground && self.playback.is_some() {
            self.stop();
        }
        self.foreground = foreground;
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if !self.foreground || !self.listening || self.playback.is_none() {
            return KeyOutcome::Ignored;
        }
        match key {
            Key::ArrowLeft | Key::ArrowUp => {
                self.previous();
            }
            Key::ArrowRight | Key::ArrowDown | Key::Space => {
                self.next();
            }
            Key::Home => {
                self.go_to_first();
            }
            Key::End => {
                self.go_to_last();
            }
            Key::Escape => {
                self.stop();
                return KeyOutcome::Exit;
            }
            Key::Other => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    /// Records that `slide_id`'s image could not be shown; later views of it
    /// carry a placeholder instead. Returns `None` unless that slide is the
    /// one currently on screen.
    pub fn report_render_failure(&mut self, slide_id: &SlideId, reason: &str) -> Option<ImageSource> {
        let p = self.playback.as_mut()?;
        let slide = p.course.slides.get(p.index)?;
        if &slide.id != slide_id {
            debug!(slide = %slide_id, "render failure for a slide no longer shown");
            return None;
        }
        let err = LearnError::RenderFailure {
            slide_id: slide.id.to_string(),
            reason: reason.to_string(),
        };
        warn!(course = %p.course.id, error = %err, "substituting placeholder image");
        p.failed_images.insert(p.index);
        Some(ImageSource::Placeholder(placeholder_image(p.index + 1)))
    }

    pub fn view(&self) -> Option<SlideView> {
        let p = self.playback.as_ref()?;
        let slide = p.course.slides.get(p.index)?;
        let slide_count = p.course.slides.len();
        let image = if p.failed_images.contains(&p.index) {
            ImageSource::Placeholder(placeholder_image(p.index + 1))
        } else {
            ImageSource::Original(slide.image_path.clone())
        };
        Some(SlideView {
            course_title: p.course.title.clone(),
            slide_id: slide.id.clone(),
            index: p.index,
            slide_count,
            image,
            description: slide.description.clone(),
            progress_fraction: (p.index + 1) as f64 / slide_count as f64,
            counter_label: format!("{} / {}", p.index + 1, slide_count),
            can_go_previous: p.index > 0,
            can_go_next: p.index < slide_count - 1,
            autoplay_active: p.autoplay,
        })
    }
}

/// Grey "Slide N" card as an SVG data URL.
pub fn placeholder_image(slide_number: usize) -> String {
    let svg = format!(
        r##"<svg width="400" height="300" viewBox="0 0 400 300" xmlns="http://www.w3.org/2000/svg"><rect width="400" height="300" fill="#E5E7EB"/><text x="200" y="150" fill="#6B7280" font-size="24" text-anchor="middle" font-family="Arial">Slide {slide_number}</text></svg>"##
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

#[cfg(test)]
#[path = "tests/slideshow_tests.rs"]
mod tests;
