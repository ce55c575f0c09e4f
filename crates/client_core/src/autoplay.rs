//! Async host for [`SlideshowEngine`]: owns the recurring autoplay timer and
//! broadcasts state changes to whatever renders them.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Course, SlideId},
    error::LearnError,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    session::AccessGate,
    slideshow::{ImageSource, Key, KeyOutcome, PlaybackState, SlideView, SlideshowEngine, TickOutcome},
};

pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq)]
pub enum SlideshowEvent {
    SlideChanged(SlideView),
    AutoplayChanged(bool),
    Stopped,
}

pub struct SlideshowController {
    engine: Arc<Mutex<SlideshowEngine>>,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<SlideshowEvent>,
}

impl Default for SlideshowController {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOPLAY_INTERVAL)
    }
}

impl SlideshowController {
    pub fn new(interval: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            engine: Arc::new(Mutex::new(SlideshowEngine::new())),
            interval,
            timer: Mutex::new(None),
            events,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SlideshowEvent> {
        self.events.subscribe()
    }

    /// The running timer is only cancelled once the engine has accepted the
    /// course, or when a failed start has left it Idle.
    pub async fn start(&self, gate: &dyn AccessGate, course: Course) -> Result<SlideView, LearnError> {
        let mut engine = self.engine.lock().await;
        let was_active = engine.state() != PlaybackState::Idle;
        match engine.start(gate, course) {
            Ok(view) => {
                self.cancel_timer().await;
                drop(engine);
                let _ = self.events.send(SlideshowEvent::SlideChanged(view.clone()));
                Ok(view)
            }
            Err(err) => {
                if was_active && engine.state() == PlaybackState::Idle {
                    self.cancel_timer().await;
                    drop(engine);
                    let _ = self.events.send(SlideshowEvent::Stopped);
                }
                Err(err)
            }
        }
    }

    pub async fn state(&self) -> PlaybackState {
        self.engine.lock().await.state()
    }

    pub async fn view(&self) -> Option<SlideView> {
        self.engine.lock().await.view()
    }

    pub async fn next(&self) -> bool {
        self.navigate(SlideshowEngine::next).await
    }

    pub async fn previous(&self) -> bool {
        self.navigate(SlideshowEngine::previous).await
    }

    pub async fn go_to(&self, index: usize) -> bool {
        self.navigate(|engine| engine.go_to(index)).await
    }

    pub async fn go_to_first(&self) -> bool {
        self.navigate(SlideshowEngine::go_to_first).await
    }

    pub async fn go_to_last(&self) -> bool {
        self.navigate(SlideshowEngine::go_to_last).await
    }

    /// Starts or cancels the recurring timer. Returns the new autoplay flag,
    /// or `None` while idle.
    pub async fn toggle_autoplay(&self) -> Option<bool> {
        let active = self.engine.lock().await.toggle_autoplay()?;
        if active {
            let handle = self.spawn_timer();
            if let Some(previous) = self.timer.lock().await.replace(handle) {
                previous.abort();
            }
            info!(interval_ms = self.interval.as_millis() as u64, "autoplay started");
        } else {
            self.cancel_timer().await;
            info!("autoplay stopped");
        }
        let _ = self.events.send(SlideshowEvent::AutoplayChanged(active));
        Some(active)
    }

    pub async fn handle_key(&self, key: Key) -> KeyOutcome {
        let (outcome, view) = {
            let mut engine = self.engine.lock().await;
            let outcome = engine.handle_key(key);
            (outcome, engine.view())
        };
        match outcome {
            KeyOutcome::Ignored => {}
            KeyOutcome::Handled => {
                if let Some(view) = view {
                    let _ = self.events.send(SlideshowEvent::SlideChanged(view));
                }
            }
            KeyOutcome::Exit => {
                self.cancel_timer().await;
                let _ = self.events.send(SlideshowEvent::Stopped);
            }
        }
        outcome
    }

    /// No-op unless `slide_id` is still the slide on screen.
    pub async fn report_render_failure(&self, slide_id: &SlideId, reason: &str) -> Option<ImageSource> {
        let (placeholder, view) = {
            let mut engine = self.engine.lock().await;
            let placeholder = engine.report_render_failure(slide_id, reason)?;
            (placeholder, engine.view())
        };
        if let Some(view) = view {
            let _ = self.events.send(SlideshowEvent::SlideChanged(view));
        }
        Some(placeholder)
    }

    pub async fn set_foreground(&self, foreground: bool) {
        let was_playing = {
            let mut engine = self.engine.lock().await;
            let was_playing = engine.state() != PlaybackState::Idle;
            engine.set_foreground(foreground);
            was_playing && engine.state() == PlaybackState::Idle
        };
        if was_playing {
            self.cancel_timer().await;
            let _ = self.events.send(SlideshowEvent::Stopped);
        }
    }

    /// Cancels the timer and clears playback. No tick fires afterwards.
    pub async fn stop(&self) {
        self.cancel_timer().await;
        let was_active = {
            let mut engine = self.engine.lock().await;
            let was_active = engine.state() != PlaybackState::Idle;
            engine.stop();
            was_active
        };
        if was_active {
            let _ = self.events.send(SlideshowEvent::Stopped);
        }
    }

    async fn navigate(&self, step: impl FnOnce(&mut SlideshowEngine) -> bool) -> bool {
        let view = {
            let mut engine = self.engine.lock().await;
            if !step(&mut *engine) {
                return false;
            }
            engine.view()
        };
        if let Some(view) = view {
            let _ = self.events.send(SlideshowEvent::SlideChanged(view));
        }
        true
    }

    async fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
            debug!("autoplay timer cancelled");
        }
    }

    fn spawn_timer(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let period = self.interval;
        let first_tick = Instant::now() + period;
        tokio::spawn(async move {
            let mut ticker = time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let (outcome, view) = {
                    let mut engine = engine.lock().await;
                    let outcome = engine.tick();
                    (outcome, engine.view())
                };
                match outcome {
                    TickOutcome::Advanced => {
                        if let Some(view) = view {
                            let _ = events.send(SlideshowEvent::SlideChanged(view));
                        }
                    }
                    TickOutcome::Stopped => {
                        let _ = events.send(SlideshowEvent::AutoplayChanged(false));
                        break;
                    }
                    TickOutcome::Inactive => break,
                }
            }
        })
    }
}

impl Drop for SlideshowController {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/autoplay_tests.rs"]
mod tests;
