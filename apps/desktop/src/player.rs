//! Terminal slideshow: stdin lines act as key presses, a renderer task
//! prints every state change the controller broadcasts.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use client_core::{
    CourseCatalog, ImageSource, Key, KeyOutcome, SessionGate, SlideshowController,
    SlideshowEvent,
};
use shared::domain::CourseId;
use storage::KeyValueStore;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::{console::Console, render};

const HELP: &str = "keys: n/right, p/left, s/space, home, end, <number>, a (autoplay), q/esc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Key(Key),
    ToggleAutoplay,
    GoTo(usize),
    Help,
}

pub fn parse_player_input(line: &str) -> PlayerInput {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "" | "n" | "next" | "right" => PlayerInput::Key(Key::ArrowRight),
        "down" => PlayerInput::Key(Key::ArrowDown),
        "p" | "prev" | "left" => PlayerInput::Key(Key::ArrowLeft),
        "up" => PlayerInput::Key(Key::ArrowUp),
        "space" | "s" => PlayerInput::Key(Key::Space),
        "home" | "first" => PlayerInput::Key(Key::Home),
        "end" | "last" => PlayerInput::Key(Key::End),
        "q" | "quit" | "esc" | "escape" => PlayerInput::Key(Key::Escape),
        "a" | "auto" | "autoplay" => PlayerInput::ToggleAutoplay,
        "?" | "h" | "help" => PlayerInput::Help,
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => PlayerInput::GoTo(n - 1),
            _ => PlayerInput::Key(Key::Other),
        },
    }
}

pub async fn run<S: KeyValueStore>(
    gate: &SessionGate<S>,
    catalog: &CourseCatalog<S>,
    course_id: &CourseId,
    interval: Duration,
    console: &mut Console,
) -> Result<()> {
    let course = catalog.open_for_playback(gate, course_id).await?;
    let controller = Arc::new(SlideshowController::new(interval));
    let events = controller.subscribe();
    let renderer = tokio::spawn(render_events(Arc::clone(&controller), events));

    controller.start(gate, course).await?;
    println!("{HELP}");

    loop {
        let Some(line) = console.prompt("").await? else {
            controller.set_foreground(false).await;
            break;
        };
        match parse_player_input(&line) {
            PlayerInput::Key(key) => {
                if controller.handle_key(key).await == KeyOutcome::Exit {
                    break;
                }
            }
            PlayerInput::ToggleAutoplay => {
                controller.toggle_autoplay().await;
            }
            PlayerInput::GoTo(index) => {
                if !controller.go_to(index).await {
                    println!("no slide {}", index + 1);
                }
            }
            PlayerInput::Help => println!("{HELP}"),
        }
    }

    controller.stop().await;
    if let Err(err) = renderer.await {
        warn!(error = %err, "slideshow renderer ended abnormally");
    }
    Ok(())
}

async fn render_events(
    controller: Arc<SlideshowController>,
    mut events: broadcast::Receiver<SlideshowEvent>,
) {
    loop {
        match events.recv().await {
            Ok(SlideshowEvent::SlideChanged(view)) => {
                if let ImageSource::Original(path) = &view.image {
                    if let Some(reason) = render::image_problem(path) {
                        controller
                            .report_render_failure(&view.slide_id, &reason)
                            .await;
                        continue;
                    }
                }
                println!("\n{}", render::slide_view(&view));
            }
            Ok(SlideshowEvent::AutoplayChanged(active)) => {
                println!("autoplay {}", if active { "on" } else { "off" });
            }
            Ok(SlideshowEvent::Stopped) | Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "renderer lagged behind slideshow events");
            }
        }
    }
}
