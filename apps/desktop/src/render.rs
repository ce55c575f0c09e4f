//! Plain-text rendering of course lists and slide views.

use client_core::{media::is_data_url, ImageSource, SlideView};
use shared::{domain::Course, error::ErrorReport};

const NO_DESCRIPTION: &str = "(no description for this slide)";
const PROGRESS_WIDTH: usize = 30;

pub fn course_line(course: &Course) -> String {
    let updated = if course.last_updated.is_empty() {
        "never"
    } else {
        course.last_updated.as_str()
    };
    format!(
        "{}  {}  [{} slide(s), updated {}]",
        course.id,
        course.title,
        course.slide_count(),
        updated
    )
}

pub fn image_label(path: &str) -> String {
    if is_data_url(path) {
        let kind = path
            .trim_start_matches("data:")
            .split([';', ','])
            .next()
            .unwrap_or("unknown");
        format!("<embedded {kind}, {} chars>", path.len())
    } else {
        path.to_string()
    }
}

/// Why the terminal cannot show `path`. Embedded payloads, remote URLs and
/// existing local files are fine.
pub fn image_problem(path: &str) -> Option<String> {
    if is_data_url(path) {
        return match path.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => None,
            _ => Some("embedded image has no payload".to_string()),
        };
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return None;
    }
    if std::path::Path::new(path).is_file() {
        None
    } else {
        Some(format!("{path} not found"))
    }
}

pub fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        fraction * 100.0
    )
}

pub fn slide_view(view: &SlideView) -> String {
    let image = match &view.image {
        ImageSource::Original(path) => image_label(path),
        ImageSource::Placeholder(_) => "<placeholder: image unavailable>".to_string(),
    };
    let description = if view.description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        view.description.as_str()
    };
    let prev = if view.can_go_previous { "<prev" } else { "     " };
    let next = if view.can_go_next { "next>" } else { "     " };
    let autoplay = if view.autoplay_active { "ON" } else { "OFF" };
    format!(
        "== {} ==  {}\n{}\nimage: {}\n{}\n{}  {}  autoplay: {}",
        view.course_title,
        view.counter_label,
        progress_bar(view.progress_fraction),
        image,
        description,
        prev,
        next,
        autoplay
    )
}

pub fn error(report: &ErrorReport) -> String {
    format!("error [{:?}]: {}", report.code, report.message)
}
