//! Demo courses written on first start.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::{current_date_label, Course, CourseId, Slide, SlideId};

/// 400x300 title card as an embedded SVG data URL.
pub fn title_card(background: &str, foreground: &str, heading: &str, caption: &str) -> String {
    let svg = format!(
        r##"<svg width="400" height="300" viewBox="0 0 400 300" fill="none" xmlns="http://www.w3.org/2000/svg"><rect width="400" height="300" fill="{background}"/><text x="200" y="130" fill="{foreground}" font-size="32" text-anchor="middle" font-family="Arial" font-weight="bold">{heading}</text><text x="200" y="190" fill="{foreground}" font-size="16" text-anchor="middle" font-family="Arial">{caption}</text></svg>"##
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn slide(id: &str, image_path: String, description: &str) -> Slide {
    Slide {
        id: SlideId::from(id),
        image_path,
        description: description.to_string(),
    }
}

pub fn sample_courses() -> Vec<Course> {
    let today = current_date_label();
    vec![
        Course {
            id: CourseId::from("course_web_basics"),
            title: "Introduction to Web Development".to_string(),
            slides: vec![
                slide(
                    "slide1",
                    title_card("#4F46E5", "white", "Web Basics", "HTML / CSS / JavaScript"),
                    "Modern websites are built from three technologies: HTML for structure, \
                     CSS for presentation and JavaScript for behaviour.",
                ),
                slide(
                    "slide2",
                    title_card("#E34F26", "white", "HTML", "Document structure"),
                    "HTML (HyperText Markup Language) defines the structure of a page. Tags \
                     mark up headings, paragraphs, links and images.",
                ),
                slide(
                    "slide3",
                    title_card("#1572B6", "white", "CSS", "Styling and layout"),
                    "CSS (Cascading Style Sheets) decorates HTML elements: colours, fonts, \
                     layout and animation.",
                ),
            ],
            last_updated: today.clone(),
        },
        Course {
            id: CourseId::from("course_javascript"),
            title: "JavaScript Programming Basics".to_string(),
            slides: vec![slide(
                "slide1",
                title_card("#F7DF1E", "#333333", "JavaScript", "Events, variables, objects"),
                "JavaScript adds dynamic behaviour to web pages, reacting to user input and \
                 processing data.",
            )],
            last_updated: today,
        },
    ]
}
