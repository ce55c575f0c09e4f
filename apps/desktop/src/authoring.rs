//! Interactive draft editor for one course.

use std::path::PathBuf;

use anyhow::Result;
use client_core::{CourseCatalog, EditingModel, MediaFile, SessionGate};
use shared::{domain::CourseId, error::LearnError};
use storage::{KeyValueStore, UpsertOutcome};

use crate::{console::Console, render};

const HELP: &str = "commands: list | add <path>... | desc <n> <text> | up <n> | down <n> | rm <n> | save | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum EditCommand {
    List,
    Add(Vec<PathBuf>),
    Describe { slide: usize, text: String },
    Up(usize),
    Down(usize),
    Remove(usize),
    Save,
    Quit,
    Help,
}

/// Parses one REPL line. Slide numbers are 1-based and come back 0-based.
pub fn parse_edit_command(line: &str) -> Result<EditCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let slide = |arg: &str| -> Result<usize, String> {
        match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("'{arg}' is not a slide number")),
        }
    };

    match verb {
        "list" | "ls" => Ok(EditCommand::List),
        "add" if !rest.is_empty() => Ok(EditCommand::Add(
            rest.split_whitespace().map(PathBuf::from).collect(),
        )),
        "add" => Err("add needs at least one image path".to_string()),
        "desc" => {
            let (n, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Ok(EditCommand::Describe {
                slide: slide(n)?,
                text: text.trim().to_string(),
            })
        }
        "up" => Ok(EditCommand::Up(slide(rest)?)),
        "down" => Ok(EditCommand::Down(slide(rest)?)),
        "rm" => Ok(EditCommand::Remove(slide(rest)?)),
        "save" => Ok(EditCommand::Save),
        "quit" | "exit" | "q" => Ok(EditCommand::Quit),
        "help" | "?" | "" => Ok(EditCommand::Help),
        other => Err(format!("unknown command '{other}'")),
    }
}

pub async fn run<S: KeyValueStore>(
    gate: &SessionGate<S>,
    catalog: &CourseCatalog<S>,
    course_id: &CourseId,
    console: &mut Console,
) -> Result<()> {
    let course = catalog.open_for_edit(gate, course_id).await?;
    let mut editor = EditingModel::new();
    editor.begin_edit(gate, course)?;
    println!("{HELP}");
    print_slides(&editor);

    while let Some(line) = console.prompt("edit> ").await? {
        let command = match parse_edit_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        let outcome = match command {
            EditCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            EditCommand::List => {
                print_slides(&editor);
                Ok(())
            }
            EditCommand::Add(paths) => {
                for path in paths {
                    match MediaFile::load(&path).await {
                        Ok(file) => match editor.add_slide(gate, &file) {
                            Ok(_) => println!(
                                "added {} ({})",
                                file.name,
                                client_core::media::format_file_size(file.bytes.len() as u64)
                            ),
                            Err(err) => println!("{}", render::error(&err.into())),
                        },
                        Err(err) => println!("skipped {}: {err:#}", path.display()),
                    }
                }
                Ok(())
            }
            EditCommand::Describe { slide, text } => {
                report_change(editor.update_description(gate, slide, text), "no such slide")
            }
            EditCommand::Up(slide) => {
                report_change(editor.move_up(gate, slide), "already at the top")
            }
            EditCommand::Down(slide) => {
                report_change(editor.move_down(gate, slide), "already at the bottom")
            }
            EditCommand::Remove(slide) => {
                if console
                    .confirm(&format!("Remove slide {}?", slide + 1))
                    .await?
                {
                    editor
                        .remove_slide(gate, slide)
                        .map(|removed| match removed {
                            Some(removed) => println!("removed slide {}", removed.id),
                            None => println!("no such slide"),
                        })
                } else {
                    Ok(())
                }
            }
            EditCommand::Save => match editor.commit(gate, catalog.store()).await {
                Ok((id, UpsertOutcome::Replaced)) => {
                    println!("saved {id}");
                    return Ok(());
                }
                Ok((id, UpsertOutcome::Inserted)) => {
                    println!("saved {id} as a new course");
                    return Ok(());
                }
                Err(err) => Err(err),
            },
            EditCommand::Quit => break,
        };
        if let Err(err) = outcome {
            println!("{}", render::error(&err.into()));
        }
    }

    if editor.discard().is_some() {
        println!("unsaved changes discarded");
    }
    Ok(())
}

fn report_change(result: Result<bool, LearnError>, unchanged: &str) -> Result<(), LearnError> {
    if !result? {
        println!("{unchanged}");
    }
    Ok(())
}

fn print_slides(editor: &EditingModel) {
    let Some(course) = editor.course() else {
        return;
    };
    println!("{} ({} slide(s))", course.title, course.slides.len());
    if course.slides.is_empty() {
        println!("  no slides yet; add images with `add <path>`");
    }
    for (i, slide) in course.slides.iter().enumerate() {
        println!(
            "  {:>2}. {}  {}",
            i + 1,
            render::image_label(&slide.image_path),
            slide.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_based_slide_numbers() {
        assert_eq!(parse_edit_command("up 2"), Ok(EditCommand::Up(1)));
        assert_eq!(parse_edit_command("rm 1"), Ok(EditCommand::Remove(0)));
        assert!(parse_edit_command("down 0").is_err());
        assert!(parse_edit_command("down x").is_err());
    }

    #[test]
    fn parses_descriptions_with_spaces() {
        assert_eq!(
            parse_edit_command("desc 3  borrow checker basics "),
            Ok(EditCommand::Describe {
                slide: 2,
                text: "borrow checker basics".into()
            })
        );
        assert_eq!(
            parse_edit_command("desc 1"),
            Ok(EditCommand::Describe {
                slide: 0,
                text: String::new()
            })
        );
    }

    #[test]
    fn parses_multiple_upload_paths() {
        assert_eq!(
            parse_edit_command("add a.png b.jpg"),
            Ok(EditCommand::Add(vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.jpg")
            ]))
        );
        assert!(parse_edit_command("add").is_err());
        assert!(parse_edit_command("frobnicate").is_err());
    }
}
