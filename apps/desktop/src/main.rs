mod authoring;
mod config;
mod console;
mod player;
mod render;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{transfer, CourseCatalog, SessionGate, SessionState};
use console::Console;
use shared::{
    domain::{CourseId, Role},
    error::{ErrorReport, LearnError},
};
use storage::{CourseStore, KeyValueStore, SessionStore, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "elearn", about = "Slide-based courses: author as admin, play as student")]
struct Cli {
    /// Overrides the configured database location.
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        user: String,
        /// Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value_t = Role::Student)]
        role: Role,
    },
    Logout,
    Whoami,
    /// Lists the courses visible to the current session.
    Courses,
    CreateCourse {
        title: String,
    },
    DeleteCourse {
        course_id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Opens an interactive draft editor for a course.
    Edit {
        course_id: String,
    },
    /// Plays a course in the terminal.
    Play {
        course_id: String,
    },
    Export {
        /// Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Import {
        file: PathBuf,
    },
    /// Loads the sample courses if the collection is empty.
    Seed,
    ResetSample {
        #[arg(long)]
        yes: bool,
    },
    ClearAll {
        #[arg(long)]
        yes: bool,
    },
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<LearnError>() {
                Some(learn) => eprintln!("{}", render::error(&ErrorReport::from(learn))),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = config::load_settings();
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }
    let database_url = config::prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open {database_url}"))?;

    let courses = CourseStore::new(storage.clone());
    if settings.seed_sample_data && courses.seed_sample_data().await? {
        info!("sample courses loaded into empty collection");
    }
    let sessions = SessionStore::new(storage.clone());
    let mut gate = SessionGate::restore(sessions.clone()).await?;
    let catalog = CourseCatalog::new(courses);
    let mut console = Console::new();

    match cli.command {
        Command::Login {
            user,
            password,
            role,
        } => {
            let password = match password {
                Some(password) => password,
                None => console.prompt("password: ").await?.unwrap_or_default(),
            };
            let session = gate.login(&user, &password, role).await?;
            println!("logged in as {} ({})", session.display_name, session.role);
        }
        Command::Logout => {
            gate.logout().await?;
            println!("logged out");
        }
        Command::Whoami => match gate.state() {
            SessionState::Active(session) => println!(
                "{} ({}, {})",
                session.display_name, session.user_id, session.role
            ),
            SessionState::LoggedOut => println!("not logged in"),
        },
        Command::Courses => {
            let list = if is_admin(gate.state()) {
                catalog.list_for_admin(&gate).await?
            } else {
                catalog.list_for_student(&gate).await?
            };
            if list.is_empty() {
                println!("no courses");
            }
            for course in &list {
                println!("{}", render::course_line(course));
            }
        }
        Command::CreateCourse { title } => {
            let course = catalog.create_course(&gate, &title).await?;
            println!("created {}", render::course_line(&course));
        }
        Command::DeleteCourse { course_id, yes } => {
            let id = CourseId::from(course_id.as_str());
            let course = catalog.open_for_edit(&gate, &id).await?;
            let question = format!(
                "Delete \"{}\" and its {} slide(s)?",
                course.title,
                course.slide_count()
            );
            if yes || console.confirm(&question).await? {
                catalog.delete_course(&gate, &id).await?;
                println!("deleted {id}");
            } else {
                println!("cancelled");
            }
        }
        Command::Edit { course_id } => {
            let id = CourseId::from(course_id.as_str());
            authoring::run(&gate, &catalog, &id, &mut console).await?;
        }
        Command::Play { course_id } => {
            let id = CourseId::from(course_id.as_str());
            player::run(
                &gate,
                &catalog,
                &id,
                settings.autoplay_interval(),
                &mut console,
            )
            .await?;
        }
        Command::Export { output } => {
            let document = transfer::export(catalog.store(), &sessions).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, document)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{document}"),
            }
        }
        Command::Import { file } => {
            let payload = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let count = transfer::import(catalog.store(), &payload).await?;
            println!("imported {count} course(s)");
        }
        Command::Seed => {
            if catalog.store().seed_sample_data().await? {
                println!("sample courses loaded");
            } else {
                println!("collection is not empty; nothing seeded");
            }
        }
        Command::ResetSample { yes } => {
            if yes || console.confirm("Replace every course with the samples?").await? {
                catalog.store().reset_sample_data().await?;
                println!("sample courses restored");
            } else {
                println!("cancelled");
            }
        }
        Command::ClearAll { yes } => {
            if yes || console.confirm("Erase all courses and the saved session?").await? {
                storage.clear().await?;
                println!("all data cleared");
            } else {
                println!("cancelled");
            }
        }
        Command::Status => {
            storage.health_check().await?;
            let status = catalog.store().status().await?;
            println!("database: {database_url}");
            match gate.state() {
                SessionState::Active(session) => {
                    println!("session: {} ({})", session.user_id, session.role)
                }
                SessionState::LoggedOut => println!("session: none"),
            }
            println!(
                "courses: {}  stored: {} chars",
                status.course_count, status.storage_chars
            );
            for (title, slides) in &status.slide_counts {
                println!("  {title}: {slides} slide(s)");
            }
        }
    }
    Ok(())
}

fn is_admin(state: &SessionState) -> bool {
    matches!(state, SessionState::Active(session) if session.role == Role::Admin)
}
