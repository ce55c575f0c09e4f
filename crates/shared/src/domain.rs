use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(CourseId, "course");
id_newtype!(SlideId, "slide");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}' (expected student or admin)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    /// Opaque URL or an embedded `data:` image.
    pub image_path: String,
    #[serde(default)]
    pub description: String,
}

impl Slide {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            id: SlideId::generate(),
            image_path: image_path.into(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub last_updated: String,
}

impl Course {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: CourseId::generate(),
            title: title.into(),
            slides: Vec::new(),
            last_updated: current_date_label(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn is_playable(&self) -> bool {
        !self.slides.is_empty()
    }

    pub fn touch(&mut self) {
        self.last_updated = current_date_label();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub display_name: String,
}

/// Local calendar date used for `Course::last_updated`.
pub fn current_date_label() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
