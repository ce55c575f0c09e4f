use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    EmptyCourse,
    UnsupportedMediaKind,
    MalformedImport,
    RenderFailure,
    NoActiveDraft,
    InvalidCredentials,
    Validation,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnError {
    #[error("{kind} '{id}' was not found")]
    NotFound { kind: &'static str, id: String },
    #[error("this action requires the {required} role")]
    Unauthorized { required: Role },
    #[error("course '{course_id}' has no slides")]
    EmptyCourse { course_id: String },
    #[error("{name} is not an image file (declared type: {declared})")]
    UnsupportedMediaKind { name: String, declared: String },
    #[error("import payload is malformed: {0}")]
    MalformedImport(String),
    #[error("slide {slide_id} could not be rendered: {reason}")]
    RenderFailure { slide_id: String, reason: String },
    #[error("no course is currently being edited")]
    NoActiveDraft,
    #[error("user id, password or role is incorrect")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl LearnError {
    pub fn course_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "course",
            id: id.into(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::EmptyCourse { .. } => ErrorCode::EmptyCourse,
            Self::UnsupportedMediaKind { .. } => ErrorCode::UnsupportedMediaKind,
            Self::MalformedImport(_) => ErrorCode::MalformedImport,
            Self::RenderFailure { .. } => ErrorCode::RenderFailure,
            Self::NoActiveDraft => ErrorCode::NoActiveDraft,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::Validation(_) => ErrorCode::Validation,
            Self::Storage(_) => ErrorCode::Internal,
        }
    }

    /// Whether the failure can be handled without telling the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RenderFailure { .. })
    }
}

/// User-facing form of a [`LearnError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&LearnError> for ErrorReport {
    fn from(value: &LearnError) -> Self {
        Self::new(value.code(), value.to_string())
    }
}

impl From<LearnError> for ErrorReport {
    fn from(value: LearnError) -> Self {
        Self::from(&value)
    }
}
