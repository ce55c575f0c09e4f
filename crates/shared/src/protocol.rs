use serde::{Deserialize, Serialize};

use crate::domain::{Course, Session};

/// Storage key holding the serialized course collection.
pub const COURSES_KEY: &str = "courses";
/// Storage key holding the serialized active session.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Import/export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub current_user: Option<Session>,
}
