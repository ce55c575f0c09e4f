//! JSON import/export of the whole persisted state.

use serde_json::Value;
use shared::{domain::Course, error::LearnError, protocol::DataExport};
use storage::{CourseStore, KeyValueStore, SessionStore};
use tracing::info;

pub async fn export<S: KeyValueStore>(
    courses: &CourseStore<S>,
    sessions: &SessionStore<S>,
) -> Result<String, LearnError> {
    let document = DataExport {
        courses: courses.list().await.map_err(LearnError::storage)?,
        current_user: sessions.load().await.map_err(LearnError::storage)?,
    };
    serde_json::to_string_pretty(&document).map_err(LearnError::storage)
}

/// Parses an export document and replaces the stored collection with its
/// `courses`. The document's `currentUser` is ignored. Nothing is written
/// unless the whole payload parses.
pub async fn import<S: KeyValueStore>(
    courses: &CourseStore<S>,
    payload: &str,
) -> Result<usize, LearnError> {
    let parsed = parse_courses(payload)?;
    let count = parsed.len();
    courses.save(&parsed).await.map_err(LearnError::storage)?;
    info!(courses = count, "collection replaced by import");
    Ok(count)
}

fn parse_courses(payload: &str) -> Result<Vec<Course>, LearnError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| LearnError::MalformedImport(format!("not valid JSON: {e}")))?;
    let Value::Object(mut document) = value else {
        return Err(LearnError::MalformedImport(
            "expected a JSON object".to_string(),
        ));
    };
    let Some(courses) = document.remove("courses") else {
        return Err(LearnError::MalformedImport(
            "missing \"courses\" array".to_string(),
        ));
    };
    serde_json::from_value(courses)
        .map_err(|e| LearnError::MalformedImport(format!("invalid \"courses\": {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{Role, Session, Slide};
    use storage::MemoryStorage;

    fn stores() -> (CourseStore<MemoryStorage>, SessionStore<MemoryStorage>) {
        let kv = MemoryStorage::new();
        (CourseStore::new(kv.clone()), SessionStore::new(kv))
    }

    #[tokio::test]
    async fn import_fully_replaces_collection() {
        let (courses, _) = stores();
        courses.seed_sample_data().await.expect("seed");

        let mut imported = Course::new("Imported");
        imported.slides.push(Slide::new("x.png"));
        let payload = serde_json::json!({ "courses": [imported.clone()] }).to_string();

        assert_eq!(import(&courses, &payload).await.expect("import"), 1);
        assert_eq!(courses.list().await.expect("list"), vec![imported]);
    }

    #[tokio::test]
    async fn malformed_payloads_write_nothing() {
        let (courses, _) = stores();
        courses.seed_sample_data().await.expect("seed");
        let before = courses.raw().await.expect("raw");

        for payload in [
            "{not json",
            "[1, 2, 3]",
            r#"{"currentUser": null}"#,
            r#"{"courses": [{"title": "no id"}]}"#,
        ] {
            let err = import(&courses, payload).await.expect_err(payload);
            assert!(matches!(err, LearnError::MalformedImport(_)), "{payload}");
        }
        assert_eq!(courses.raw().await.expect("raw"), before);
    }

    #[tokio::test]
    async fn import_ignores_session_in_payload() {
        let (courses, sessions) = stores();
        let payload = r#"{"courses": [], "currentUser": {"userId": "admin", "role": "admin", "displayName": "x"}}"#;
        import(&courses, payload).await.expect("import");
        assert!(sessions.load().await.expect("load").is_none());
        assert!(courses.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn export_round_trips_through_import() {
        let (courses, sessions) = stores();
        courses.seed_sample_data().await.expect("seed");
        let session = Session {
            user_id: "admin".into(),
            role: Role::Admin,
            display_name: "Administrator".into(),
        };
        sessions.save(&session).await.expect("session");

        let exported = export(&courses, &sessions).await.expect("export");
        let document: DataExport = serde_json::from_str(&exported).expect("parse");
        assert_eq!(document.current_user, Some(session));
        assert_eq!(document.courses.len(), 2);

        let (target, _) = stores();
        import(&target, &exported).await.expect("import");
        assert_eq!(
            target.list().await.expect("list"),
            courses.list().await.expect("list")
        );
    }
}
