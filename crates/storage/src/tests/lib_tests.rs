use super::*;
use shared::{
    domain::{Course, CourseId, Role, Session, Slide},
    protocol::COURSES_KEY,
};

fn course(id: &str, slides: usize) -> Course {
    Course {
        id: CourseId::from(id),
        title: format!("title {id}"),
        slides: (0..slides)
            .map(|i| Slide::new(format!("image-{i}.png")))
            .collect(),
        last_updated: "2024-01-01".to_string(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn sqlite_key_value_round_trip() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get("missing").await.expect("get"), None);

    storage.set("k", "v1").await.expect("set");
    storage.set("k", "v2").await.expect("overwrite");
    assert_eq!(storage.get("k").await.expect("get").as_deref(), Some("v2"));
    assert_eq!(storage.usage_chars().await.expect("usage"), 3);

    storage.remove("k").await.expect("remove");
    assert_eq!(storage.get("k").await.expect("get"), None);
}

#[tokio::test]
async fn memory_clear_drops_every_key() {
    let storage = MemoryStorage::new();
    storage.set("a", "1").await.expect("set");
    storage.set("b", "2").await.expect("set");
    storage.clear().await.expect("clear");
    assert_eq!(storage.usage_chars().await.expect("usage"), 0);
}

#[tokio::test]
async fn empty_store_lists_no_courses() {
    let store = CourseStore::new(MemoryStorage::new());
    assert!(store.list().await.expect("list").is_empty());
    assert!(store
        .get_by_id(&CourseId::from("nope"))
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
async fn unmodified_save_leaves_blob_identical() {
    let store = CourseStore::new(Storage::new("sqlite::memory:").await.expect("db"));
    store
        .save(&[course("a", 2), course("b", 0), course("c", 1)])
        .await
        .expect("save");
    let before = store.raw().await.expect("raw").expect("blob");

    let fetched = store
        .get_by_id(&CourseId::from("b"))
        .await
        .expect("lookup")
        .expect("course b");
    let mut all = store.list().await.expect("list");
    let slot = all.iter_mut().find(|c| c.id == fetched.id).expect("slot");
    *slot = fetched;
    store.save(&all).await.expect("save again");

    assert_eq!(store.raw().await.expect("raw").expect("blob"), before);
}

#[tokio::test]
async fn delete_is_a_noop_for_unknown_ids() {
    let store = CourseStore::new(MemoryStorage::new());
    store.save(&[course("a", 1)]).await.expect("save");

    assert!(!store.delete(&CourseId::from("zzz")).await.expect("delete"));
    assert_eq!(store.list().await.expect("list").len(), 1);

    assert!(store.delete(&CourseId::from("a")).await.expect("delete"));
    assert!(store.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn upsert_replaces_or_appends() {
    let store = CourseStore::new(MemoryStorage::new());
    store
        .save(&[course("a", 1), course("b", 1)])
        .await
        .expect("save");

    let mut edited = course("a", 3);
    edited.title = "renamed".into();
    assert_eq!(
        store.upsert(edited).await.expect("upsert"),
        UpsertOutcome::Replaced
    );
    let all = store.list().await.expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "renamed");
    assert_eq!(all[0].slides.len(), 3);

    assert_eq!(
        store.upsert(course("new", 0)).await.expect("upsert"),
        UpsertOutcome::Inserted
    );
    let all = store.list().await.expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, CourseId::from("new"));
}

#[tokio::test]
async fn update_only_touches_existing_entries() {
    let store = CourseStore::new(MemoryStorage::new());
    store.save(&[course("a", 1)]).await.expect("save");

    assert!(!store
        .update(&CourseId::from("missing"), course("missing", 0))
        .await
        .expect("update"));
    assert_eq!(store.list().await.expect("list").len(), 1);

    assert!(store
        .update(&CourseId::from("a"), course("a", 4))
        .await
        .expect("update"));
    assert_eq!(store.list().await.expect("list")[0].slides.len(), 4);
}

#[tokio::test]
async fn corrupt_blob_surfaces_an_error() {
    let kv = MemoryStorage::new();
    kv.set(shared::protocol::COURSES_KEY, "{not json")
        .await
        .expect("set");
    let store = CourseStore::new(kv);
    let err = store.list().await.expect_err("corrupt blob");
    assert!(err.to_string().contains("not valid JSON"));
}

#[tokio::test]
async fn sample_data_is_seeded_once() {
    let store = CourseStore::new(MemoryStorage::new());
    assert!(store.seed_sample_data().await.expect("seed"));
    let seeded = store.list().await.expect("list");
    assert_eq!(seeded.len(), 2);
    assert_eq!(seeded[0].slides.len(), 3);
    assert!(seeded[0].slides[0].image_path.starts_with("data:image/svg+xml;base64,"));

    store.delete(&seeded[1].id).await.expect("delete");
    assert!(!store.seed_sample_data().await.expect("second seed"));
    assert_eq!(store.list().await.expect("list").len(), 1);

    store.reset_sample_data().await.expect("reset");
    assert_eq!(store.list().await.expect("list").len(), 2);
}

/// Reads from memory, rejects every write.
struct ReadOnly(MemoryStorage);

#[async_trait]
impl KeyValueStore for ReadOnly {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.0.get(key).await
    }
    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("disk full")
    }
    async fn remove(&self, key: &str) -> Result<()> {
        self.0.remove(key).await
    }
    async fn clear(&self) -> Result<()> {
        self.0.clear().await
    }
    async fn usage_chars(&self) -> Result<usize> {
        self.0.usage_chars().await
    }
}

#[tokio::test]
async fn failed_reset_keeps_existing_collection() {
    let memory = MemoryStorage::new();
    CourseStore::new(memory.clone())
        .save(&[course("course_keep", 2)])
        .await
        .expect("save");
    let before = memory.get(COURSES_KEY).await.expect("get");

    let store = CourseStore::new(ReadOnly(memory.clone()));
    store.reset_sample_data().await.expect_err("write rejected");
    assert_eq!(memory.get(COURSES_KEY).await.expect("get"), before);
    assert_eq!(store.list().await.expect("list"), vec![course("course_keep", 2)]);
}

#[tokio::test]
async fn status_reports_counts_and_usage() {
    let store = CourseStore::new(MemoryStorage::new());
    store
        .save(&[course("a", 2), course("b", 0)])
        .await
        .expect("save");
    let status = store.status().await.expect("status");
    assert_eq!(status.course_count, 2);
    assert_eq!(
        status.slide_counts,
        vec![("title a".to_string(), 2), ("title b".to_string(), 0)]
    );
    let raw = store.raw().await.expect("raw").expect("blob");
    assert_eq!(
        status.storage_chars,
        shared::protocol::COURSES_KEY.len() + raw.chars().count()
    );
}

#[tokio::test]
async fn session_store_persists_and_clears() {
    let kv = MemoryStorage::new();
    let sessions = SessionStore::new(kv.clone());
    assert!(sessions.load().await.expect("load").is_none());

    let session = Session {
        user_id: "admin".into(),
        role: Role::Admin,
        display_name: "Administrator".into(),
    };
    sessions.save(&session).await.expect("save");
    assert_eq!(
        SessionStore::new(kv.clone()).load().await.expect("reload"),
        Some(session)
    );

    sessions.clear().await.expect("clear");
    assert!(sessions.load().await.expect("load").is_none());
}

#[test]
fn sqlite_path_ignores_memory_urls() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/app.db?mode=rwc"),
        Some(PathBuf::from("./data/app.db"))
    );
}

#[test]
fn normalizes_paths_into_sqlite_urls() {
    assert_eq!(
        normalize_sqlite_url("./data/test.db").as_deref(),
        Some("sqlite://./data/test.db")
    );
    assert_eq!(
        normalize_sqlite_url("sqlite:C:\\courses\\app.db").as_deref(),
        Some("sqlite://C:/courses/app.db")
    );
    assert_eq!(
        normalize_sqlite_url(" sqlite::memory: ").as_deref(),
        Some("sqlite::memory:")
    );
    assert_eq!(normalize_sqlite_url("   "), None);
}

#[test]
fn parent_dir_is_created_for_file_urls_only() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("a").join("b").join("app.db");
    let url = normalize_sqlite_url(&db_path.to_string_lossy()).expect("url");

    ensure_sqlite_parent_dir("sqlite::memory:").expect("memory url");
    ensure_sqlite_parent_dir(&url).expect("file url");
    assert!(temp_root.path().join("a").join("b").is_dir());
}
