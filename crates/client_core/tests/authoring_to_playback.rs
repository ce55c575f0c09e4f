use client_core::{
    CourseCatalog, EditingModel, Key, KeyOutcome, MediaFile, SessionGate, SlideshowEngine,
};
use shared::domain::Role;
use storage::{CourseStore, SessionStore, Storage, UpsertOutcome};

#[tokio::test]
async fn admin_authors_course_and_student_plays_it() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let catalog = CourseCatalog::new(CourseStore::new(storage.clone()));
    let mut gate = SessionGate::new(SessionStore::new(storage.clone()));

    gate.login("admin", "password", Role::Admin)
        .await
        .expect("admin login");
    let course = catalog
        .create_course(&gate, "Ownership and borrowing")
        .await
        .expect("create");

    let mut editor = EditingModel::new();
    editor
        .begin_edit(&gate, catalog.open_for_edit(&gate, &course.id).await.expect("open"))
        .expect("begin");
    for name in ["a.png", "b.png", "c.png"] {
        let upload = MediaFile::new(name, Some("image/png"), name.as_bytes().to_vec());
        editor.add_slide(&gate, &upload).expect("add");
    }
    editor
        .update_description(&gate, 2, "moves")
        .expect("describe");
    editor.move_up(&gate, 2).expect("reorder");
    let (_, outcome) = editor
        .commit(&gate, catalog.store())
        .await
        .expect("commit");
    assert_eq!(outcome, UpsertOutcome::Replaced);

    gate.logout().await.expect("logout");
    gate.login("student", "password", Role::Student)
        .await
        .expect("student login");

    let visible = catalog.list_for_student(&gate).await.expect("list");
    assert_eq!(visible.len(), 1);

    let playable = catalog
        .open_for_playback(&gate, &course.id)
        .await
        .expect("playable");
    let mut engine = SlideshowEngine::new();
    let first = engine.start(&gate, playable).expect("start");
    assert_eq!(first.counter_label, "1 / 3");

    assert_eq!(engine.handle_key(Key::ArrowRight), KeyOutcome::Handled);
    let second = engine.view().expect("view");
    assert_eq!(second.description, "moves");

    assert_eq!(engine.handle_key(Key::Escape), KeyOutcome::Exit);
    assert!(engine.view().is_none());
}
