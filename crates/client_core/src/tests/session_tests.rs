use super::*;
use storage::MemoryStorage;

fn gate(kv: &MemoryStorage) -> SessionGate<MemoryStorage> {
    SessionGate::new(SessionStore::new(kv.clone()))
}

#[tokio::test]
async fn login_persists_and_restores() {
    let kv = MemoryStorage::new();
    let mut first = gate(&kv);
    let session = first
        .login("admin", "password", Role::Admin)
        .await
        .expect("login");
    assert_eq!(session.display_name, "Administrator");
    assert!(first.require_role(Role::Admin));
    assert!(!first.require_role(Role::Student));

    let restored = SessionGate::restore(SessionStore::new(kv.clone()))
        .await
        .expect("restore");
    assert_eq!(restored.current_session(), Some(&session));
}

#[tokio::test]
async fn login_requires_matching_role() {
    let kv = MemoryStorage::new();
    let mut gate = gate(&kv);
    let err = gate
        .login("student", "password", Role::Admin)
        .await
        .expect_err("role mismatch");
    assert_eq!(err, LearnError::InvalidCredentials);
    assert_eq!(gate.state(), &SessionState::LoggedOut);
    assert!(SessionStore::new(kv).load().await.expect("load").is_none());
}

#[tokio::test]
async fn blank_credentials_are_a_validation_error() {
    let mut gate = gate(&MemoryStorage::new());
    let err = gate
        .login("  ", "password", Role::Student)
        .await
        .expect_err("blank id");
    assert!(matches!(err, LearnError::Validation(_)));
}

#[tokio::test]
async fn logout_clears_memory_and_storage() {
    let kv = MemoryStorage::new();
    let mut gate = gate(&kv);
    gate.login("student", "password", Role::Student)
        .await
        .expect("login");
    gate.logout().await.expect("logout");

    assert!(gate.current_session().is_none());
    assert!(SessionStore::new(kv).load().await.expect("load").is_none());
    gate.logout().await.expect("second logout is harmless");
}

#[test]
fn authorize_reports_required_role() {
    let logged_out = SessionState::LoggedOut;
    assert_eq!(
        authorize(&logged_out, Role::Admin),
        Err(LearnError::Unauthorized {
            required: Role::Admin
        })
    );

    let student = SessionState::Active(Session {
        user_id: "student".into(),
        role: Role::Student,
        display_name: "Student".into(),
    });
    assert!(authorize(&student, Role::Student).is_ok());
    assert!(authorize(&student, Role::Admin).is_err());
}
