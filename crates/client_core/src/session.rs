//! Session gate: the single active login and the role predicate every
//! guarded operation consults.

use shared::{
    domain::{Role, Session},
    error::LearnError,
};
use storage::{KeyValueStore, SessionStore};
use tracing::{info, warn};

struct DemoAccount {
    user_id: &'static str,
    password: &'static str,
    role: Role,
    display_name: &'static str,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        user_id: "student",
        password: "password",
        role: Role::Student,
        display_name: "Student",
    },
    DemoAccount {
        user_id: "admin",
        password: "password",
        role: Role::Admin,
        display_name: "Administrator",
    },
];

/// Role predicate consulted before guarded operations.
pub trait AccessGate {
    fn current_session(&self) -> Option<&Session>;

    fn require_role(&self, role: Role) -> bool {
        self.current_session().is_some_and(|s| s.role == role)
    }
}

/// Turns a failed [`AccessGate::require_role`] into `Unauthorized`.
pub fn authorize(gate: &dyn AccessGate, role: Role) -> Result<(), LearnError> {
    if gate.require_role(role) {
        return Ok(());
    }
    match gate.current_session() {
        None => warn!(required = %role, "rejected action: not logged in"),
        Some(session) => warn!(
            required = %role,
            actual = %session.role,
            user = %session.user_id,
            "rejected action: insufficient role"
        ),
    }
    Err(LearnError::Unauthorized { required: role })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    Active(Session),
}

impl AccessGate for SessionState {
    fn current_session(&self) -> Option<&Session> {
        match self {
            SessionState::LoggedOut => None,
            SessionState::Active(session) => Some(session),
        }
    }
}

pub struct SessionGate<S> {
    store: SessionStore<S>,
    state: SessionState,
}

impl<S: KeyValueStore> SessionGate<S> {
    pub fn new(store: SessionStore<S>) -> Self {
        Self {
            store,
            state: SessionState::LoggedOut,
        }
    }

    /// Loads whatever session was persisted by an earlier process.
    pub async fn restore(store: SessionStore<S>) -> Result<Self, LearnError> {
        let state = match store.load().await.map_err(LearnError::storage)? {
            Some(session) => {
                info!(user = %session.user_id, role = %session.role, "restored session");
                SessionState::Active(session)
            }
            None => SessionState::LoggedOut,
        };
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn login(
        &mut self,
        user_id: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, LearnError> {
        let user_id = user_id.trim();
        let password = password.trim();
        if user_id.is_empty() || password.is_empty() {
            return Err(LearnError::Validation(
                "user id and password are required".to_string(),
            ));
        }

        let Some(account) = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.user_id == user_id && a.password == password && a.role == role)
        else {
            warn!(user = %user_id, role = %role, "login rejected");
            return Err(LearnError::InvalidCredentials);
        };

        let session = Session {
            user_id: account.user_id.to_string(),
            role: account.role,
            display_name: account.display_name.to_string(),
        };
        self.store
            .save(&session)
            .await
            .map_err(LearnError::storage)?;
        info!(user = %session.user_id, role = %session.role, "logged in");
        self.state = SessionState::Active(session.clone());
        Ok(session)
    }

    pub async fn logout(&mut self) -> Result<(), LearnError> {
        self.store.clear().await.map_err(LearnError::storage)?;
        if let SessionState::Active(session) = std::mem::take(&mut self.state) {
            info!(user = %session.user_id, "logged out");
        }
        Ok(())
    }
}

impl<S> AccessGate for SessionGate<S> {
    fn current_session(&self) -> Option<&Session> {
        self.state.current_session()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
