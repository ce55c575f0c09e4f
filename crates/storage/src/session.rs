use anyhow::{Context, Result};
use shared::{domain::Session, protocol::CURRENT_USER_KEY};

use crate::KeyValueStore;

#[derive(Clone)]
pub struct SessionStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        let Some(raw) = self.kv.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };
        let session = serde_json::from_str(&raw).context("stored session is not valid JSON")?;
        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session).context("failed to serialize session")?;
        self.kv.set(CURRENT_USER_KEY, &raw).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.kv.remove(CURRENT_USER_KEY).await
    }
}
