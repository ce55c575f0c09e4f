use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "elearn.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub autoplay_interval_ms: u64,
    pub seed_sample_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/elearn.db".into(),
            autoplay_interval_ms: 5000,
            seed_sample_data: true,
        }
    }
}

impl Settings {
    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    autoplay_interval_ms: Option<u64>,
    seed_sample_data: Option<bool>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the toml file, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.autoplay_interval_ms {
                    settings.autoplay_interval_ms = v;
                }
                if let Some(v) = file_cfg.seed_sample_data {
                    settings.seed_sample_data = v;
                }
            }
            Err(err) => tracing::warn!(path = %path.display(), %err, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("ELEARN_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__AUTOPLAY_INTERVAL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.autoplay_interval_ms = parsed;
        }
    }

    if let Some(v) = env("APP__SEED_SAMPLE_DATA") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.seed_sample_data = parsed;
        }
    }

    settings
}

/// Normalizes the configured URL and creates its parent directory.
pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    storage::ensure_sqlite_parent_dir(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    storage::normalize_sqlite_url(raw_database_url)
        .unwrap_or_else(|| Settings::default().database_url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
