//! Image ingestion: file bytes in, embedded `data:` URL out.

use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::error::LearnError;

#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
            bytes,
        }
    }

    /// Reads a file, guessing its declared type from the extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let declared_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Ok(Self {
            name,
            declared_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.declared_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image/"))
    }
}

pub fn ingest_image(file: &MediaFile) -> Result<String, LearnError> {
    let Some(declared) = file.declared_type.as_deref().filter(|_| file.is_image()) else {
        return Err(LearnError::UnsupportedMediaKind {
            name: file.name.clone(),
            declared: file
                .declared_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        });
    };
    Ok(format!("data:{declared};base64,{}", STANDARD.encode(&file.bytes)))
}

pub fn is_data_url(path: &str) -> bool {
    path.starts_with("data:")
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
