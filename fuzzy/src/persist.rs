//! Area persistence for save/load functionality.
//!
//! Areas are stored as pretty-printed JSON documents wrapping an
//! [`AreaSnapshot`] with a format version and a timestamp. Bare snapshots
//! (exports from other tools) are accepted on load.

use chrono::{DateTime, Utc};
use fuzzy_core::AreaSnapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current area file version.
pub const AREA_VERSION: u32 = 1;

/// A saved decision area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDocument {
    /// File format version for compatibility checking.
    pub version: u32,

    /// When the document was written.
    pub saved_at: DateTime<Utc>,

    /// The area, its variables and rules.
    #[serde(flatten)]
    pub snapshot: AreaSnapshot,
}

impl AreaDocument {
    /// Wrap a snapshot, stamped with the current time.
    pub fn new(snapshot: AreaSnapshot) -> Self {
        Self {
            version: AREA_VERSION,
            saved_at: Utc::now(),
            snapshot,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).await?;
        debug!(path = %path.as_ref().display(), "Area saved");
        Ok(())
    }

    /// Load from a JSON file.
    ///
    /// A file without a `version` field is read as a bare snapshot and
    /// stamped with the current time.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Parse a document or bare snapshot from JSON text.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        Self::parse(content).map(|(doc, _)| doc)
    }

    /// Parse, also reporting whether the text was a full document.
    fn parse(content: &str) -> Result<(Self, bool), PersistError> {
        // Parse just enough to tell the two forms apart
        #[derive(Deserialize)]
        struct Partial {
            version: Option<u32>,
        }

        let partial: Partial = serde_json::from_str(content)?;
        match partial.version {
            None => Ok((Self::new(AreaSnapshot::from_json(content)?), false)),
            Some(found) if found != AREA_VERSION => Err(PersistError::VersionMismatch {
                expected: AREA_VERSION,
                found,
            }),
            Some(_) => Ok((serde_json::from_str(content)?, true)),
        }
    }
}

/// Load just the snapshot from a document or bare snapshot file.
pub async fn load_area(path: impl AsRef<Path>) -> Result<AreaSnapshot, PersistError> {
    Ok(AreaDocument::load_json(path).await?.snapshot)
}

/// Save a snapshot as a fresh document.
pub async fn save_area(path: impl AsRef<Path>, snapshot: AreaSnapshot) -> Result<(), PersistError> {
    AreaDocument::new(snapshot).save_json(path).await
}

/// Summary of an area file found by [`list_areas`].
#[derive(Debug, Clone, PartialEq)]
pub struct AreaInfo {
    /// Path to the area file.
    pub path: PathBuf,

    /// Area name.
    pub name: String,

    pub variables: usize,
    pub rules: usize,

    /// Save time for documents, `None` for bare snapshots.
    pub saved_at: Option<DateTime<Utc>>,
}

/// List all readable area files in a directory, sorted by path.
///
/// Files that fail to parse are skipped with a warning.
pub async fn list_areas(dir: impl AsRef<Path>) -> Result<Vec<AreaInfo>, PersistError> {
    let mut areas = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.extension().map(|e| e == "json").unwrap_or(false) {
            continue;
        }

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), "Skipping unreadable file: {e}");
                continue;
            }
        };
        match AreaDocument::parse(&content) {
            Ok((doc, is_document)) => areas.push(AreaInfo {
                name: doc.snapshot.area.name.clone(),
                variables: doc.snapshot.variables.len(),
                rules: doc.snapshot.rules.len(),
                saved_at: is_document.then_some(doc.saved_at),
                path,
            }),
            Err(e) => warn!(path = %path.display(), "Skipping file that is not an area: {e}"),
        }
    }

    areas.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(areas)
}

/// File name for an area inside `base_dir`.
pub fn area_path(base_dir: impl AsRef<Path>, area_name: &str) -> PathBuf {
    let sanitized = area_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    base_dir.as_ref().join(format!("{sanitized}.json"))
}
