//! File-backed progress storage.
//!
//! The progress document lives as one JSON file, `progress.json` under
//! `~/.trek/` by default. Writes are atomic via temp file + rename so a
//! crash mid-save never leaves a truncated document.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::trek_home;
use crate::error::{Result, TrekError};
use crate::storage::ProgressBackend;

/// Name of the progress document within the trek home directory.
pub const PROGRESS_FILE: &str = "progress.json";

/// File-based progress backend.
#[derive(Debug, Clone)]
pub struct FileProgressBackend {
    path: PathBuf,
}

impl FileProgressBackend {
    /// Create a backend at the default location (`~/.trek/progress.json` or
    /// `$TREK_HOME/progress.json`).
    pub fn new() -> Result<Self> {
        let home = trek_home().ok_or_else(|| {
            TrekError::config("could not determine trek home (no home directory)")
        })?;
        Self::with_dir(home)
    }

    /// Create a backend storing the document in a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| TrekError::storage(&dir, e))?;
        }
        Ok(Self {
            path: dir.join(PROGRESS_FILE),
        })
    }

    /// Path of the progress document.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl ProgressBackend for FileProgressBackend {
    fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| TrekError::storage(&self.path, e))?;
        let doc: Value = serde_json::from_str(&content)?;
        Ok(Some(doc))
    }

    fn save(&self, doc: &Value) -> Result<()> {
        let temp_path = self.temp_path();
        let json = serde_json::to_string_pretty(doc)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| TrekError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| TrekError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| TrekError::storage(&temp_path, e))?;
        }

        // Atomic on POSIX
        fs::rename(&temp_path, &self.path).map_err(|e| TrekError::storage(&self.path, e))?;

        Ok(())
    }
}
