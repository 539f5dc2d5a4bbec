use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::{load_settings, Settings};

/// Detects edits to the settings file by polling its modification time.
#[derive(Debug)]
pub struct SettingsWatcher {
    path: PathBuf,
    seen: Option<SystemTime>,
}

impl SettingsWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Result<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .with_context(|| format!("stat {}", self.path.display()))
    }

    /// Load unconditionally and remember the file's timestamp.
    pub fn load(&mut self) -> Result<Settings> {
        let modified = self.modified()?;
        let settings = load_settings(&self.path)?;
        self.seen = Some(modified);
        Ok(settings)
    }

    /// New settings when the file changed since the last look. A broken
    /// edit is reported once; the timestamp is remembered either way.
    pub fn poll(&mut self) -> Result<Option<Settings>> {
        let modified = self.modified()?;
        if self.seen == Some(modified) {
            return Ok(None);
        }
        self.seen = Some(modified);
        load_settings(&self.path).map(Some)
    }
}
