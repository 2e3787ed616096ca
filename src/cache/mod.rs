pub mod auth;
pub mod projects;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::AddinConfig;

/// Read a JSON document, falling back to `T::default()` on any failure.
///
/// Missing, unreadable and malformed files are all treated the same as an
/// empty document.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cache file not readable");
            return T::default();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cache file is not valid JSON, ignoring");
            T::default()
        }
    }
}

/// Overwrite a JSON document, pretty-printed with two-space indent.
pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "cache file saved");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CachePaths {
    pub auth: PathBuf,
    pub projects: PathBuf,
}

impl CachePaths {
    pub fn from_config(config: &AddinConfig) -> Self {
        Self {
            auth: config.auth_path(),
            projects: config.projects_path(),
        }
    }

    /// Cache files that do not exist on disk.
    pub fn missing(&self) -> Vec<&Path> {
        [self.auth.as_path(), self.projects.as_path()]
            .into_iter()
            .filter(|p| !p.is_file())
            .collect()
    }
}
