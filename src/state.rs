//! Per-instance runtime state
//!
//! A small JSON object kept between invocations for one managed instance.
//! The lifecycle operations only use the `testgroup_id` key; other keys in
//! the file are preserved.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Runtime properties of one instance, optionally backed by a file
#[derive(Debug, Default)]
pub struct RuntimeState {
    path: Option<PathBuf>,
    properties: Map<String, Value>,
}

impl RuntimeState {
    /// State that lives only for this process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load state from `path`; a missing file is an empty state
    pub fn load(path: PathBuf) -> Result<Self> {
        let properties = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::ConfigParse(format!(
                        "Invalid runtime state '{}': {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path: Some(path),
            properties,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Write the state back to its file, if it has one
    ///
    /// The file is replaced atomically so a killed process never leaves a
    /// truncated state behind.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.properties)?)?;
        std::fs::rename(&tmp, path)?;

        tracing::debug!("Saved runtime state to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = RuntimeState::load(dir.path().join("node_1.json")).unwrap();
        assert!(state.properties().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("node_1.json");

        let mut state = RuntimeState::load(path.clone()).unwrap();
        state.insert("testgroup_id", json!(42));
        state.insert("owner", json!("nightly"));
        state.save().unwrap();

        let mut reloaded = RuntimeState::load(path.clone()).unwrap();
        assert_eq!(reloaded.get("testgroup_id"), Some(&json!(42)));

        reloaded.remove("testgroup_id");
        reloaded.save().unwrap();

        let again = RuntimeState::load(path).unwrap();
        assert_eq!(again.get("testgroup_id"), None);
        assert_eq!(again.get("owner"), Some(&json!("nightly")));
    }

    #[test]
    fn test_corrupt_state_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_1.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = RuntimeState::load(path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut state = RuntimeState::in_memory();
        state.insert("testgroup_id", json!(1));
        state.save().unwrap();
        assert!(state.path().is_none());
    }
}
