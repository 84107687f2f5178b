//! Display preference persistence
//!
//! The preference store sits outside the dispatch pipeline: every failure
//! here is logged and swallowed.

use crate::db::DbError;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Key under which the dark-mode flag is stored
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store for display preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Process-local store, used when the database cannot be opened
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self
            .values
            .lock()
            .map_err(|e| PreferenceError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .lock()
            .map_err(|e| PreferenceError::Unavailable(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The dark-mode flag, read once at start and written on every toggle
pub struct DisplayPreferences {
    store: Box<dyn PreferenceStore>,
    dark_mode: bool,
}

impl DisplayPreferences {
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let dark_mode = match store.get(DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read display preference, using light mode");
                false
            }
        };
        Self { store, dark_mode }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flip the flag and persist it. The in-memory value changes even if
    /// the write fails.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        let value = if self.dark_mode { "true" } else { "false" };
        if let Err(e) = self.store.set(DARK_MODE_KEY, value) {
            tracing::warn!(error = %e, dark_mode = self.dark_mode, "Failed to persist display preference");
        }
        self.dark_mode
    }
}
