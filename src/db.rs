//! Database module
//!
//! Provides persistence for display preferences. The transcript itself is
//! never stored.

mod schema;

use crate::preferences::{PreferenceError, PreferenceStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use schema::{SCHEMA, SELECT_PREFERENCE, UPSERT_PREFERENCE};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Preference Operations ====================

    pub fn get_preference(&self, key: &str) -> DbResult<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(SELECT_PREFERENCE, params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(UPSERT_PREFERENCE, params![key, value, Utc::now().to_rfc3339()])?;
        Ok(())
    }
}

impl PreferenceStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.get_preference(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        Ok(self.set_preference(key, value)?)
    }
}
