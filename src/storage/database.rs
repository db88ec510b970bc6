// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded relational database handle and schema bootstrap.
//!
//! The server keeps a single SQLite connection behind a mutex. Every
//! repository call locks it for the duration of one statement or one
//! transaction, which serializes check-then-act sequences.

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, Transaction};
use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Entity already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Input rejected before touching the database.
    #[error("{0}")]
    Validation(String),

    /// Ownership check failed.
    #[error("user {user_id} cannot modify {resource}")]
    PermissionDenied { user_id: i64, resource: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS blobs (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        ID_user INTEGER NOT NULL,
        content TEXT NOT NULL,
        added_date TEXT NOT NULL
    );

    -- Relations carry no uniqueness constraint.
    CREATE TABLE IF NOT EXISTS likes (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        ID_user INTEGER NOT NULL,
        ID_blob INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS follows (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        ID_user_follower INTEGER NOT NULL,
        ID_user_followed INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
    CREATE INDEX IF NOT EXISTS idx_blobs_user ON blobs(ID_user);
    CREATE INDEX IF NOT EXISTS idx_likes_pair ON likes(ID_user, ID_blob);
    CREATE INDEX IF NOT EXISTS idx_likes_blob ON likes(ID_blob);
    CREATE INDEX IF NOT EXISTS idx_follows_pair ON follows(ID_user_follower, ID_user_followed);
    CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(ID_user_followed);
";

/// Relational store backed by SQLite.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) the database file at `path` and ensures the schema.
    ///
    /// The special path `:memory:` opens a private in-memory database.
    pub fn open(path: &str) -> StorageResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::info!(path, "database ready");
        Ok(db)
    }

    /// Creates a new in-memory database with the schema applied.
    pub fn in_memory() -> StorageResult<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn.lock().execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Locks the connection for a sequence of single statements.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Runs `f` inside one transaction, committing on `Ok` and rolling back on `Err`.
    pub(crate) fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Round-trips a trivial query. Used by the readiness check.
    pub fn health_check(&self) -> StorageResult<()> {
        let one: i64 = self.conn.lock().query_row("SELECT 1", [], |row| row.get(0))?;
        debug_assert_eq!(one, 1);
        Ok(())
    }
}
