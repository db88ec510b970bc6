// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blob repository: posts and their likes.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::users::user_exists;
use super::RelationPolicy;
use crate::storage::{Database, OwnedResource, StorageError, StorageResult};

/// Shared projection for blob reads. `?1` is the requester id (or NULL).
pub(super) const BLOB_SELECT: &str = "SELECT b.ID, b.ID_user, u.username, b.content, b.added_date, \
     (SELECT COUNT(*) FROM likes l JOIN users lu ON lu.ID = l.ID_user WHERE l.ID_blob = b.ID), \
     EXISTS (SELECT 1 FROM likes l WHERE l.ID_blob = b.ID AND l.ID_user = ?1) \
     FROM blobs b JOIN users u ON u.ID = b.ID_user";

/// A blob row joined with its author and the values derived at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub id: i64,
    /// Owning user id. Never changes after creation.
    pub user_id: i64,
    /// Author username, joined at read time.
    pub username: String,
    pub content: String,
    pub added_date: DateTime<Utc>,
    pub likes: i64,
    /// Whether the requester has liked this blob.
    pub liked: bool,
    /// Whether the requester owns this blob.
    pub owned: bool,
}

impl StoredBlob {
    pub(super) fn from_row(row: &Row<'_>, requester: Option<i64>) -> rusqlite::Result<Self> {
        let user_id: i64 = row.get(1)?;
        Ok(Self {
            id: row.get(0)?,
            user_id,
            username: row.get(2)?,
            content: row.get(3)?,
            added_date: row.get(4)?,
            likes: row.get(5)?,
            liked: row.get(6)?,
            owned: requester == Some(user_id),
        })
    }
}

impl OwnedResource for StoredBlob {
    fn owner_user_id(&self) -> i64 {
        self.user_id
    }

    fn resource_name(&self) -> String {
        format!("blob {}", self.id)
    }
}

fn validate_content(content: &str) -> StorageResult<()> {
    if content.trim().is_empty() {
        return Err(StorageError::Validation(
            "content must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn blob_exists(conn: &Connection, id: i64) -> StorageResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM blobs WHERE ID = ?")?;
    Ok(stmt.exists(params![id])?)
}

/// Check that both ends of a like exist before writing it.
fn check_like_target(conn: &Connection, blob: i64, user: i64) -> StorageResult<()> {
    if !blob_exists(conn, blob)? {
        return Err(StorageError::NotFound(format!("blob {blob}")));
    }
    if !user_exists(conn, user)? {
        return Err(StorageError::NotFound(format!("user {user}")));
    }
    Ok(())
}

fn has_like(conn: &Connection, blob: i64, user: i64) -> StorageResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM likes WHERE ID_user = ? AND ID_blob = ?")?;
    Ok(stmt.exists(params![user, blob])?)
}

/// Repository for blob operations.
pub struct BlobRepository<'a> {
    db: &'a Database,
    policy: RelationPolicy,
}

impl<'a> BlobRepository<'a> {
    /// Create a new BlobRepository with the default relation policy.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            policy: RelationPolicy::default(),
        }
    }

    /// Set how repeated like requests are stored.
    pub fn with_policy(mut self, policy: RelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Publish a blob for `user_id`. Returns the new blob id.
    ///
    /// # Errors
    /// `Validation` if the content is empty after trimming.
    pub fn create(&self, user_id: i64, content: &str) -> StorageResult<i64> {
        validate_content(content)?;

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO blobs (ID_user, content, added_date) VALUES (?, ?, ?)",
            params![user_id, content, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a blob with its like count and flags relative to `requester`.
    pub fn get(&self, id: i64, requester: Option<i64>) -> StorageResult<StoredBlob> {
        self.db
            .conn()
            .query_row(
                &format!("{BLOB_SELECT} WHERE b.ID = ?2"),
                params![requester, id],
                |row| StoredBlob::from_row(row, requester),
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("blob {id}")))
    }

    /// Replace the content of a blob.
    ///
    /// # Errors
    /// `Validation` if the new content is empty or identical to the current one.
    pub fn modify(&self, id: i64, content: &str) -> StorageResult<()> {
        validate_content(content)?;

        self.db.transaction(|tx| {
            let current: String = tx
                .query_row(
                    "SELECT content FROM blobs WHERE ID = ?",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StorageError::NotFound(format!("blob {id}")))?;

            if current == content {
                return Err(StorageError::Validation(
                    "new content is identical to the current content".to_string(),
                ));
            }

            tx.execute(
                "UPDATE blobs SET content = ? WHERE ID = ?",
                params![content, id],
            )?;
            Ok(())
        })
    }

    /// Delete a blob and its likes.
    pub fn delete(&self, id: i64) -> StorageResult<()> {
        self.db.transaction(|tx| {
            let deleted = tx.execute("DELETE FROM blobs WHERE ID = ?", params![id])?;
            if deleted == 0 {
                return Err(StorageError::NotFound(format!("blob {id}")));
            }
            tx.execute("DELETE FROM likes WHERE ID_blob = ?", params![id])?;
            Ok(())
        })
    }

    /// Record a like from `user` on `blob`.
    ///
    /// # Errors
    /// `NotFound` if the blob or the liking account is gone.
    pub fn like(&self, blob: i64, user: i64) -> StorageResult<()> {
        self.db.transaction(|tx| {
            check_like_target(tx, blob, user)?;
            if self.policy == RelationPolicy::Unique && has_like(tx, blob, user)? {
                return Ok(());
            }
            tx.execute(
                "INSERT INTO likes (ID_user, ID_blob) VALUES (?, ?)",
                params![user, blob],
            )?;
            Ok(())
        })
    }

    /// Remove every like row from `user` on `blob`.
    pub fn unlike(&self, blob: i64, user: i64) -> StorageResult<()> {
        self.db.conn().execute(
            "DELETE FROM likes WHERE ID_user = ? AND ID_blob = ?",
            params![user, blob],
        )?;
        Ok(())
    }

    /// Flip the like state of `user` on `blob` and return the new state.
    pub fn toggle_like(&self, blob: i64, user: i64) -> StorageResult<bool> {
        self.db.transaction(|tx| {
            check_like_target(tx, blob, user)?;
            if has_like(tx, blob, user)? {
                tx.execute(
                    "DELETE FROM likes WHERE ID_user = ? AND ID_blob = ?",
                    params![user, blob],
                )?;
                Ok(false)
            } else {
                tx.execute(
                    "INSERT INTO likes (ID_user, ID_blob) VALUES (?, ?)",
                    params![user, blob],
                )?;
                Ok(true)
            }
        })
    }
}
