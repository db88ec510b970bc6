// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository: accounts, follow relations and per-user feeds.
//!
//! Derived counts (likes given, followers, following) and the
//! requester-relative `follows` flag are computed on every read and never
//! stored.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::blobs::{StoredBlob, BLOB_SELECT};
use super::RelationPolicy;
use crate::storage::{Database, StorageError, StorageResult};

/// A user row plus the values derived at read time.
///
/// Carries the password hash; convert to [`crate::models::UserView`] before
/// exposing it to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub description: String,
    /// Likes this user has given.
    pub likes_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    /// Whether the requester follows this user.
    pub follows: bool,
}

impl StoredUser {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            description: row.get(3)?,
            likes_count: 0,
            followers_count: 0,
            following_count: 0,
            follows: false,
        })
    }

    fn with_info(mut self, conn: &Connection, requester: Option<i64>) -> StorageResult<Self> {
        self.likes_count = conn.query_row(
            "SELECT COUNT(*) FROM likes l JOIN blobs b ON b.ID = l.ID_blob WHERE l.ID_user = ?",
            params![self.id],
            |row| row.get(0),
        )?;
        self.followers_count = conn.query_row(
            "SELECT COUNT(*) FROM follows f JOIN users u ON u.ID = f.ID_user_follower \
             WHERE f.ID_user_followed = ?",
            params![self.id],
            |row| row.get(0),
        )?;
        self.following_count = conn.query_row(
            "SELECT COUNT(*) FROM follows f JOIN users u ON u.ID = f.ID_user_followed \
             WHERE f.ID_user_follower = ?",
            params![self.id],
            |row| row.get(0),
        )?;
        self.follows = match requester {
            Some(requester) => is_following(conn, requester, self.id)?,
            None => false,
        };
        Ok(self)
    }
}

const USER_SELECT: &str = "SELECT ID, username, password, description FROM users";

fn is_following(conn: &Connection, follower: i64, followed: i64) -> StorageResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM follows WHERE ID_user_follower = ? AND ID_user_followed = ?",
    )?;
    Ok(stmt.exists(params![follower, followed])?)
}

pub(super) fn user_exists(conn: &Connection, id: i64) -> StorageResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM users WHERE ID = ?")?;
    Ok(stmt.exists(params![id])?)
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a Database,
    policy: RelationPolicy,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the default relation policy.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            policy: RelationPolicy::default(),
        }
    }

    /// Set how repeated follow requests are stored.
    pub fn with_policy(mut self, policy: RelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a new account. Returns the new user id.
    ///
    /// # Errors
    /// `AlreadyExists` if the username is taken.
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        description: &str,
    ) -> StorageResult<i64> {
        self.db.transaction(|tx| {
            let taken = tx
                .prepare_cached("SELECT 1 FROM users WHERE username = ?")?
                .exists(params![username])?;
            if taken {
                return Err(StorageError::AlreadyExists("user".to_string()));
            }

            tx.execute(
                "INSERT INTO users (username, password, description) VALUES (?, ?, ?)",
                params![username, password_hash, description],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Get a user by id, with counts relative to `requester`.
    pub fn get_by_id(&self, id: i64, requester: Option<i64>) -> StorageResult<StoredUser> {
        let conn = self.db.conn();
        let user = conn
            .query_row(
                &format!("{USER_SELECT} WHERE ID = ?"),
                params![id],
                StoredUser::from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("user {id}")))?;
        user.with_info(&conn, requester)
    }

    /// Get a user by exact username, with counts relative to `requester`.
    pub fn get_by_username(
        &self,
        username: &str,
        requester: Option<i64>,
    ) -> StorageResult<StoredUser> {
        let conn = self.db.conn();
        let user = conn
            .query_row(
                &format!("{USER_SELECT} WHERE username = ?"),
                params![username],
                StoredUser::from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("user {username}")))?;
        user.with_info(&conn, requester)
    }

    /// Users whose name contains `substring`, excluding the requester.
    pub fn search(&self, substring: &str, requester: i64) -> StorageResult<Vec<StoredUser>> {
        let conn = self.db.conn();
        let rows = {
            let mut stmt = conn.prepare(&format!(
                "{USER_SELECT} WHERE username LIKE '%' || ? || '%' AND ID != ? ORDER BY username"
            ))?;
            let rows = stmt
                .query_map(params![substring, requester], StoredUser::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter()
            .map(|user| user.with_info(&conn, Some(requester)))
            .collect()
    }

    /// Replace the user's description.
    pub fn update_description(&self, id: i64, description: &str) -> StorageResult<()> {
        let updated = self.db.conn().execute(
            "UPDATE users SET description = ? WHERE ID = ?",
            params![description, id],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    /// Delete the account together with its blobs and relation rows.
    pub fn delete(&self, id: i64) -> StorageResult<()> {
        self.db.transaction(|tx| {
            let deleted = tx.execute("DELETE FROM users WHERE ID = ?", params![id])?;
            if deleted == 0 {
                return Err(StorageError::NotFound(format!("user {id}")));
            }
            tx.execute(
                "DELETE FROM likes WHERE ID_user = ?1 OR ID_blob IN (SELECT ID FROM blobs WHERE ID_user = ?1)",
                params![id],
            )?;
            tx.execute("DELETE FROM blobs WHERE ID_user = ?", params![id])?;
            tx.execute(
                "DELETE FROM follows WHERE ID_user_follower = ?1 OR ID_user_followed = ?1",
                params![id],
            )?;
            Ok(())
        })
    }

    /// Record that `follower` follows `followed`.
    ///
    /// Under [`RelationPolicy::Cumulative`] every call inserts a row.
    ///
    /// # Errors
    /// `NotFound` if either account is gone. Sessions outlive account
    /// deletion, so the follower is checked too.
    pub fn follow(&self, follower: i64, followed: i64) -> StorageResult<()> {
        self.db.transaction(|tx| {
            for id in [followed, follower] {
                if !user_exists(tx, id)? {
                    return Err(StorageError::NotFound(format!("user {id}")));
                }
            }
            if self.policy == RelationPolicy::Unique && is_following(tx, follower, followed)? {
                return Ok(());
            }
            tx.execute(
                "INSERT INTO follows (ID_user_follower, ID_user_followed) VALUES (?, ?)",
                params![follower, followed],
            )?;
            Ok(())
        })
    }

    /// Remove every follow row for the pair.
    pub fn unfollow(&self, follower: i64, followed: i64) -> StorageResult<()> {
        self.db.conn().execute(
            "DELETE FROM follows WHERE ID_user_follower = ? AND ID_user_followed = ?",
            params![follower, followed],
        )?;
        Ok(())
    }

    /// Users following `id`.
    pub fn followers(&self, id: i64, requester: Option<i64>) -> StorageResult<Vec<StoredUser>> {
        self.relation_list(
            id,
            requester,
            "SELECT u.ID, u.username, u.password, u.description FROM users u \
             WHERE u.ID IN (SELECT ID_user_follower FROM follows WHERE ID_user_followed = ?) \
             ORDER BY u.username",
        )
    }

    /// Users that `id` follows.
    pub fn following(&self, id: i64, requester: Option<i64>) -> StorageResult<Vec<StoredUser>> {
        self.relation_list(
            id,
            requester,
            "SELECT u.ID, u.username, u.password, u.description FROM users u \
             WHERE u.ID IN (SELECT ID_user_followed FROM follows WHERE ID_user_follower = ?) \
             ORDER BY u.username",
        )
    }

    fn relation_list(
        &self,
        id: i64,
        requester: Option<i64>,
        sql: &str,
    ) -> StorageResult<Vec<StoredUser>> {
        let conn = self.db.conn();
        if !user_exists(&conn, id)? {
            return Err(StorageError::NotFound(format!("user {id}")));
        }
        let rows = {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params![id], StoredUser::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        rows.into_iter()
            .map(|user| user.with_info(&conn, requester))
            .collect()
    }

    /// Blobs authored by `id`, newest first.
    pub fn blobs_of(&self, id: i64, requester: Option<i64>) -> StorageResult<Vec<StoredBlob>> {
        let conn = self.db.conn();
        if !user_exists(&conn, id)? {
            return Err(StorageError::NotFound(format!("user {id}")));
        }
        let mut stmt = conn.prepare(&format!(
            "{BLOB_SELECT} WHERE b.ID_user = ?2 ORDER BY b.added_date DESC, b.ID DESC"
        ))?;
        let blobs = stmt
            .query_map(params![requester, id], |row| StoredBlob::from_row(row, requester))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blobs)
    }

    /// Feed of blobs authored by accounts the requester follows, newest first.
    pub fn overview(&self, requester: i64) -> StorageResult<Vec<StoredBlob>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "{BLOB_SELECT} WHERE b.ID_user IN \
             (SELECT ID_user_followed FROM follows WHERE ID_user_follower = ?2) \
             ORDER BY b.added_date DESC, b.ID DESC"
        ))?;
        let blobs = stmt
            .query_map(params![Some(requester), requester], |row| {
                StoredBlob::from_row(row, Some(requester))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blobs)
    }
}
