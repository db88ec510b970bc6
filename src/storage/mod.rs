// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in one embedded SQLite database.
//!
//! ## Schema
//!
//! ```text
//! users   (ID, username, password, description)
//! blobs   (ID, ID_user, content, added_date)
//! likes   (ID, ID_user, ID_blob)
//! follows (ID, ID_user_follower, ID_user_followed)
//! ```
//!
//! No foreign keys and no uniqueness constraint on `likes` / `follows`.
//! Cascades are done by the repositories inside transactions.

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{Database, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use repository::{BlobRepository, RelationPolicy, StoredBlob, StoredUser, UserRepository};
