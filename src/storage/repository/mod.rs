// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the relational store.
//!
//! Each repository provides the query/scan operations for one entity type.
//! Repositories are not auth-aware: callers pass the requester id in and
//! enforce ownership through [`crate::storage::ownership`].

pub mod blobs;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use blobs::{BlobRepository, StoredBlob};
pub use users::{StoredUser, UserRepository};

/// How repeated like/follow requests for the same pair are stored.
///
/// The schema has no uniqueness constraint on either relation, so the
/// behavior is an application decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelationPolicy {
    /// Every request inserts a row; counts include duplicates.
    #[default]
    Cumulative,
    /// A pair is stored at most once; repeated requests are no-ops.
    Unique,
}

impl std::fmt::Display for RelationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationPolicy::Cumulative => write!(f, "cumulative"),
            RelationPolicy::Unique => write!(f, "unique"),
        }
    }
}
