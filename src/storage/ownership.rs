// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for destructive operations.
//!
//! Repositories do not know who is calling. Handlers load the resource,
//! then run it through these traits before mutating it.

use crate::auth::AuthenticatedUser;

use super::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> i64;

    /// Short label used in permission errors.
    fn resource_name(&self) -> String {
        "resource".to_string()
    }
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `StorageError::PermissionDenied` if the user doesn't own the resource.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StorageResult<()> {
        if self.owner_user_id() == user.user_id {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                user_id: user.user_id,
                resource: self.resource_name(),
            })
        }
    }
}

/// Extension trait to chain a lookup and an ownership check.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, user: &AuthenticatedUser) -> StorageResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for StorageResult<T> {
    fn verify_owner(self, user: &AuthenticatedUser) -> StorageResult<T> {
        let resource = self?;
        resource.verify_ownership(user)?;
        Ok(resource)
    }
}
