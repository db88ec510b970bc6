// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing.
//!
//! Stored hashes are lowercase hex SHA-256 of the raw password, the format
//! existing `users` rows already use.

use sha2::{Digest, Sha256};

/// Hash a password into its stored form.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Compare a candidate password with a stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}
