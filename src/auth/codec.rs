// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 session token codec.
//!
//! Tokens are stateless: there is no revocation list, so a token stays valid
//! until `exp` even after the account changes its password or is deleted.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{SessionClaims, SESSION_ISSUER};
use super::AuthError;

/// Signs and verifies session tokens with the server secret.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Create a codec for `secret` issuing tokens that live `ttl_secs`.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Session lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Sign a token for the given identity expiring at `expires_at` (Unix seconds).
    pub fn issue(&self, username: &str, user_id: i64, expires_at: i64) -> Result<String, AuthError> {
        let claims = SessionClaims::new(username, user_id, expires_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }

    /// Sign a token expiring one session lifetime from now.
    ///
    /// Returns the token and its expiry.
    pub fn issue_for(&self, username: &str, user_id: i64) -> Result<(String, i64), AuthError> {
        let expires_at = Utc::now().timestamp() + self.ttl_secs;
        let token = self.issue(username, user_id, expires_at)?;
        Ok((token, expires_at))
    }

    /// Verify signature, issuer and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[SESSION_ISSUER]);

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}
