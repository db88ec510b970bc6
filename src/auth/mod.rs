// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cookie-based JWT sessions for the blob API.
//!
//! ## Auth Flow
//!
//! 1. `POST /login` checks the password hash and signs an HS256 token with
//!    the server secret (`username`, `ID`, `exp`, `iss`)
//! 2. The token is returned as the `JWT` cookie (HttpOnly, `Path=/`) and
//!    mirrored in an `Authorization: Bearer` response header
//! 3. On later requests the server:
//!    - reads the `JWT` cookie, falling back to the bearer header
//!    - verifies signature, issuer and expiry
//!    - attaches an [`AuthenticatedUser`] to the request
//!
//! ## Failure handling
//!
//! - API routes answer `401` with the JSON envelope
//! - Page routes redirect to `/login` with `303 See Other`
//! - There is no revocation list; tokens live until `exp`

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use codec::SessionCodec;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth, SESSION_COOKIE};
pub use middleware::require_page_session;
pub use password::{hash_password, verify_password};
