// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blob Server - Minimal Social Networking Backend
//!
//! Users register, log in with a cookie-held JWT session, post short text
//! "blobs", like them, follow each other and read a feed of the accounts
//! they follow.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router and response envelope (Axum)
//! - `auth` - Session tokens, extractors and page middleware
//! - `config` - YAML + environment configuration (figment)
//! - `storage` - SQLite repositories and ownership checks

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
