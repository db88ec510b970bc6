// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::SessionCodec;
use crate::config::AppConfig;
use crate::storage::{BlobRepository, Database, StorageResult, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub sessions: Arc<SessionCodec>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        let sessions = SessionCodec::new(&config.secret, config.session_ttl_secs);
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            sessions: Arc::new(sessions),
        }
    }

    /// Open the database named by `config.database_path`.
    pub fn open(config: AppConfig) -> StorageResult<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(config, db))
    }

    /// State backed by a fresh in-memory database, whatever the configured path.
    pub fn in_memory(config: AppConfig) -> StorageResult<Self> {
        Ok(Self::new(config, Database::in_memory()?))
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.db).with_policy(self.config.relation_policy)
    }

    pub fn blobs(&self) -> BlobRepository<'_> {
        BlobRepository::new(&self.db).with_policy(self.config.relation_policy)
    }
}
