// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded once at startup from a YAML file and the
//! environment, environment taking precedence, and then shared read-only
//! through [`crate::state::AppState`].
//!
//! ## Keys
//!
//! | Key / variable | Description | Default |
//! |----------------|-------------|---------|
//! | `secret` / `SECRET` | HS256 signing secret for session tokens | Required |
//! | `database_path` / `DATABASE_PATH` | SQLite file (`:memory:` allowed) | `blob.db` |
//! | `host` / `HOST` | Server bind address | `0.0.0.0` |
//! | `port` / `PORT` | Server bind port | `8080` |
//! | `pages_dir` / `PAGES_DIR` | Directory holding the HTML templates | `pages` |
//! | `session_ttl_secs` / `SESSION_TTL_SECS` | Session lifetime | `7200` |
//! | `relation_policy` / `RELATION_POLICY` | `cumulative` or `unique` likes/follows | `cumulative` |
//!
//! ## Process environment only
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CONFIG_FILE` | YAML file to read | `config.yaml` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

use crate::storage::RelationPolicy;

/// Environment variable naming the YAML config file.
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// Config file read when `CONFIG_FILE` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Environment variable selecting the log format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Default session lifetime (2 hours).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 2 * 60 * 60;

const ENV_KEYS: &[&str] = &[
    "secret",
    "database_path",
    "host",
    "port",
    "pages_dir",
    "session_ttl_secs",
    "relation_policy",
];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("secret must not be empty")]
    EmptySecret,

    #[error("session_ttl_secs must be positive, got {0}")]
    InvalidSessionTtl(i64),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

/// Immutable server configuration.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub secret: String,

    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    #[serde(default)]
    pub relation_policy: RelationPolicy,
}

fn default_database_path() -> String {
    "blob.db".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("pages")
}

fn default_session_ttl_secs() -> i64 {
    DEFAULT_SESSION_TTL_SECS
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pages_dir", &self.pages_dir)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("relation_policy", &self.relation_policy)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with every default and the given secret.
    ///
    /// The database is in-memory so the result is usable without touching disk.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            database_path: ":memory:".to_string(),
            host: default_host(),
            port: default_port(),
            pages_dir: default_pages_dir(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            relation_policy: RelationPolicy::default(),
        }
    }

    /// Load from `CONFIG_FILE` (default `config.yaml`) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain used by [`AppConfig::load`]. A missing YAML file is not an error.
    pub(crate) fn figment() -> Figment {
        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Figment::new()
            .merge(Yaml::file(file))
            .merge(Env::raw().only(ENV_KEYS))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.session_ttl_secs <= 0 {
            return Err(ConfigError::InvalidSessionTtl(self.session_ttl_secs));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn yaml_file_with_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.yaml", "secret: from-yaml\n")?;

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.secret, "from-yaml");
            assert_eq!(config.database_path, "blob.db");
            assert_eq!(config.bind_addr(), "0.0.0.0:8080");
            assert_eq!(config.pages_dir, PathBuf::from("pages"));
            assert_eq!(config.session_ttl_secs, 7200);
            assert_eq!(config.relation_policy, RelationPolicy::Cumulative);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.yaml", "secret: from-yaml\nport: 9000\n")?;
            jail.set_env("secret", "from-env");
            jail.set_env("PORT", "3000");
            jail.set_env("RELATION_POLICY", "unique");
            jail.set_env("DATABASE_PATH", ":memory:");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.secret, "from-env");
            assert_eq!(config.port, 3000);
            assert_eq!(config.relation_policy, RelationPolicy::Unique);
            assert_eq!(config.database_path, ":memory:");
            Ok(())
        });
    }

    #[test]
    fn config_file_path_is_overridable() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("custom.yaml", "secret: custom\nsession_ttl_secs: 60\n")?;
            jail.set_env("CONFIG_FILE", "custom.yaml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.secret, "custom");
            assert_eq!(config.session_ttl_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn missing_or_empty_secret_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            assert!(matches!(AppConfig::load(), Err(ConfigError::Load(_))));

            jail.create_file("config.yaml", "secret: \"  \"\n")?;
            assert!(matches!(AppConfig::load(), Err(ConfigError::EmptySecret)));
            Ok(())
        });
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.yaml", "secret: s\nsession_ttl_secs: 0\n")?;
            assert!(matches!(
                AppConfig::load(),
                Err(ConfigError::InvalidSessionTtl(0))
            ));
            Ok(())
        });
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = AppConfig::new("super-secret-value");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("<redacted>"));
    }
}
