//! Store configuration.
//!
//! # Responsibility
//! - Describe how to reach the backing store and which key protects
//!   sensitive columns.
//! - Load configuration from `DB_*` environment variables.
//!
//! # Invariants
//! - `encryption_key` must be exactly 32 bytes before a store can open.
//! - File-backed configurations must name a non-empty path.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const ENV_PREFIX: &str = "DB_";

/// Connection parameters for the control-plane store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConf {
    /// Symmetric key for sensitive byte columns. Must be 32 bytes long.
    pub encryption_key: String,
    /// Selects the embedded file-backed engine when `true`.
    pub sqlite: bool,
    /// Database file used when `sqlite` is set.
    pub sqlite_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
}

impl Default for DbConf {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            sqlite: true,
            sqlite_path: PathBuf::from("dockyard.db"),
            host: "localhost".to_string(),
            port: 5432,
            username: "dockyard".to_string(),
            password: String::new(),
            db_name: "dockyard".to_string(),
        }
    }
}

impl DbConf {
    /// Builds a file-backed configuration.
    pub fn sqlite_file(path: impl Into<PathBuf>, encryption_key: impl Into<String>) -> Self {
        Self {
            encryption_key: encryption_key.into(),
            sqlite: true,
            sqlite_path: path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from `DB_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    /// Unset variables keep their [`Default`] values.
    ///
    /// # Errors
    /// - Returns [`ConfigError::Extract`] when a variable cannot be parsed
    ///   into its field type (for example `DB_PORT=abc`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_figment(
            Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|err| ConfigError::Extract(Box::new(err)))
    }
}

/// Configuration failures detected before any storage I/O happens.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEncryptionKey { len: usize },
    EmptySqlitePath,
    UnsupportedBackend { host: String, port: u16 },
    Extract(Box<figment::Error>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncryptionKey { len } => {
                write!(f, "encryption key must be exactly 32 bytes, got {len}")
            }
            Self::EmptySqlitePath => write!(f, "sqlite backend selected but sqlite_path is empty"),
            Self::UnsupportedBackend { host, port } => write!(
                f,
                "networked SQL backend at {host}:{port} is not available in this build; set sqlite=true"
            ),
            Self::Extract(err) => write!(f, "invalid store configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Extract(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DbConf};
    use figment::providers::{Env, Serialized};
    use figment::Figment;
    use std::path::PathBuf;

    #[test]
    fn sqlite_file_keeps_defaults_for_server_fields() {
        let conf = DbConf::sqlite_file("/tmp/store.db", "key");
        assert!(conf.sqlite);
        assert_eq!(conf.sqlite_path, PathBuf::from("/tmp/store.db"));
        assert_eq!(conf.encryption_key, "key");
        assert_eq!(conf.port, 5432);
    }

    #[test]
    fn figment_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DB_ENCRYPTION_KEY", "__random_strong_encryption_key__");
            jail.set_env("DB_SQLITE", "false");
            jail.set_env("DB_HOST", "db.internal");
            jail.set_env("DB_PORT", "6543");

            let conf = DbConf::from_figment(
                Figment::from(Serialized::defaults(DbConf::default())).merge(Env::prefixed("DB_")),
            )
            .expect("env should extract");
            assert!(!conf.sqlite);
            assert_eq!(conf.host, "db.internal");
            assert_eq!(conf.port, 6543);
            assert_eq!(conf.encryption_key, "__random_strong_encryption_key__");
            assert_eq!(conf.db_name, "dockyard");
            Ok(())
        });
    }

    #[test]
    fn figment_rejects_unparseable_port() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DB_PORT", "not-a-port");

            let err = DbConf::from_figment(
                Figment::from(Serialized::defaults(DbConf::default())).merge(Env::prefixed("DB_")),
            )
            .expect_err("bad port must fail");
            assert!(matches!(err, ConfigError::Extract(_)));
            Ok(())
        });
    }
}
