//! Store handle: one migrated connection plus the column cipher.
//!
//! # Responsibility
//! - Validate [`DbConf`] and open the configured backend.
//! - Hand out the repository aggregate bound to this connection.
//! - Remove file-backed stores at teardown.
//!
//! # Invariants
//! - A `Store` only exists for a fully migrated connection.
//! - The cipher is derived from the configured key exactly once.

use super::{open_db, open_db_in_memory, DbResult};
use crate::config::{ConfigError, DbConf};
use crate::crypto::{EncryptionKey, FieldCipher};
use crate::repo::{RepoResult, Repository};
use log::info;
use rusqlite::Connection;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm", "-journal"];

/// Process-scoped handle to the backing store.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    cipher: FieldCipher,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens the store described by `conf` and creates any missing tables.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidEncryptionKey`] when the key is not 32 bytes.
    /// - [`ConfigError::UnsupportedBackend`] when `sqlite` is `false`.
    /// - [`ConfigError::EmptySqlitePath`] when no file path is configured.
    /// - Sqlite/migration errors from the bootstrap itself.
    pub fn open(conf: &DbConf) -> DbResult<Self> {
        let key = EncryptionKey::from_passphrase(&conf.encryption_key)?;

        if !conf.sqlite {
            return Err(ConfigError::UnsupportedBackend {
                host: conf.host.clone(),
                port: conf.port,
            }
            .into());
        }
        if conf.sqlite_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptySqlitePath.into());
        }

        let conn = open_db(&conf.sqlite_path)?;
        Ok(Self {
            conn,
            cipher: FieldCipher::new(&key),
            path: Some(conf.sqlite_path.clone()),
        })
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory(key: &EncryptionKey) -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            cipher: FieldCipher::new(key),
            path: None,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// Backing file, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the repository aggregate bound to this store.
    pub fn repository(&self) -> RepoResult<Repository<'_>> {
        Repository::try_new(&self.conn, &self.cipher)
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

/// Removes a file-backed store and its WAL/SHM/journal sidecars.
///
/// Missing files are not an error, so teardown may run more than once.
pub fn destroy_db(path: impl AsRef<Path>) -> DbResult<()> {
    let path = path.as_ref();
    let mut removed = 0usize;

    for candidate in std::iter::once(path.to_path_buf()).chain(
        SIDECAR_SUFFIXES
            .iter()
            .map(|suffix| with_suffix(path, suffix)),
    ) {
        match std::fs::remove_file(&candidate) {
            Ok(()) => removed += 1,
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        "event=db_destroy module=db status=ok path={} removed_files={}",
        path.display(),
        removed
    );
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
