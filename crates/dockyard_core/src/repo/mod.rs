//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one narrow data access contract per entity kind.
//! - Isolate SQLite query details and column encryption from callers.
//!
//! # Invariants
//! - Repository writes must call the record's `validate()` before any SQL.
//! - Repositories only bind to connections whose schema is fully migrated.
//! - Sensitive byte columns are sealed on write and opened on read.

use crate::crypto::{CryptoError, FieldCipher};
use crate::db::migrations::{current_version, latest_version, ENTITY_TABLES};
use crate::db::DbError;
use crate::model::{RecordId, ValidationError};
use rusqlite::{Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cluster_repo;
pub mod git_repo_repo;
pub mod helm_repo_repo;
pub mod infra_repo;
pub mod integration_repo;
pub mod invite_repo;
pub mod project_repo;
pub mod registry_repo;
pub mod release_repo;
pub mod user_repo;

use cluster_repo::SqliteClusterRepository;
use git_repo_repo::SqliteGitRepoRepository;
use helm_repo_repo::SqliteHelmRepoRepository;
use infra_repo::SqliteInfraRepository;
use integration_repo::{
    SqliteAwsIntegrationRepository, SqliteBasicIntegrationRepository,
    SqliteGcpIntegrationRepository, SqliteKubeIntegrationRepository,
    SqliteOAuthIntegrationRepository, SqliteOidcIntegrationRepository,
};
use invite_repo::SqliteInviteRepository;
use project_repo::SqliteProjectRepository;
use registry_repo::SqliteRegistryRepository;
use release_repo::SqliteReleaseRepository;
use user_repo::SqliteUserRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by every repository.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    Crypto(CryptoError),
    NotFound {
        entity: &'static str,
        id: RecordId,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Crypto(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through the store"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Crypto(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<CryptoError> for RepoError {
    fn from(value: CryptoError) -> Self {
        Self::Crypto(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Entry point to every per-entity repository over one connection.
#[derive(Debug, Clone, Copy)]
pub struct Repository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> Repository<'conn> {
    /// Binds to a connection after checking its schema is current.
    pub fn try_new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, cipher })
    }

    pub fn user(&self) -> SqliteUserRepository<'conn> {
        SqliteUserRepository::new(self.conn)
    }

    pub fn project(&self) -> SqliteProjectRepository<'conn> {
        SqliteProjectRepository::new(self.conn)
    }

    pub fn kube_integration(&self) -> SqliteKubeIntegrationRepository<'conn> {
        SqliteKubeIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn basic_integration(&self) -> SqliteBasicIntegrationRepository<'conn> {
        SqliteBasicIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn oidc_integration(&self) -> SqliteOidcIntegrationRepository<'conn> {
        SqliteOidcIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn oauth_integration(&self) -> SqliteOAuthIntegrationRepository<'conn> {
        SqliteOAuthIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn gcp_integration(&self) -> SqliteGcpIntegrationRepository<'conn> {
        SqliteGcpIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn aws_integration(&self) -> SqliteAwsIntegrationRepository<'conn> {
        SqliteAwsIntegrationRepository::new(self.conn, self.cipher)
    }

    pub fn cluster(&self) -> SqliteClusterRepository<'conn> {
        SqliteClusterRepository::new(self.conn, self.cipher)
    }

    pub fn git_repo(&self) -> SqliteGitRepoRepository<'conn> {
        SqliteGitRepoRepository::new(self.conn)
    }

    pub fn registry(&self) -> SqliteRegistryRepository<'conn> {
        SqliteRegistryRepository::new(self.conn)
    }

    pub fn helm_repo(&self) -> SqliteHelmRepoRepository<'conn> {
        SqliteHelmRepoRepository::new(self.conn)
    }

    pub fn infra(&self) -> SqliteInfraRepository<'conn> {
        SqliteInfraRepository::new(self.conn)
    }

    pub fn invite(&self) -> SqliteInviteRepository<'conn> {
        SqliteInviteRepository::new(self.conn)
    }

    pub fn release(&self) -> SqliteReleaseRepository<'conn> {
        SqliteReleaseRepository::new(self.conn)
    }
}

/// Rejects connections that were not opened through the migration path.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in ENTITY_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn collect_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    mut parse: impl FnMut(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

pub(crate) fn first_row<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    parse: impl FnOnce(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(parse(row)?)),
        None => Ok(None),
    }
}

/// Maps a missing row to [`RepoError::NotFound`].
pub(crate) fn found<T>(entity: &'static str, id: RecordId, value: Option<T>) -> RepoResult<T> {
    value.ok_or(RepoError::NotFound { entity, id })
}

pub(crate) fn parse_column<T>(
    row: &Row<'_>,
    table: &str,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> RepoResult<T> {
    let text: String = row.get(column)?;
    parse(&text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn bool_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn sealed_column(
    cipher: &FieldCipher,
    row: &Row<'_>,
    column: &str,
) -> RepoResult<Vec<u8>> {
    let sealed: Vec<u8> = row.get(column)?;
    Ok(cipher.decrypt(&sealed)?)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
