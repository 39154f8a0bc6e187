//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Declare the full control-plane schema as an ordered list of migrations.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Every table in [`ENTITY_TABLES`] exists once the latest version is applied.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_accounts_integrations.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_clusters_releases.sql"),
    },
];

/// Every table created by the migrations, in creation order.
pub const ENTITY_TABLES: &[&str] = &[
    "users",
    "projects",
    "roles",
    "sessions",
    "kube_integrations",
    "basic_integrations",
    "oidc_integrations",
    "oauth_integrations",
    "gcp_integrations",
    "aws_integrations",
    "clusters",
    "cluster_candidates",
    "cluster_resolvers",
    "cluster_token_caches",
    "git_repos",
    "registries",
    "reg_token_caches",
    "helm_repos",
    "helm_repo_token_caches",
    "infras",
    "invites",
    "releases",
    "git_action_configs",
    "github_app_installations",
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Returns the schema version recorded on the connection.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current, latest
    );
    Ok(())
}
