//! Release persistence.

use super::{collect_rows, first_row, found, RepoResult};
use crate::model::release::Release;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const RELEASE_SELECT_SQL: &str =
    "SELECT id, name, namespace, project_id, cluster_id, webhook_token FROM releases";

pub trait ReleaseRepository {
    fn create_release(&self, release: &Release) -> RepoResult<Release>;
    fn read_release(&self, id: RecordId) -> RepoResult<Release>;
    /// Resolves the release a redeploy webhook call targets.
    fn read_release_by_webhook_token(&self, token: &str) -> RepoResult<Option<Release>>;
    fn list_releases_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Release>>;
}

pub struct SqliteReleaseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReleaseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReleaseRepository for SqliteReleaseRepository<'_> {
    fn create_release(&self, release: &Release) -> RepoResult<Release> {
        release.validate()?;

        self.conn.execute(
            "INSERT INTO releases (name, namespace, project_id, cluster_id, webhook_token)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                release.name.as_str(),
                release.namespace.as_str(),
                release.project_id,
                release.cluster_id,
                release.webhook_token.as_str(),
            ],
        )?;

        let created = Release {
            id: self.conn.last_insert_rowid(),
            ..release.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=release id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_release(&self, id: RecordId) -> RepoResult<Release> {
        let release = first_row(
            self.conn,
            &format!("{RELEASE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_release_row,
        )?;
        found("release", id, release)
    }

    fn read_release_by_webhook_token(&self, token: &str) -> RepoResult<Option<Release>> {
        first_row(
            self.conn,
            &format!("{RELEASE_SELECT_SQL} WHERE webhook_token = ?1;"),
            [token],
            parse_release_row,
        )
    }

    fn list_releases_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Release>> {
        collect_rows(
            self.conn,
            &format!("{RELEASE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_release_row,
        )
    }
}

fn parse_release_row(row: &Row<'_>) -> RepoResult<Release> {
    Ok(Release {
        id: row.get("id")?,
        name: row.get("name")?,
        namespace: row.get("namespace")?,
        project_id: row.get("project_id")?,
        cluster_id: row.get("cluster_id")?,
        webhook_token: row.get("webhook_token")?,
    })
}
