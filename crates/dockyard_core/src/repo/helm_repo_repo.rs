//! Helm chart repository persistence.

use super::{collect_rows, first_row, found, RepoResult};
use crate::model::helm_repo::HelmRepo;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const HELM_REPO_SELECT_SQL: &str =
    "SELECT id, project_id, name, repo_url, basic_auth_integration_id FROM helm_repos";

pub trait HelmRepoRepository {
    fn create_helm_repo(&self, hr: &HelmRepo) -> RepoResult<HelmRepo>;
    fn read_helm_repo(&self, id: RecordId) -> RepoResult<HelmRepo>;
    fn list_helm_repos_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<HelmRepo>>;
}

pub struct SqliteHelmRepoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHelmRepoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HelmRepoRepository for SqliteHelmRepoRepository<'_> {
    fn create_helm_repo(&self, hr: &HelmRepo) -> RepoResult<HelmRepo> {
        hr.validate()?;

        self.conn.execute(
            "INSERT INTO helm_repos (project_id, name, repo_url, basic_auth_integration_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                hr.project_id,
                hr.name.as_str(),
                hr.repo_url.as_str(),
                hr.basic_auth_integration_id,
            ],
        )?;

        let created = HelmRepo {
            id: self.conn.last_insert_rowid(),
            ..hr.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=helm_repo id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_helm_repo(&self, id: RecordId) -> RepoResult<HelmRepo> {
        let hr = first_row(
            self.conn,
            &format!("{HELM_REPO_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_helm_repo_row,
        )?;
        found("helm_repo", id, hr)
    }

    fn list_helm_repos_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<HelmRepo>> {
        collect_rows(
            self.conn,
            &format!("{HELM_REPO_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_helm_repo_row,
        )
    }
}

fn parse_helm_repo_row(row: &Row<'_>) -> RepoResult<HelmRepo> {
    Ok(HelmRepo {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        repo_url: row.get("repo_url")?,
        basic_auth_integration_id: row.get("basic_auth_integration_id")?,
    })
}
