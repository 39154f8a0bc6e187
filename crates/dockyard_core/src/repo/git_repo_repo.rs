//! Git repository link persistence.

use super::{collect_rows, first_row, found, RepoResult};
use crate::model::git_repo::GitRepo;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const GIT_REPO_SELECT_SQL: &str =
    "SELECT id, project_id, repo_entity, oauth_integration_id FROM git_repos";

pub trait GitRepoRepository {
    fn create_git_repo(&self, gr: &GitRepo) -> RepoResult<GitRepo>;
    fn read_git_repo(&self, id: RecordId) -> RepoResult<GitRepo>;
    fn list_git_repos_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<GitRepo>>;
}

pub struct SqliteGitRepoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGitRepoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GitRepoRepository for SqliteGitRepoRepository<'_> {
    fn create_git_repo(&self, gr: &GitRepo) -> RepoResult<GitRepo> {
        gr.validate()?;

        self.conn.execute(
            "INSERT INTO git_repos (project_id, repo_entity, oauth_integration_id)
             VALUES (?1, ?2, ?3);",
            params![gr.project_id, gr.repo_entity.as_str(), gr.oauth_integration_id],
        )?;

        let created = GitRepo {
            id: self.conn.last_insert_rowid(),
            ..gr.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=git_repo id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_git_repo(&self, id: RecordId) -> RepoResult<GitRepo> {
        let gr = first_row(
            self.conn,
            &format!("{GIT_REPO_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_git_repo_row,
        )?;
        found("git_repo", id, gr)
    }

    fn list_git_repos_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<GitRepo>> {
        collect_rows(
            self.conn,
            &format!("{GIT_REPO_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_git_repo_row,
        )
    }
}

fn parse_git_repo_row(row: &Row<'_>) -> RepoResult<GitRepo> {
    Ok(GitRepo {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        repo_entity: row.get("repo_entity")?,
        oauth_integration_id: row.get("oauth_integration_id")?,
    })
}
