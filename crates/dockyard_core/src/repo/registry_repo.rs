//! Image registry persistence.

use super::{collect_rows, first_row, found, RepoResult};
use crate::model::registry::Registry;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const REGISTRY_SELECT_SQL: &str =
    "SELECT id, project_id, name, url, aws_integration_id, gcp_integration_id FROM registries";

pub trait RegistryRepository {
    fn create_registry(&self, reg: &Registry) -> RepoResult<Registry>;
    fn read_registry(&self, id: RecordId) -> RepoResult<Registry>;
    fn list_registries_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Registry>>;
}

pub struct SqliteRegistryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RegistryRepository for SqliteRegistryRepository<'_> {
    fn create_registry(&self, reg: &Registry) -> RepoResult<Registry> {
        reg.validate()?;

        self.conn.execute(
            "INSERT INTO registries (project_id, name, url, aws_integration_id, gcp_integration_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                reg.project_id,
                reg.name.as_str(),
                reg.url.as_str(),
                reg.aws_integration_id,
                reg.gcp_integration_id,
            ],
        )?;

        let created = Registry {
            id: self.conn.last_insert_rowid(),
            ..reg.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=registry id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_registry(&self, id: RecordId) -> RepoResult<Registry> {
        let reg = first_row(
            self.conn,
            &format!("{REGISTRY_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_registry_row,
        )?;
        found("registry", id, reg)
    }

    fn list_registries_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Registry>> {
        collect_rows(
            self.conn,
            &format!("{REGISTRY_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_registry_row,
        )
    }
}

fn parse_registry_row(row: &Row<'_>) -> RepoResult<Registry> {
    Ok(Registry {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        url: row.get("url")?,
        aws_integration_id: row.get("aws_integration_id")?,
        gcp_integration_id: row.get("gcp_integration_id")?,
    })
}
