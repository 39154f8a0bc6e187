//! Provisioned infrastructure persistence.

use super::{collect_rows, first_row, found, parse_column, RepoResult};
use crate::model::infra::{Infra, InfraKind, InfraStatus};
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const INFRA_SELECT_SQL: &str = "SELECT id, kind, project_id, status FROM infras";

pub trait InfraRepository {
    fn create_infra(&self, infra: &Infra) -> RepoResult<Infra>;
    fn read_infra(&self, id: RecordId) -> RepoResult<Infra>;
    fn list_infras_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Infra>>;
}

pub struct SqliteInfraRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInfraRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl InfraRepository for SqliteInfraRepository<'_> {
    fn create_infra(&self, infra: &Infra) -> RepoResult<Infra> {
        infra.validate()?;

        self.conn.execute(
            "INSERT INTO infras (kind, project_id, status) VALUES (?1, ?2, ?3);",
            params![
                infra_kind_to_db(infra.kind),
                infra.project_id,
                infra_status_to_db(infra.status),
            ],
        )?;

        let created = Infra {
            id: self.conn.last_insert_rowid(),
            ..infra.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=infra id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_infra(&self, id: RecordId) -> RepoResult<Infra> {
        let infra = first_row(
            self.conn,
            &format!("{INFRA_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_infra_row,
        )?;
        found("infra", id, infra)
    }

    fn list_infras_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Infra>> {
        collect_rows(
            self.conn,
            &format!("{INFRA_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_infra_row,
        )
    }
}

fn parse_infra_row(row: &Row<'_>) -> RepoResult<Infra> {
    Ok(Infra {
        id: row.get("id")?,
        kind: parse_column(row, "infras", "kind", parse_infra_kind)?,
        project_id: row.get("project_id")?,
        status: parse_column(row, "infras", "status", parse_infra_status)?,
    })
}

fn infra_kind_to_db(kind: InfraKind) -> &'static str {
    match kind {
        InfraKind::Test => "test",
        InfraKind::Ecr => "ecr",
        InfraKind::Eks => "eks",
        InfraKind::Gcr => "gcr",
        InfraKind::Gke => "gke",
    }
}

fn parse_infra_kind(value: &str) -> Option<InfraKind> {
    match value {
        "test" => Some(InfraKind::Test),
        "ecr" => Some(InfraKind::Ecr),
        "eks" => Some(InfraKind::Eks),
        "gcr" => Some(InfraKind::Gcr),
        "gke" => Some(InfraKind::Gke),
        _ => None,
    }
}

fn infra_status_to_db(status: InfraStatus) -> &'static str {
    match status {
        InfraStatus::Creating => "creating",
        InfraStatus::Created => "created",
        InfraStatus::Error => "error",
        InfraStatus::Destroying => "destroying",
        InfraStatus::Destroyed => "destroyed",
    }
}

fn parse_infra_status(value: &str) -> Option<InfraStatus> {
    match value {
        "creating" => Some(InfraStatus::Creating),
        "created" => Some(InfraStatus::Created),
        "error" => Some(InfraStatus::Error),
        "destroying" => Some(InfraStatus::Destroying),
        "destroyed" => Some(InfraStatus::Destroyed),
        _ => None,
    }
}
