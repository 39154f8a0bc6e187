//! Project/role repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and the roles binding users to them.
//! - Load projects together with their roles.
//!
//! # Invariants
//! - Roles are read in id order so the first admin is stable.

use super::{collect_rows, first_row, found, parse_column, RepoError, RepoResult};
use crate::model::project::{Project, Role, RoleKind};
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<Project>;
    /// Binds `role.user_id` to `project` and returns the stored role.
    fn create_project_role(&self, project: &Project, role: &Role) -> RepoResult<Role>;
    /// Reads a project with its roles.
    fn read_project(&self, id: RecordId) -> RepoResult<Project>;
    fn list_projects_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Project>>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn roles_for(&self, project_id: RecordId) -> RepoResult<Vec<Role>> {
        collect_rows(
            self.conn,
            "SELECT id, kind, user_id, project_id
             FROM roles
             WHERE project_id = ?1
             ORDER BY id ASC;",
            [project_id],
            parse_role_row,
        )
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<Project> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (name) VALUES (?1);",
            [project.name.as_str()],
        )?;

        let created = Project {
            id: self.conn.last_insert_rowid(),
            name: project.name.clone(),
            roles: Vec::new(),
        };
        debug!(
            "event=repo_create module=repo status=ok entity=project id={}",
            created.id
        );
        Ok(created)
    }

    fn create_project_role(&self, project: &Project, role: &Role) -> RepoResult<Role> {
        if role.project_id != 0 && role.project_id != project.id {
            return Err(RepoError::InvalidData(format!(
                "role targets project {} but was submitted for project {}",
                role.project_id, project.id
            )));
        }

        let role = Role {
            project_id: project.id,
            ..role.clone()
        };
        role.validate()?;

        self.conn.execute(
            "INSERT INTO roles (kind, user_id, project_id) VALUES (?1, ?2, ?3);",
            params![role_kind_to_db(role.kind), role.user_id, role.project_id],
        )?;

        let created = Role {
            id: self.conn.last_insert_rowid(),
            ..role
        };
        debug!(
            "event=repo_create module=repo status=ok entity=role id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_project(&self, id: RecordId) -> RepoResult<Project> {
        let project = first_row(
            self.conn,
            "SELECT id, name FROM projects WHERE id = ?1;",
            [id],
            parse_project_row,
        )?;
        let mut project = found("project", id, project)?;
        project.roles = self.roles_for(project.id)?;
        Ok(project)
    }

    fn list_projects_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Project>> {
        let mut projects = collect_rows(
            self.conn,
            "SELECT projects.id, projects.name
             FROM projects
             JOIN roles ON roles.project_id = projects.id
             WHERE roles.user_id = ?1
             ORDER BY projects.id ASC;",
            [user_id],
            parse_project_row,
        )?;
        for project in &mut projects {
            project.roles = self.roles_for(project.id)?;
        }
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        roles: Vec::new(),
    })
}

fn parse_role_row(row: &Row<'_>) -> RepoResult<Role> {
    Ok(Role {
        id: row.get("id")?,
        kind: parse_column(row, "roles", "kind", parse_role_kind)?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
    })
}

fn role_kind_to_db(kind: RoleKind) -> &'static str {
    match kind {
        RoleKind::Admin => "admin",
        RoleKind::Developer => "developer",
        RoleKind::Viewer => "viewer",
    }
}

fn parse_role_kind(value: &str) -> Option<RoleKind> {
    match value {
        "admin" => Some(RoleKind::Admin),
        "developer" => Some(RoleKind::Developer),
        "viewer" => Some(RoleKind::Viewer),
        _ => None,
    }
}
