//! Project invite persistence.
//!
//! # Invariants
//! - Lookups by token are exact; tokens are unique in storage.

use super::{collect_rows, first_row, found, RepoResult};
use crate::model::invite::Invite;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const INVITE_SELECT_SQL: &str = "SELECT id, token, expiry, email, project_id, user_id FROM invites";

pub trait InviteRepository {
    fn create_invite(&self, invite: &Invite) -> RepoResult<Invite>;
    fn read_invite(&self, id: RecordId) -> RepoResult<Invite>;
    fn read_invite_by_token(&self, token: &str) -> RepoResult<Option<Invite>>;
    fn list_invites_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Invite>>;
}

pub struct SqliteInviteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInviteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl InviteRepository for SqliteInviteRepository<'_> {
    fn create_invite(&self, invite: &Invite) -> RepoResult<Invite> {
        invite.validate()?;

        self.conn.execute(
            "INSERT INTO invites (token, expiry, email, project_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                invite.token.as_str(),
                invite.expiry,
                invite.email.as_str(),
                invite.project_id,
                invite.user_id,
            ],
        )?;

        let created = Invite {
            id: self.conn.last_insert_rowid(),
            ..invite.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=invite id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_invite(&self, id: RecordId) -> RepoResult<Invite> {
        let invite = first_row(
            self.conn,
            &format!("{INVITE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_invite_row,
        )?;
        found("invite", id, invite)
    }

    fn read_invite_by_token(&self, token: &str) -> RepoResult<Option<Invite>> {
        first_row(
            self.conn,
            &format!("{INVITE_SELECT_SQL} WHERE token = ?1;"),
            [token],
            parse_invite_row,
        )
    }

    fn list_invites_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Invite>> {
        collect_rows(
            self.conn,
            &format!("{INVITE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            parse_invite_row,
        )
    }
}

fn parse_invite_row(row: &Row<'_>) -> RepoResult<Invite> {
    Ok(Invite {
        id: row.get("id")?,
        token: row.get("token")?,
        expiry: row.get("expiry")?,
        email: row.get("email")?,
        project_id: row.get("project_id")?,
        user_id: row.get("user_id")?,
    })
}
