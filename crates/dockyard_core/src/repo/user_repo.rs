//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Emails are unique; a duplicate insert surfaces the store's constraint
//!   error unchanged.

use super::{first_row, found, RepoResult};
use crate::model::user::User;
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT id, email, password FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<User>;
    fn read_user(&self, id: RecordId) -> RepoResult<User>;
    fn read_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (email, password) VALUES (?1, ?2);",
            params![user.email.as_str(), user.password.as_str()],
        )?;

        let created = User {
            id: self.conn.last_insert_rowid(),
            ..user.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=user id={}",
            created.id
        );
        Ok(created)
    }

    fn read_user(&self, id: RecordId) -> RepoResult<User> {
        let user = first_row(
            self.conn,
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_user_row,
        )?;
        found("user", id, user)
    }

    fn read_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        first_row(
            self.conn,
            &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
            [email],
            parse_user_row,
        )
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password: row.get("password")?,
    })
}
