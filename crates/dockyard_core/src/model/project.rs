//! Project and project-role records.
//!
//! # Invariants
//! - A user holds at most one role per project.
//! - `Project::roles` is populated on reads only; creating a project never
//!   creates roles.

use super::{require_reference, require_text, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

/// Permission level a user holds inside a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Admin,
    Developer,
    #[default]
    Viewer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("project", "name", &self.name)
    }

    /// Returns the role bound to `user_id`, if any.
    pub fn role_for(&self, user_id: RecordId) -> Option<&Role> {
        self.roles.iter().find(|role| role.user_id == user_id)
    }
}

/// Binds one user to one project with a [`RoleKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RecordId,
    pub kind: RoleKind,
    pub user_id: RecordId,
    pub project_id: RecordId,
}

impl Role {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_reference("role", "user_id", self.user_id)?;
        require_reference("role", "project_id", self.project_id)
    }
}
