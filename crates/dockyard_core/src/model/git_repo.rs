//! Source repository linked to a project through an OAuth integration.

use super::{require_reference, require_text, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepo {
    pub id: RecordId,
    pub project_id: RecordId,
    /// Owner (user or organization) on the source host.
    pub repo_entity: String,
    pub oauth_integration_id: RecordId,
}

impl GitRepo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_reference("git_repo", "project_id", self.project_id)?;
        require_text("git_repo", "repo_entity", &self.repo_entity)?;
        require_reference("git_repo", "oauth_integration_id", self.oauth_integration_id)
    }
}
