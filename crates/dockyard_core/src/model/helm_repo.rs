//! Helm chart repository record.

use super::{
    require_optional_reference, require_reference, require_text, RecordId, ValidationError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmRepo {
    pub id: RecordId,
    pub project_id: RecordId,
    pub name: String,
    pub repo_url: String,
    pub basic_auth_integration_id: Option<RecordId>,
}

impl HelmRepo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_reference("helm_repo", "project_id", self.project_id)?;
        require_text("helm_repo", "name", &self.name)?;
        require_text("helm_repo", "repo_url", &self.repo_url)?;
        require_optional_reference(
            "helm_repo",
            "basic_auth_integration_id",
            self.basic_auth_integration_id,
        )
    }
}
