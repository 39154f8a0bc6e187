//! Deployed chart release record.

use super::{
    require_optional_reference, require_reference, require_text, RecordId, ValidationError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: RecordId,
    pub name: String,
    pub namespace: String,
    pub project_id: RecordId,
    pub cluster_id: Option<RecordId>,
    /// Unique token accepted by the redeploy webhook.
    pub webhook_token: String,
}

impl Release {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("release", "name", &self.name)?;
        require_text("release", "namespace", &self.namespace)?;
        require_reference("release", "project_id", self.project_id)?;
        require_optional_reference("release", "cluster_id", self.cluster_id)?;
        require_text("release", "webhook_token", &self.webhook_token)
    }
}
