//! Container image registry record.

use super::{
    require_optional_reference, require_reference, require_text, RecordId, ValidationError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub id: RecordId,
    pub project_id: RecordId,
    pub name: String,
    pub url: String,
    pub aws_integration_id: Option<RecordId>,
    pub gcp_integration_id: Option<RecordId>,
}

impl Registry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_reference("registry", "project_id", self.project_id)?;
        require_text("registry", "name", &self.name)?;
        require_optional_reference("registry", "aws_integration_id", self.aws_integration_id)?;
        require_optional_reference("registry", "gcp_integration_id", self.gcp_integration_id)
    }
}
