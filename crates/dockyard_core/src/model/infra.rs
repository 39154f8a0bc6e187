//! Provisioned infrastructure record.

use super::{require_reference, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraKind {
    #[default]
    Test,
    Ecr,
    Eks,
    Gcr,
    Gke,
}

/// Provisioning lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraStatus {
    #[default]
    Creating,
    Created,
    Error,
    Destroying,
    Destroyed,
}

impl InfraStatus {
    /// True once no further provisioning work is pending.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Created | Self::Error | Self::Destroyed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infra {
    pub id: RecordId,
    pub kind: InfraKind,
    pub project_id: RecordId,
    pub status: InfraStatus,
}

impl Infra {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_reference("infra", "project_id", self.project_id)
    }
}
