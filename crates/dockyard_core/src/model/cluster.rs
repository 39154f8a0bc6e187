//! Cluster and cluster-candidate records.
//!
//! # Responsibility
//! - Model registered clusters and the candidates discovered from an
//!   uploaded kubeconfig before they are promoted.
//!
//! # Invariants
//! - A cluster references the integration matching its `auth_mechanism`.
//! - `created_cluster_id == 0` means the candidate has not been promoted.
//! - Resolvers belong to exactly one candidate and are written with it.

use super::{
    require_optional_reference, require_reference, require_text, RecordId, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Authentication mechanism used to reach a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAuth {
    #[default]
    Local,
    X509,
    Basic,
    Bearer,
    Oidc,
    Gcp,
    Aws,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: RecordId,
    pub project_id: RecordId,
    pub name: String,
    pub server: String,
    pub auth_mechanism: ClusterAuth,
    pub insecure_skip_tls_verify: bool,
    pub certificate_authority_data: Vec<u8>,
    pub kube_integration_id: Option<RecordId>,
    pub oidc_integration_id: Option<RecordId>,
    pub gcp_integration_id: Option<RecordId>,
    pub aws_integration_id: Option<RecordId>,
}

impl Cluster {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "cluster";
        require_reference(ENTITY, "project_id", self.project_id)?;
        require_text(ENTITY, "name", &self.name)?;
        require_text(ENTITY, "server", &self.server)?;

        for (field, id) in [
            ("kube_integration_id", self.kube_integration_id),
            ("oidc_integration_id", self.oidc_integration_id),
            ("gcp_integration_id", self.gcp_integration_id),
            ("aws_integration_id", self.aws_integration_id),
        ] {
            require_optional_reference(ENTITY, field, id)?;
        }

        let (field, id) = self.auth_integration();
        if id.is_none() {
            return Err(ValidationError::MissingReference {
                entity: ENTITY,
                field,
            });
        }
        Ok(())
    }

    /// Returns the integration column `auth_mechanism` depends on.
    pub fn auth_integration(&self) -> (&'static str, Option<RecordId>) {
        match self.auth_mechanism {
            ClusterAuth::Local | ClusterAuth::X509 | ClusterAuth::Basic | ClusterAuth::Bearer => {
                ("kube_integration_id", self.kube_integration_id)
            }
            ClusterAuth::Oidc => ("oidc_integration_id", self.oidc_integration_id),
            ClusterAuth::Gcp => ("gcp_integration_id", self.gcp_integration_id),
            ClusterAuth::Aws => ("aws_integration_id", self.aws_integration_id),
        }
    }
}

/// A question that must be answered before a candidate can be promoted,
/// e.g. which cluster id an AWS kubeconfig refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterResolver {
    pub id: RecordId,
    pub cluster_candidate_id: RecordId,
    pub name: String,
    pub resolved: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCandidate {
    pub id: RecordId,
    pub auth_mechanism: ClusterAuth,
    pub project_id: RecordId,
    pub created_cluster_id: RecordId,
    pub resolvers: Vec<ClusterResolver>,
    pub name: String,
    pub server: String,
    pub context_name: String,
    pub aws_cluster_id_guess: Vec<u8>,
    pub kubeconfig: Vec<u8>,
}

impl ClusterCandidate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "cluster_candidate";
        require_reference(ENTITY, "project_id", self.project_id)?;
        require_text(ENTITY, "name", &self.name)?;
        require_text(ENTITY, "server", &self.server)?;
        for resolver in &self.resolvers {
            require_text("cluster_resolver", "name", &resolver.name)?;
        }
        Ok(())
    }

    pub fn is_promoted(&self) -> bool {
        self.created_cluster_id != 0
    }

    /// True when every resolver has been answered.
    pub fn is_resolved(&self) -> bool {
        self.resolvers.iter().all(|resolver| resolver.resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cluster, ClusterAuth, ClusterCandidate, ClusterResolver};
    use crate::model::ValidationError;

    fn cluster(auth_mechanism: ClusterAuth) -> Cluster {
        Cluster {
            project_id: 1,
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            auth_mechanism,
            ..Cluster::default()
        }
    }

    #[test]
    fn cluster_requires_integration_matching_mechanism() {
        let mut local = cluster(ClusterAuth::Local);
        assert_eq!(
            local.validate(),
            Err(ValidationError::MissingReference {
                entity: "cluster",
                field: "kube_integration_id"
            })
        );
        local.kube_integration_id = Some(3);
        assert!(local.validate().is_ok());

        let mut aws = cluster(ClusterAuth::Aws);
        aws.kube_integration_id = Some(3);
        assert!(aws.validate().is_err());
        aws.aws_integration_id = Some(1);
        assert!(aws.validate().is_ok());
    }

    #[test]
    fn candidate_resolution_state() {
        let mut candidate = ClusterCandidate {
            project_id: 1,
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            ..ClusterCandidate::default()
        };
        assert!(candidate.is_resolved());
        assert!(!candidate.is_promoted());

        candidate.resolvers.push(ClusterResolver {
            name: "upload_kubeconfig".to_string(),
            ..ClusterResolver::default()
        });
        assert!(!candidate.is_resolved());
        candidate.resolvers[0].resolved = true;
        assert!(candidate.is_resolved());

        candidate.created_cluster_id = 7;
        assert!(candidate.is_promoted());
    }
}
