//! Credential integrations attached to a project.
//!
//! # Responsibility
//! - Model the credential shapes used to reach clusters, registries and
//!   source hosts.
//! - Check that each credential carries the material its mechanism needs.
//!
//! # Invariants
//! - Every integration belongs to exactly one project and was created by
//!   one user.
//! - All `Vec<u8>` fields are sensitive and encrypted at rest.

use super::{require_bytes, require_reference, require_text, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

fn require_owner(
    entity: &'static str,
    project_id: RecordId,
    user_id: RecordId,
) -> Result<(), ValidationError> {
    require_reference(entity, "project_id", project_id)?;
    require_reference(entity, "user_id", user_id)
}

/// How a kube integration authenticates against the API server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KubeMechanism {
    /// Client certificate + key.
    X509,
    /// Username + password.
    Basic,
    /// Static bearer token.
    Bearer,
    /// Raw kubeconfig, used for local clusters.
    #[default]
    Local,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeIntegration {
    pub id: RecordId,
    pub mechanism: KubeMechanism,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub client_certificate_data: Vec<u8>,
    pub client_key_data: Vec<u8>,
    pub token: Vec<u8>,
    pub username: Vec<u8>,
    pub password: Vec<u8>,
    pub kubeconfig: Vec<u8>,
}

impl KubeIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "kube_integration";
        require_owner(ENTITY, self.project_id, self.user_id)?;
        match self.mechanism {
            KubeMechanism::X509 => {
                require_bytes(ENTITY, "client_certificate_data", &self.client_certificate_data)?;
                require_bytes(ENTITY, "client_key_data", &self.client_key_data)
            }
            KubeMechanism::Basic => {
                require_bytes(ENTITY, "username", &self.username)?;
                require_bytes(ENTITY, "password", &self.password)
            }
            KubeMechanism::Bearer => require_bytes(ENTITY, "token", &self.token),
            KubeMechanism::Local => require_bytes(ENTITY, "kubeconfig", &self.kubeconfig),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicIntegration {
    pub id: RecordId,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub username: Vec<u8>,
    pub password: Vec<u8>,
}

impl BasicIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_owner("basic_integration", self.project_id, self.user_id)?;
        require_bytes("basic_integration", "username", &self.username)
    }
}

/// Consumer of an OIDC integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OidcClient {
    #[default]
    Kube,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcIntegration {
    pub id: RecordId,
    pub client: OidcClient,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub issuer_url: Vec<u8>,
    pub client_id: Vec<u8>,
    pub client_secret: Vec<u8>,
    pub certificate_authority_data: Vec<u8>,
    pub id_token: Vec<u8>,
    pub refresh_token: Vec<u8>,
}

impl OidcIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "oidc_integration";
        require_owner(ENTITY, self.project_id, self.user_id)?;
        require_bytes(ENTITY, "issuer_url", &self.issuer_url)?;
        require_bytes(ENTITY, "client_id", &self.client_id)
    }
}

/// OAuth provider that issued the tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthClient {
    #[default]
    Github,
    #[serde(rename = "digitalocean")]
    DigitalOcean,
    Google,
}

/// Token material shared by OAuth-backed credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub client_id: Vec<u8>,
    pub access_token: Vec<u8>,
    pub refresh_token: Vec<u8>,
    /// Access token expiry in epoch milliseconds.
    pub expiry: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthIntegration {
    pub id: RecordId,
    pub client: OAuthClient,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub tokens: OAuthTokens,
}

impl OAuthIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_owner("oauth_integration", self.project_id, self.user_id)?;
        require_bytes("oauth_integration", "access_token", &self.tokens.access_token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpIntegration {
    pub id: RecordId,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub gcp_project_id: String,
    pub gcp_sa_email: String,
    pub gcp_user_email: String,
    pub gcp_region: String,
    /// Service-account JSON key.
    pub gcp_key_data: Vec<u8>,
}

impl GcpIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "gcp_integration";
        require_owner(ENTITY, self.project_id, self.user_id)?;
        require_text(ENTITY, "gcp_project_id", &self.gcp_project_id)?;
        require_bytes(ENTITY, "gcp_key_data", &self.gcp_key_data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsIntegration {
    pub id: RecordId,
    pub project_id: RecordId,
    pub user_id: RecordId,
    pub aws_arn: String,
    pub aws_region: String,
    pub aws_cluster_id: Vec<u8>,
    pub aws_access_key_id: Vec<u8>,
    pub aws_secret_access_key: Vec<u8>,
    /// Optional for long-lived keys.
    pub aws_session_token: Vec<u8>,
}

impl AwsIntegration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const ENTITY: &str = "aws_integration";
        require_owner(ENTITY, self.project_id, self.user_id)?;
        require_bytes(ENTITY, "aws_access_key_id", &self.aws_access_key_id)?;
        require_bytes(ENTITY, "aws_secret_access_key", &self.aws_secret_access_key)
    }
}
