//! Persistence layer for the dockyard deployment control plane.
//!
//! Opens the backing store, creates every entity table, and exposes one
//! repository per entity kind with sensitive columns encrypted at rest.

pub mod config;
pub mod crypto;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, DbConf};
pub use crypto::{CryptoError, EncryptionKey, FieldCipher, KEY_LEN};
pub use db::{destroy_db, open_db, open_db_in_memory, DbError, DbResult, Store};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::cluster::{Cluster, ClusterAuth, ClusterCandidate, ClusterResolver};
pub use model::git_repo::GitRepo;
pub use model::helm_repo::HelmRepo;
pub use model::infra::{Infra, InfraKind, InfraStatus};
pub use model::integrations::{
    AwsIntegration, BasicIntegration, GcpIntegration, KubeIntegration, KubeMechanism,
    OAuthClient, OAuthIntegration, OAuthTokens, OidcClient, OidcIntegration,
};
pub use model::invite::Invite;
pub use model::project::{Project, Role, RoleKind};
pub use model::registry::Registry;
pub use model::release::Release;
pub use model::user::User;
pub use model::{RecordId, ValidationError};
pub use repo::cluster_repo::ClusterRepository;
pub use repo::git_repo_repo::GitRepoRepository;
pub use repo::helm_repo_repo::HelmRepoRepository;
pub use repo::infra_repo::InfraRepository;
pub use repo::integration_repo::{
    AwsIntegrationRepository, BasicIntegrationRepository, GcpIntegrationRepository,
    KubeIntegrationRepository, OAuthIntegrationRepository, OidcIntegrationRepository,
};
pub use repo::invite_repo::InviteRepository;
pub use repo::project_repo::ProjectRepository;
pub use repo::registry_repo::RegistryRepository;
pub use repo::release_repo::ReleaseRepository;
pub use repo::user_repo::UserRepository;
pub use repo::{ensure_connection_ready, RepoError, RepoResult, Repository};

/// Returns the crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
