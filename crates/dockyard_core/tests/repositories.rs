mod common;

use common::{TestEnv, SAMPLE_KUBECONFIG};
use dockyard_core::{
    AwsIntegrationRepository, BasicIntegrationRepository, Cluster, ClusterAuth,
    ClusterCandidate, ClusterRepository, ClusterResolver, DbError, GcpIntegrationRepository,
    HelmRepoRepository, InfraRepository, InviteRepository, KubeIntegrationRepository,
    OAuthIntegrationRepository, OidcIntegrationRepository, ProjectRepository, RepoError,
    Registry, RegistryRepository, ReleaseRepository, Role, RoleKind, User, UserRepository,
    ValidationError,
};

fn raw_blob(env: &TestEnv, table: &str, column: &str, id: i64) -> Vec<u8> {
    env.store
        .connection()
        .query_row(
            &format!("SELECT {column} FROM {table} WHERE id = ?1;"),
            [id],
            |row| row.get(0),
        )
        .unwrap()
}

#[test]
fn sensitive_columns_are_sealed_at_rest() {
    let mut env = TestEnv::new("sealed_columns");
    let ki = env.init_kube_integration();
    let aws = env.init_aws_integration();
    let cluster = env.init_cluster();

    let sealed = raw_blob(&env, "kube_integrations", "kubeconfig", ki.id);
    assert_ne!(sealed, SAMPLE_KUBECONFIG);
    assert!(sealed.len() > SAMPLE_KUBECONFIG.len());

    let sealed_secret = raw_blob(&env, "aws_integrations", "aws_secret_access_key", aws.id);
    assert_ne!(sealed_secret, b"secret");

    let sealed_ca = raw_blob(&env, "clusters", "certificate_authority_data", cluster.id);
    assert_ne!(sealed_ca, b"-----BEGIN");

    let repo = env.repo();
    assert_eq!(repo.aws_integration().read_aws_integration(aws.id).unwrap(), aws);
    assert_eq!(repo.cluster().read_cluster(cluster.id).unwrap(), cluster);
    env.cleanup();
}

#[test]
fn empty_sensitive_values_stay_empty() {
    let mut env = TestEnv::new("empty_sealed");
    let ki = env.init_kube_integration();

    assert!(raw_blob(&env, "kube_integrations", "token", ki.id).is_empty());
    let stored = env
        .repo()
        .kube_integration()
        .read_kube_integration(ki.id)
        .unwrap();
    assert!(stored.token.is_empty());
    env.cleanup();
}

#[test]
fn every_integration_reads_back_as_written() {
    let mut env = TestEnv::new("integration_round_trip");
    let basic = env.init_basic_integration();
    let oidc = env.init_oidc_integration();
    let oauth = env.init_oauth_integration();
    let gcp = env.init_gcp_integration();
    let project_id = env.projects[0].id;

    let repo = env.repo();
    assert_eq!(
        repo.basic_integration()
            .read_basic_integration(basic.id)
            .unwrap(),
        basic
    );
    assert_eq!(
        repo.oidc_integration().read_oidc_integration(oidc.id).unwrap(),
        oidc
    );
    assert_eq!(
        repo.oauth_integration()
            .read_oauth_integration(oauth.id)
            .unwrap(),
        oauth
    );
    assert_eq!(
        repo.gcp_integration()
            .list_gcp_integrations_by_project_id(project_id)
            .unwrap(),
        vec![gcp]
    );
    env.cleanup();
}

#[test]
fn missing_record_reports_not_found() {
    let env = TestEnv::new("not_found");

    let err = env.repo().cluster().read_cluster(77).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "cluster",
            id: 77
        }
    ));
    assert!(env
        .repo()
        .user()
        .read_user_by_email("nobody@example.com")
        .unwrap()
        .is_none());
    env.cleanup();
}

#[test]
fn invalid_record_is_rejected_before_sql() {
    let env = TestEnv::new("validation");

    let err = env
        .repo()
        .user()
        .create_user(&User::new("not-an-email", "hello1234"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidEmail { .. })
    ));

    let err = env
        .repo()
        .registry()
        .create_registry(&Registry {
            name: "registry-test".to_string(),
            ..Registry::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingReference {
            entity: "registry",
            field: "project_id"
        })
    ));
    env.cleanup();
}

#[test]
fn cluster_without_matching_integration_is_rejected() {
    let mut env = TestEnv::new("cluster_auth");
    let project = env.init_project();

    let err = env
        .repo()
        .cluster()
        .create_cluster(&Cluster {
            project_id: project.id,
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            auth_mechanism: ClusterAuth::Gcp,
            ..Cluster::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingReference {
            field: "gcp_integration_id",
            ..
        })
    ));
    env.cleanup();
}

#[test]
fn dangling_reference_surfaces_store_error() {
    let env = TestEnv::new("dangling_reference");

    let err = env
        .repo()
        .registry()
        .create_registry(&Registry {
            project_id: 999,
            name: "registry-test".to_string(),
            ..Registry::default()
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
    env.cleanup();
}

#[test]
fn duplicate_email_is_rejected_by_store() {
    let mut env = TestEnv::new("duplicate_email");
    env.init_user();

    let err = env
        .repo()
        .user()
        .create_user(&User::new("example@example.com", "other"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
    env.cleanup();
}

#[test]
fn role_for_other_project_is_rejected() {
    let mut env = TestEnv::new("role_mismatch");
    let user = env.init_user();
    let project = env.init_project();

    let err = env
        .repo()
        .project()
        .create_project_role(
            &project,
            &Role {
                kind: RoleKind::Developer,
                user_id: user.id,
                project_id: project.id + 1,
                ..Role::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    env.cleanup();
}

#[test]
fn projects_are_listed_through_roles() {
    let mut env = TestEnv::new("projects_by_user");
    let user = env.init_user();
    env.init_project();
    env.init_project_role();

    let projects = env
        .repo()
        .project()
        .list_projects_by_user_id(user.id)
        .unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "project-test");
    assert_eq!(
        projects[0].role_for(user.id).map(|role| role.kind),
        Some(RoleKind::Admin)
    );
    env.cleanup();
}

#[test]
fn candidate_resolvers_are_written_with_candidate() {
    let mut env = TestEnv::new("candidate_resolvers");
    let project = env.init_project();

    let candidate = env
        .repo()
        .cluster()
        .create_cluster_candidate(&ClusterCandidate {
            auth_mechanism: ClusterAuth::Local,
            project_id: project.id,
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            context_name: "context-test".to_string(),
            kubeconfig: SAMPLE_KUBECONFIG.to_vec(),
            resolvers: vec![
                ClusterResolver {
                    name: "upload-cluster-ca-data".to_string(),
                    ..ClusterResolver::default()
                },
                ClusterResolver {
                    name: "set-cluster-hostname".to_string(),
                    resolved: true,
                    data: b"{\"hostname\":\"localhost\"}".to_vec(),
                    ..ClusterResolver::default()
                },
            ],
            ..ClusterCandidate::default()
        })
        .unwrap();

    assert!(candidate
        .resolvers
        .iter()
        .all(|resolver| resolver.id > 0 && resolver.cluster_candidate_id == candidate.id));
    assert!(!candidate.is_resolved());

    let stored = env
        .repo()
        .cluster()
        .read_cluster_candidate(candidate.id)
        .unwrap();
    assert_eq!(stored, candidate);
    assert_eq!(stored.resolvers[0].name, "upload-cluster-ca-data");
    env.cleanup();
}

#[test]
fn lists_are_scoped_to_project_and_ordered_by_id() {
    let mut env = TestEnv::new("scoped_lists");
    let first = env.init_helm_repo();
    let second = env.init_helm_repo();
    let infra = env.init_infra();
    let project_id = env.projects[0].id;

    let repo = env.repo();
    let helm_repos = repo
        .helm_repo()
        .list_helm_repos_by_project_id(project_id)
        .unwrap();
    assert_eq!(helm_repos, vec![first, second]);
    assert!(repo
        .helm_repo()
        .list_helm_repos_by_project_id(project_id + 1)
        .unwrap()
        .is_empty());
    assert_eq!(
        repo.infra().list_infras_by_project_id(project_id).unwrap(),
        vec![infra]
    );
    env.cleanup();
}

#[test]
fn invites_and_releases_resolve_by_token() {
    let mut env = TestEnv::new("token_lookups");
    let invite = env.init_invite();
    env.init_cluster();
    let release = env.init_release();

    let repo = env.repo();
    assert_eq!(
        repo.invite().read_invite_by_token("abcd").unwrap(),
        Some(invite)
    );
    assert!(repo.invite().read_invite_by_token("zzzz").unwrap().is_none());

    let by_hook = repo
        .release()
        .read_release_by_webhook_token("abcdefgh")
        .unwrap()
        .unwrap();
    assert_eq!(by_hook, release);
    assert_eq!(by_hook.cluster_id, Some(env.clusters[0].id));
    env.cleanup();
}

#[test]
fn store_opened_with_other_key_cannot_read_secrets() {
    let mut env = TestEnv::new("wrong_key");
    let basic = env.init_basic_integration();
    let path = env.db_path.clone();

    let other = dockyard_core::Store::open(&dockyard_core::DbConf::sqlite_file(
        &path,
        "another_32_byte_encryption_key!!",
    ))
    .unwrap();
    let err = other
        .repository()
        .unwrap()
        .basic_integration()
        .read_basic_integration(basic.id)
        .unwrap_err();
    assert!(matches!(err, RepoError::Crypto(_)));
    other.close().unwrap();
    env.cleanup();
}
