//! Fixture context shared by the integration tests.
//!
//! Each `init_*` builder creates one record with fixed sample values,
//! creates any missing prerequisite first (one level, default values), and
//! records the result on the [`TestEnv`]. Builders panic on any failure.

#![allow(dead_code)]

use dockyard_core::{
    destroy_db, AwsIntegration, AwsIntegrationRepository, BasicIntegration,
    BasicIntegrationRepository, Cluster, ClusterAuth, ClusterCandidate, ClusterRepository,
    DbConf, GcpIntegration, GcpIntegrationRepository, GitRepo, GitRepoRepository, HelmRepo,
    HelmRepoRepository, Infra, InfraKind, InfraRepository, InfraStatus, Invite,
    InviteRepository, KubeIntegration, KubeIntegrationRepository, KubeMechanism, OAuthClient,
    OAuthIntegration, OAuthIntegrationRepository, OAuthTokens, OidcClient, OidcIntegration,
    OidcIntegrationRepository, Project, ProjectRepository, Registry, RegistryRepository,
    Release, ReleaseRepository, Repository, Role, RoleKind, Store, User, UserRepository,
};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

pub const TEST_ENCRYPTION_KEY: &str = "__random_strong_encryption_key__";
pub const SAMPLE_KUBECONFIG: &[u8] = b"current-context: testing\n";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct TestEnv {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub store: Store,
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub kube_integrations: Vec<KubeIntegration>,
    pub basic_integrations: Vec<BasicIntegration>,
    pub oidc_integrations: Vec<OidcIntegration>,
    pub oauth_integrations: Vec<OAuthIntegration>,
    pub gcp_integrations: Vec<GcpIntegration>,
    pub aws_integrations: Vec<AwsIntegration>,
    pub cluster_candidates: Vec<ClusterCandidate>,
    pub clusters: Vec<Cluster>,
    pub git_repos: Vec<GitRepo>,
    pub registries: Vec<Registry>,
    pub helm_repos: Vec<HelmRepo>,
    pub infras: Vec<Infra>,
    pub invites: Vec<Invite>,
    pub releases: Vec<Release>,
}

fn ok<T, E: Display>(what: &str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| panic!("{what} failed: {err}"))
}

pub fn now_epoch_ms() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    i64::try_from(elapsed.as_millis()).unwrap()
}

impl TestEnv {
    /// Opens a fresh file-backed store named `<name>.db` in a temp dir.
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join(format!("{name}.db"));
        let store = ok(
            "store open",
            Store::open(&DbConf::sqlite_file(&db_path, TEST_ENCRYPTION_KEY)),
        );

        Self {
            _dir: dir,
            db_path,
            store,
            users: Vec::new(),
            projects: Vec::new(),
            kube_integrations: Vec::new(),
            basic_integrations: Vec::new(),
            oidc_integrations: Vec::new(),
            oauth_integrations: Vec::new(),
            gcp_integrations: Vec::new(),
            aws_integrations: Vec::new(),
            cluster_candidates: Vec::new(),
            clusters: Vec::new(),
            git_repos: Vec::new(),
            registries: Vec::new(),
            helm_repos: Vec::new(),
            infras: Vec::new(),
            invites: Vec::new(),
            releases: Vec::new(),
        }
    }

    pub fn repo(&self) -> Repository<'_> {
        ok("repository bind", self.store.repository())
    }

    /// Closes the store and deletes its file.
    pub fn cleanup(self) -> PathBuf {
        let db_path = self.db_path;
        ok("store close", self.store.close());
        ok("store destroy", destroy_db(&db_path));
        db_path
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn project_id(&mut self) -> i64 {
        if self.projects.is_empty() {
            self.init_project();
        }
        self.projects[0].id
    }

    fn user_id(&mut self) -> i64 {
        if self.users.is_empty() {
            self.init_user();
        }
        self.users[0].id
    }

    pub fn init_user(&mut self) -> User {
        let user = ok(
            "create user",
            self.repo()
                .user()
                .create_user(&User::new("example@example.com", "hello1234")),
        );
        self.users.push(user.clone());
        user
    }

    pub fn init_multi_user(&mut self) -> Vec<User> {
        let mut created = Vec::new();
        for email in ["example@example.com", "example2@example.com"] {
            let user = ok(
                "create user",
                self.repo()
                    .user()
                    .create_user(&User::new(email, "hello1234")),
            );
            created.push(user);
        }
        self.users.extend(created.iter().cloned());
        created
    }

    pub fn init_project(&mut self) -> Project {
        let project = ok(
            "create project",
            self.repo()
                .project()
                .create_project(&Project::new("project-test")),
        );
        self.projects.push(project.clone());
        project
    }

    /// Binds `users[0]` to `projects[0]` as admin. Both must already exist.
    pub fn init_project_role(&mut self) -> Role {
        let user = self
            .users
            .first()
            .unwrap_or_else(|| panic!("init_project_role needs a user; call init_user first"));
        let project = self.projects.first().unwrap_or_else(|| {
            panic!("init_project_role needs a project; call init_project first")
        });

        let role = Role {
            kind: RoleKind::Admin,
            user_id: user.id,
            project_id: project.id,
            ..Role::default()
        };
        let role = ok(
            "create project role",
            self.repo().project().create_project_role(project, &role),
        );
        self.projects[0].roles.push(role.clone());
        role
    }

    pub fn init_kube_integration(&mut self) -> KubeIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let ki = KubeIntegration {
            mechanism: KubeMechanism::Local,
            project_id,
            user_id,
            kubeconfig: SAMPLE_KUBECONFIG.to_vec(),
            ..KubeIntegration::default()
        };
        let ki = ok(
            "create kube integration",
            self.repo().kube_integration().create_kube_integration(&ki),
        );
        self.kube_integrations.push(ki.clone());
        ki
    }

    pub fn init_basic_integration(&mut self) -> BasicIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let basic = BasicIntegration {
            project_id,
            user_id,
            username: b"username".to_vec(),
            password: b"password".to_vec(),
            ..BasicIntegration::default()
        };
        let basic = ok(
            "create basic integration",
            self.repo()
                .basic_integration()
                .create_basic_integration(&basic),
        );
        self.basic_integrations.push(basic.clone());
        basic
    }

    pub fn init_oidc_integration(&mut self) -> OidcIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let oidc = OidcIntegration {
            client: OidcClient::Kube,
            project_id,
            user_id,
            issuer_url: b"https://oidc.example.com".to_vec(),
            client_id: b"exampleclientid".to_vec(),
            client_secret: b"exampleclientsecret".to_vec(),
            id_token: b"idtoken".to_vec(),
            refresh_token: b"refreshtoken".to_vec(),
            ..OidcIntegration::default()
        };
        let oidc = ok(
            "create oidc integration",
            self.repo().oidc_integration().create_oidc_integration(&oidc),
        );
        self.oidc_integrations.push(oidc.clone());
        oidc
    }

    pub fn init_oauth_integration(&mut self) -> OAuthIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let oauth = OAuthIntegration {
            client: OAuthClient::Github,
            project_id,
            user_id,
            tokens: OAuthTokens {
                client_id: b"exampleclientid".to_vec(),
                access_token: b"idtoken".to_vec(),
                refresh_token: b"refreshtoken".to_vec(),
                expiry: None,
            },
            ..OAuthIntegration::default()
        };
        let oauth = ok(
            "create oauth integration",
            self.repo()
                .oauth_integration()
                .create_oauth_integration(&oauth),
        );
        self.oauth_integrations.push(oauth.clone());
        oauth
    }

    pub fn init_gcp_integration(&mut self) -> GcpIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let gcp = GcpIntegration {
            project_id,
            user_id,
            gcp_project_id: "test-proj-123456".to_string(),
            gcp_user_email: "test@test.it".to_string(),
            gcp_key_data: br#"{"test":"key"}"#.to_vec(),
            ..GcpIntegration::default()
        };
        let gcp = ok(
            "create gcp integration",
            self.repo().gcp_integration().create_gcp_integration(&gcp),
        );
        self.gcp_integrations.push(gcp.clone());
        gcp
    }

    pub fn init_aws_integration(&mut self) -> AwsIntegration {
        let project_id = self.project_id();
        let user_id = self.user_id();
        let aws = AwsIntegration {
            project_id,
            user_id,
            aws_cluster_id: b"example-cluster-0".to_vec(),
            aws_access_key_id: b"accesskey".to_vec(),
            aws_secret_access_key: b"secret".to_vec(),
            aws_session_token: b"optional".to_vec(),
            ..AwsIntegration::default()
        };
        let aws = ok(
            "create aws integration",
            self.repo().aws_integration().create_aws_integration(&aws),
        );
        self.aws_integrations.push(aws.clone());
        aws
    }

    pub fn init_cluster_candidate(&mut self) -> ClusterCandidate {
        let project_id = self.project_id();
        let cc = ClusterCandidate {
            auth_mechanism: ClusterAuth::Aws,
            project_id,
            created_cluster_id: 0,
            resolvers: Vec::new(),
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            context_name: "context-test".to_string(),
            aws_cluster_id_guess: b"example-cluster-0".to_vec(),
            kubeconfig: SAMPLE_KUBECONFIG.to_vec(),
            ..ClusterCandidate::default()
        };
        let cc = ok(
            "create cluster candidate",
            self.repo().cluster().create_cluster_candidate(&cc),
        );
        self.cluster_candidates.push(cc.clone());
        cc
    }

    pub fn init_cluster(&mut self) -> Cluster {
        let project_id = self.project_id();
        if self.kube_integrations.is_empty() {
            self.init_kube_integration();
        }
        let cluster = Cluster {
            project_id,
            name: "cluster-test".to_string(),
            server: "https://localhost".to_string(),
            auth_mechanism: ClusterAuth::Local,
            kube_integration_id: Some(self.kube_integrations[0].id),
            certificate_authority_data: b"-----BEGIN".to_vec(),
            ..Cluster::default()
        };
        let cluster = ok(
            "create cluster",
            self.repo().cluster().create_cluster(&cluster),
        );
        self.clusters.push(cluster.clone());
        cluster
    }

    pub fn init_git_repo(&mut self) -> GitRepo {
        let project_id = self.project_id();
        if self.oauth_integrations.is_empty() {
            self.init_oauth_integration();
        }
        let gr = GitRepo {
            project_id,
            repo_entity: "porter-dev".to_string(),
            oauth_integration_id: self.oauth_integrations[0].id,
            ..GitRepo::default()
        };
        let gr = ok("create git repo", self.repo().git_repo().create_git_repo(&gr));
        self.git_repos.push(gr.clone());
        gr
    }

    pub fn init_registry(&mut self) -> Registry {
        let project_id = self.project_id();
        let reg = Registry {
            project_id,
            name: "registry-test".to_string(),
            ..Registry::default()
        };
        let reg = ok(
            "create registry",
            self.repo().registry().create_registry(&reg),
        );
        self.registries.push(reg.clone());
        reg
    }

    pub fn init_helm_repo(&mut self) -> HelmRepo {
        let project_id = self.project_id();
        let hr = HelmRepo {
            project_id,
            name: "helm-repo-test".to_string(),
            repo_url: "https://example-repo.com".to_string(),
            ..HelmRepo::default()
        };
        let hr = ok(
            "create helm repo",
            self.repo().helm_repo().create_helm_repo(&hr),
        );
        self.helm_repos.push(hr.clone());
        hr
    }

    pub fn init_infra(&mut self) -> Infra {
        let project_id = self.project_id();
        let infra = Infra {
            kind: InfraKind::Ecr,
            project_id,
            status: InfraStatus::Created,
            ..Infra::default()
        };
        let infra = ok("create infra", self.repo().infra().create_infra(&infra));
        self.infras.push(infra.clone());
        infra
    }

    pub fn init_invite(&mut self) -> Invite {
        let project_id = self.project_id();
        let invite = Invite {
            token: "abcd".to_string(),
            expiry: Some(now_epoch_ms() + DAY_MS),
            email: "testing@test.it".to_string(),
            project_id,
            ..Invite::default()
        };
        let invite = ok("create invite", self.repo().invite().create_invite(&invite));
        self.invites.push(invite.clone());
        invite
    }

    /// Attaches the release to the first tracked cluster, if any.
    pub fn init_release(&mut self) -> Release {
        let project_id = self.project_id();
        let release = Release {
            name: "denver-meister-dakota".to_string(),
            namespace: "default".to_string(),
            project_id,
            cluster_id: self.clusters.first().map(|cluster| cluster.id),
            webhook_token: "abcdefgh".to_string(),
            ..Release::default()
        };
        let release = ok(
            "create release",
            self.repo().release().create_release(&release),
        );
        self.releases.push(release.clone());
        release
    }
}
