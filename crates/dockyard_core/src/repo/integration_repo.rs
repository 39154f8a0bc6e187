//! Credential integration repositories and SQLite implementations.
//!
//! # Responsibility
//! - Persist kube, basic, OIDC, OAuth, GCP and AWS credentials.
//! - Seal every credential byte column with the store cipher.
//!
//! # Invariants
//! - Returned records always carry plaintext credential bytes.
//! - Raw table rows never contain plaintext for non-empty credentials.

use super::{collect_rows, first_row, found, parse_column, sealed_column, RepoResult};
use crate::crypto::FieldCipher;
use crate::model::integrations::{
    AwsIntegration, BasicIntegration, GcpIntegration, KubeIntegration, KubeMechanism,
    OAuthClient, OAuthIntegration, OAuthTokens, OidcClient, OidcIntegration,
};
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

fn log_created(entity: &str, id: RecordId, project_id: RecordId) {
    debug!(
        "event=repo_create module=repo status=ok entity={} id={} project_id={}",
        entity, id, project_id
    );
}

const KUBE_SELECT_SQL: &str = "SELECT
    id,
    mechanism,
    project_id,
    user_id,
    client_certificate_data,
    client_key_data,
    token,
    username,
    password,
    kubeconfig
FROM kube_integrations";

pub trait KubeIntegrationRepository {
    fn create_kube_integration(&self, ki: &KubeIntegration) -> RepoResult<KubeIntegration>;
    fn read_kube_integration(&self, id: RecordId) -> RepoResult<KubeIntegration>;
    fn list_kube_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<KubeIntegration>>;
}

pub struct SqliteKubeIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteKubeIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<KubeIntegration> {
        Ok(KubeIntegration {
            id: row.get("id")?,
            mechanism: parse_column(row, "kube_integrations", "mechanism", parse_kube_mechanism)?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            client_certificate_data: sealed_column(self.cipher, row, "client_certificate_data")?,
            client_key_data: sealed_column(self.cipher, row, "client_key_data")?,
            token: sealed_column(self.cipher, row, "token")?,
            username: sealed_column(self.cipher, row, "username")?,
            password: sealed_column(self.cipher, row, "password")?,
            kubeconfig: sealed_column(self.cipher, row, "kubeconfig")?,
        })
    }
}

impl KubeIntegrationRepository for SqliteKubeIntegrationRepository<'_> {
    fn create_kube_integration(&self, ki: &KubeIntegration) -> RepoResult<KubeIntegration> {
        ki.validate()?;

        self.conn.execute(
            "INSERT INTO kube_integrations (
                mechanism,
                project_id,
                user_id,
                client_certificate_data,
                client_key_data,
                token,
                username,
                password,
                kubeconfig
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                kube_mechanism_to_db(ki.mechanism),
                ki.project_id,
                ki.user_id,
                self.cipher.encrypt(&ki.client_certificate_data)?,
                self.cipher.encrypt(&ki.client_key_data)?,
                self.cipher.encrypt(&ki.token)?,
                self.cipher.encrypt(&ki.username)?,
                self.cipher.encrypt(&ki.password)?,
                self.cipher.encrypt(&ki.kubeconfig)?,
            ],
        )?;

        let created = KubeIntegration {
            id: self.conn.last_insert_rowid(),
            ..ki.clone()
        };
        log_created("kube_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_kube_integration(&self, id: RecordId) -> RepoResult<KubeIntegration> {
        let ki = first_row(
            self.conn,
            &format!("{KUBE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("kube_integration", id, ki)
    }

    fn list_kube_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<KubeIntegration>> {
        collect_rows(
            self.conn,
            &format!("{KUBE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}

fn kube_mechanism_to_db(mechanism: KubeMechanism) -> &'static str {
    match mechanism {
        KubeMechanism::X509 => "x509",
        KubeMechanism::Basic => "basic",
        KubeMechanism::Bearer => "bearer",
        KubeMechanism::Local => "local",
    }
}

fn parse_kube_mechanism(value: &str) -> Option<KubeMechanism> {
    match value {
        "x509" => Some(KubeMechanism::X509),
        "basic" => Some(KubeMechanism::Basic),
        "bearer" => Some(KubeMechanism::Bearer),
        "local" => Some(KubeMechanism::Local),
        _ => None,
    }
}

const BASIC_SELECT_SQL: &str =
    "SELECT id, project_id, user_id, username, password FROM basic_integrations";

pub trait BasicIntegrationRepository {
    fn create_basic_integration(&self, basic: &BasicIntegration) -> RepoResult<BasicIntegration>;
    fn read_basic_integration(&self, id: RecordId) -> RepoResult<BasicIntegration>;
    fn list_basic_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<BasicIntegration>>;
}

pub struct SqliteBasicIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteBasicIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<BasicIntegration> {
        Ok(BasicIntegration {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            username: sealed_column(self.cipher, row, "username")?,
            password: sealed_column(self.cipher, row, "password")?,
        })
    }
}

impl BasicIntegrationRepository for SqliteBasicIntegrationRepository<'_> {
    fn create_basic_integration(&self, basic: &BasicIntegration) -> RepoResult<BasicIntegration> {
        basic.validate()?;

        self.conn.execute(
            "INSERT INTO basic_integrations (project_id, user_id, username, password)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                basic.project_id,
                basic.user_id,
                self.cipher.encrypt(&basic.username)?,
                self.cipher.encrypt(&basic.password)?,
            ],
        )?;

        let created = BasicIntegration {
            id: self.conn.last_insert_rowid(),
            ..basic.clone()
        };
        log_created("basic_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_basic_integration(&self, id: RecordId) -> RepoResult<BasicIntegration> {
        let basic = first_row(
            self.conn,
            &format!("{BASIC_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("basic_integration", id, basic)
    }

    fn list_basic_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<BasicIntegration>> {
        collect_rows(
            self.conn,
            &format!("{BASIC_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}

const OIDC_SELECT_SQL: &str = "SELECT
    id,
    client,
    project_id,
    user_id,
    issuer_url,
    client_id,
    client_secret,
    certificate_authority_data,
    id_token,
    refresh_token
FROM oidc_integrations";

pub trait OidcIntegrationRepository {
    fn create_oidc_integration(&self, oidc: &OidcIntegration) -> RepoResult<OidcIntegration>;
    fn read_oidc_integration(&self, id: RecordId) -> RepoResult<OidcIntegration>;
    fn list_oidc_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<OidcIntegration>>;
}

pub struct SqliteOidcIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteOidcIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<OidcIntegration> {
        Ok(OidcIntegration {
            id: row.get("id")?,
            client: parse_column(row, "oidc_integrations", "client", parse_oidc_client)?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            issuer_url: sealed_column(self.cipher, row, "issuer_url")?,
            client_id: sealed_column(self.cipher, row, "client_id")?,
            client_secret: sealed_column(self.cipher, row, "client_secret")?,
            certificate_authority_data: sealed_column(
                self.cipher,
                row,
                "certificate_authority_data",
            )?,
            id_token: sealed_column(self.cipher, row, "id_token")?,
            refresh_token: sealed_column(self.cipher, row, "refresh_token")?,
        })
    }
}

impl OidcIntegrationRepository for SqliteOidcIntegrationRepository<'_> {
    fn create_oidc_integration(&self, oidc: &OidcIntegration) -> RepoResult<OidcIntegration> {
        oidc.validate()?;

        self.conn.execute(
            "INSERT INTO oidc_integrations (
                client,
                project_id,
                user_id,
                issuer_url,
                client_id,
                client_secret,
                certificate_authority_data,
                id_token,
                refresh_token
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                oidc_client_to_db(oidc.client),
                oidc.project_id,
                oidc.user_id,
                self.cipher.encrypt(&oidc.issuer_url)?,
                self.cipher.encrypt(&oidc.client_id)?,
                self.cipher.encrypt(&oidc.client_secret)?,
                self.cipher.encrypt(&oidc.certificate_authority_data)?,
                self.cipher.encrypt(&oidc.id_token)?,
                self.cipher.encrypt(&oidc.refresh_token)?,
            ],
        )?;

        let created = OidcIntegration {
            id: self.conn.last_insert_rowid(),
            ..oidc.clone()
        };
        log_created("oidc_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_oidc_integration(&self, id: RecordId) -> RepoResult<OidcIntegration> {
        let oidc = first_row(
            self.conn,
            &format!("{OIDC_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("oidc_integration", id, oidc)
    }

    fn list_oidc_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<OidcIntegration>> {
        collect_rows(
            self.conn,
            &format!("{OIDC_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}

fn oidc_client_to_db(client: OidcClient) -> &'static str {
    match client {
        OidcClient::Kube => "kube",
    }
}

fn parse_oidc_client(value: &str) -> Option<OidcClient> {
    match value {
        "kube" => Some(OidcClient::Kube),
        _ => None,
    }
}

const OAUTH_SELECT_SQL: &str = "SELECT
    id,
    client,
    project_id,
    user_id,
    client_id,
    access_token,
    refresh_token,
    expiry
FROM oauth_integrations";

pub trait OAuthIntegrationRepository {
    fn create_oauth_integration(&self, oauth: &OAuthIntegration) -> RepoResult<OAuthIntegration>;
    fn read_oauth_integration(&self, id: RecordId) -> RepoResult<OAuthIntegration>;
    fn list_oauth_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<OAuthIntegration>>;
}

pub struct SqliteOAuthIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteOAuthIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<OAuthIntegration> {
        Ok(OAuthIntegration {
            id: row.get("id")?,
            client: parse_column(row, "oauth_integrations", "client", parse_oauth_client)?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            tokens: OAuthTokens {
                client_id: sealed_column(self.cipher, row, "client_id")?,
                access_token: sealed_column(self.cipher, row, "access_token")?,
                refresh_token: sealed_column(self.cipher, row, "refresh_token")?,
                expiry: row.get("expiry")?,
            },
        })
    }
}

impl OAuthIntegrationRepository for SqliteOAuthIntegrationRepository<'_> {
    fn create_oauth_integration(&self, oauth: &OAuthIntegration) -> RepoResult<OAuthIntegration> {
        oauth.validate()?;

        self.conn.execute(
            "INSERT INTO oauth_integrations (
                client,
                project_id,
                user_id,
                client_id,
                access_token,
                refresh_token,
                expiry
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                oauth_client_to_db(oauth.client),
                oauth.project_id,
                oauth.user_id,
                self.cipher.encrypt(&oauth.tokens.client_id)?,
                self.cipher.encrypt(&oauth.tokens.access_token)?,
                self.cipher.encrypt(&oauth.tokens.refresh_token)?,
                oauth.tokens.expiry,
            ],
        )?;

        let created = OAuthIntegration {
            id: self.conn.last_insert_rowid(),
            ..oauth.clone()
        };
        log_created("oauth_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_oauth_integration(&self, id: RecordId) -> RepoResult<OAuthIntegration> {
        let oauth = first_row(
            self.conn,
            &format!("{OAUTH_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("oauth_integration", id, oauth)
    }

    fn list_oauth_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<OAuthIntegration>> {
        collect_rows(
            self.conn,
            &format!("{OAUTH_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}

fn oauth_client_to_db(client: OAuthClient) -> &'static str {
    match client {
        OAuthClient::Github => "github",
        OAuthClient::DigitalOcean => "digitalocean",
        OAuthClient::Google => "google",
    }
}

fn parse_oauth_client(value: &str) -> Option<OAuthClient> {
    match value {
        "github" => Some(OAuthClient::Github),
        "digitalocean" => Some(OAuthClient::DigitalOcean),
        "google" => Some(OAuthClient::Google),
        _ => None,
    }
}

const GCP_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    user_id,
    gcp_project_id,
    gcp_sa_email,
    gcp_user_email,
    gcp_region,
    gcp_key_data
FROM gcp_integrations";

pub trait GcpIntegrationRepository {
    fn create_gcp_integration(&self, gcp: &GcpIntegration) -> RepoResult<GcpIntegration>;
    fn read_gcp_integration(&self, id: RecordId) -> RepoResult<GcpIntegration>;
    fn list_gcp_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<GcpIntegration>>;
}

pub struct SqliteGcpIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteGcpIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<GcpIntegration> {
        Ok(GcpIntegration {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            gcp_project_id: row.get("gcp_project_id")?,
            gcp_sa_email: row.get("gcp_sa_email")?,
            gcp_user_email: row.get("gcp_user_email")?,
            gcp_region: row.get("gcp_region")?,
            gcp_key_data: sealed_column(self.cipher, row, "gcp_key_data")?,
        })
    }
}

impl GcpIntegrationRepository for SqliteGcpIntegrationRepository<'_> {
    fn create_gcp_integration(&self, gcp: &GcpIntegration) -> RepoResult<GcpIntegration> {
        gcp.validate()?;

        self.conn.execute(
            "INSERT INTO gcp_integrations (
                project_id,
                user_id,
                gcp_project_id,
                gcp_sa_email,
                gcp_user_email,
                gcp_region,
                gcp_key_data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                gcp.project_id,
                gcp.user_id,
                gcp.gcp_project_id.as_str(),
                gcp.gcp_sa_email.as_str(),
                gcp.gcp_user_email.as_str(),
                gcp.gcp_region.as_str(),
                self.cipher.encrypt(&gcp.gcp_key_data)?,
            ],
        )?;

        let created = GcpIntegration {
            id: self.conn.last_insert_rowid(),
            ..gcp.clone()
        };
        log_created("gcp_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_gcp_integration(&self, id: RecordId) -> RepoResult<GcpIntegration> {
        let gcp = first_row(
            self.conn,
            &format!("{GCP_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("gcp_integration", id, gcp)
    }

    fn list_gcp_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<GcpIntegration>> {
        collect_rows(
            self.conn,
            &format!("{GCP_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}

const AWS_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    user_id,
    aws_arn,
    aws_region,
    aws_cluster_id,
    aws_access_key_id,
    aws_secret_access_key,
    aws_session_token
FROM aws_integrations";

pub trait AwsIntegrationRepository {
    fn create_aws_integration(&self, aws: &AwsIntegration) -> RepoResult<AwsIntegration>;
    fn read_aws_integration(&self, id: RecordId) -> RepoResult<AwsIntegration>;
    fn list_aws_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<AwsIntegration>>;
}

pub struct SqliteAwsIntegrationRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteAwsIntegrationRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<AwsIntegration> {
        Ok(AwsIntegration {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            aws_arn: row.get("aws_arn")?,
            aws_region: row.get("aws_region")?,
            aws_cluster_id: sealed_column(self.cipher, row, "aws_cluster_id")?,
            aws_access_key_id: sealed_column(self.cipher, row, "aws_access_key_id")?,
            aws_secret_access_key: sealed_column(self.cipher, row, "aws_secret_access_key")?,
            aws_session_token: sealed_column(self.cipher, row, "aws_session_token")?,
        })
    }
}

impl AwsIntegrationRepository for SqliteAwsIntegrationRepository<'_> {
    fn create_aws_integration(&self, aws: &AwsIntegration) -> RepoResult<AwsIntegration> {
        aws.validate()?;

        self.conn.execute(
            "INSERT INTO aws_integrations (
                project_id,
                user_id,
                aws_arn,
                aws_region,
                aws_cluster_id,
                aws_access_key_id,
                aws_secret_access_key,
                aws_session_token
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                aws.project_id,
                aws.user_id,
                aws.aws_arn.as_str(),
                aws.aws_region.as_str(),
                self.cipher.encrypt(&aws.aws_cluster_id)?,
                self.cipher.encrypt(&aws.aws_access_key_id)?,
                self.cipher.encrypt(&aws.aws_secret_access_key)?,
                self.cipher.encrypt(&aws.aws_session_token)?,
            ],
        )?;

        let created = AwsIntegration {
            id: self.conn.last_insert_rowid(),
            ..aws.clone()
        };
        log_created("aws_integration", created.id, created.project_id);
        Ok(created)
    }

    fn read_aws_integration(&self, id: RecordId) -> RepoResult<AwsIntegration> {
        let aws = first_row(
            self.conn,
            &format!("{AWS_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_row(row),
        )?;
        found("aws_integration", id, aws)
    }

    fn list_aws_integrations_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<AwsIntegration>> {
        collect_rows(
            self.conn,
            &format!("{AWS_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_row(row),
        )
    }
}
