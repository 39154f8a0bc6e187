//! Cluster and cluster-candidate repository.
//!
//! # Responsibility
//! - Persist registered clusters and the candidates parsed from kubeconfigs.
//! - Keep candidates and their resolvers consistent.
//!
//! # Invariants
//! - A candidate and all its resolvers are written in one transaction.
//! - Candidate reads return resolvers in insertion order.

use super::{
    bool_column, bool_to_int, collect_rows, first_row, found, parse_column, sealed_column,
    RepoResult,
};
use crate::crypto::FieldCipher;
use crate::model::cluster::{Cluster, ClusterAuth, ClusterCandidate, ClusterResolver};
use crate::model::RecordId;
use log::debug;
use rusqlite::{params, Connection, Row};

const CLUSTER_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    server,
    auth_mechanism,
    insecure_skip_tls_verify,
    certificate_authority_data,
    kube_integration_id,
    oidc_integration_id,
    gcp_integration_id,
    aws_integration_id
FROM clusters";

const CANDIDATE_SELECT_SQL: &str = "SELECT
    id,
    auth_mechanism,
    project_id,
    created_cluster_id,
    name,
    server,
    context_name,
    aws_cluster_id_guess,
    kubeconfig
FROM cluster_candidates";

pub trait ClusterRepository {
    fn create_cluster(&self, cluster: &Cluster) -> RepoResult<Cluster>;
    fn read_cluster(&self, id: RecordId) -> RepoResult<Cluster>;
    fn list_clusters_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Cluster>>;
    /// Stores a candidate together with its resolvers.
    fn create_cluster_candidate(&self, cc: &ClusterCandidate) -> RepoResult<ClusterCandidate>;
    fn read_cluster_candidate(&self, id: RecordId) -> RepoResult<ClusterCandidate>;
    fn list_cluster_candidates_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<ClusterCandidate>>;
}

pub struct SqliteClusterRepository<'conn> {
    conn: &'conn Connection,
    cipher: &'conn FieldCipher,
}

impl<'conn> SqliteClusterRepository<'conn> {
    pub fn new(conn: &'conn Connection, cipher: &'conn FieldCipher) -> Self {
        Self { conn, cipher }
    }

    fn parse_cluster_row(&self, row: &Row<'_>) -> RepoResult<Cluster> {
        Ok(Cluster {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            name: row.get("name")?,
            server: row.get("server")?,
            auth_mechanism: parse_column(row, "clusters", "auth_mechanism", parse_cluster_auth)?,
            insecure_skip_tls_verify: bool_column(row, "clusters", "insecure_skip_tls_verify")?,
            certificate_authority_data: sealed_column(
                self.cipher,
                row,
                "certificate_authority_data",
            )?,
            kube_integration_id: row.get("kube_integration_id")?,
            oidc_integration_id: row.get("oidc_integration_id")?,
            gcp_integration_id: row.get("gcp_integration_id")?,
            aws_integration_id: row.get("aws_integration_id")?,
        })
    }

    fn parse_candidate_row(&self, row: &Row<'_>) -> RepoResult<ClusterCandidate> {
        Ok(ClusterCandidate {
            id: row.get("id")?,
            auth_mechanism: parse_column(
                row,
                "cluster_candidates",
                "auth_mechanism",
                parse_cluster_auth,
            )?,
            project_id: row.get("project_id")?,
            created_cluster_id: row.get("created_cluster_id")?,
            resolvers: Vec::new(),
            name: row.get("name")?,
            server: row.get("server")?,
            context_name: row.get("context_name")?,
            aws_cluster_id_guess: sealed_column(self.cipher, row, "aws_cluster_id_guess")?,
            kubeconfig: sealed_column(self.cipher, row, "kubeconfig")?,
        })
    }

    fn resolvers_for(&self, candidate_id: RecordId) -> RepoResult<Vec<ClusterResolver>> {
        collect_rows(
            self.conn,
            "SELECT id, cluster_candidate_id, name, resolved, data
             FROM cluster_resolvers
             WHERE cluster_candidate_id = ?1
             ORDER BY id ASC;",
            [candidate_id],
            |row| {
                Ok(ClusterResolver {
                    id: row.get("id")?,
                    cluster_candidate_id: row.get("cluster_candidate_id")?,
                    name: row.get("name")?,
                    resolved: bool_column(row, "cluster_resolvers", "resolved")?,
                    data: row.get("data")?,
                })
            },
        )
    }
}

impl ClusterRepository for SqliteClusterRepository<'_> {
    fn create_cluster(&self, cluster: &Cluster) -> RepoResult<Cluster> {
        cluster.validate()?;

        self.conn.execute(
            "INSERT INTO clusters (
                project_id,
                name,
                server,
                auth_mechanism,
                insecure_skip_tls_verify,
                certificate_authority_data,
                kube_integration_id,
                oidc_integration_id,
                gcp_integration_id,
                aws_integration_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                cluster.project_id,
                cluster.name.as_str(),
                cluster.server.as_str(),
                cluster_auth_to_db(cluster.auth_mechanism),
                bool_to_int(cluster.insecure_skip_tls_verify),
                self.cipher.encrypt(&cluster.certificate_authority_data)?,
                cluster.kube_integration_id,
                cluster.oidc_integration_id,
                cluster.gcp_integration_id,
                cluster.aws_integration_id,
            ],
        )?;

        let created = Cluster {
            id: self.conn.last_insert_rowid(),
            ..cluster.clone()
        };
        debug!(
            "event=repo_create module=repo status=ok entity=cluster id={} project_id={}",
            created.id, created.project_id
        );
        Ok(created)
    }

    fn read_cluster(&self, id: RecordId) -> RepoResult<Cluster> {
        let cluster = first_row(
            self.conn,
            &format!("{CLUSTER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_cluster_row(row),
        )?;
        found("cluster", id, cluster)
    }

    fn list_clusters_by_project_id(&self, project_id: RecordId) -> RepoResult<Vec<Cluster>> {
        collect_rows(
            self.conn,
            &format!("{CLUSTER_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_cluster_row(row),
        )
    }

    fn create_cluster_candidate(&self, cc: &ClusterCandidate) -> RepoResult<ClusterCandidate> {
        cc.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO cluster_candidates (
                auth_mechanism,
                project_id,
                created_cluster_id,
                name,
                server,
                context_name,
                aws_cluster_id_guess,
                kubeconfig
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                cluster_auth_to_db(cc.auth_mechanism),
                cc.project_id,
                cc.created_cluster_id,
                cc.name.as_str(),
                cc.server.as_str(),
                cc.context_name.as_str(),
                self.cipher.encrypt(&cc.aws_cluster_id_guess)?,
                self.cipher.encrypt(&cc.kubeconfig)?,
            ],
        )?;
        let candidate_id = tx.last_insert_rowid();

        let mut resolvers = Vec::with_capacity(cc.resolvers.len());
        for resolver in &cc.resolvers {
            tx.execute(
                "INSERT INTO cluster_resolvers (cluster_candidate_id, name, resolved, data)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    candidate_id,
                    resolver.name.as_str(),
                    bool_to_int(resolver.resolved),
                    resolver.data.as_slice(),
                ],
            )?;
            resolvers.push(ClusterResolver {
                id: tx.last_insert_rowid(),
                cluster_candidate_id: candidate_id,
                ..resolver.clone()
            });
        }
        tx.commit()?;

        debug!(
            "event=repo_create module=repo status=ok entity=cluster_candidate id={} project_id={} resolvers={}",
            candidate_id,
            cc.project_id,
            resolvers.len()
        );
        Ok(ClusterCandidate {
            id: candidate_id,
            resolvers,
            ..cc.clone()
        })
    }

    fn read_cluster_candidate(&self, id: RecordId) -> RepoResult<ClusterCandidate> {
        let candidate = first_row(
            self.conn,
            &format!("{CANDIDATE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| self.parse_candidate_row(row),
        )?;
        let mut candidate = found("cluster_candidate", id, candidate)?;
        candidate.resolvers = self.resolvers_for(candidate.id)?;
        Ok(candidate)
    }

    fn list_cluster_candidates_by_project_id(
        &self,
        project_id: RecordId,
    ) -> RepoResult<Vec<ClusterCandidate>> {
        let mut candidates = collect_rows(
            self.conn,
            &format!("{CANDIDATE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            [project_id],
            |row| self.parse_candidate_row(row),
        )?;
        for candidate in &mut candidates {
            candidate.resolvers = self.resolvers_for(candidate.id)?;
        }
        Ok(candidates)
    }
}

fn cluster_auth_to_db(auth: ClusterAuth) -> &'static str {
    match auth {
        ClusterAuth::Local => "local",
        ClusterAuth::X509 => "x509",
        ClusterAuth::Basic => "basic",
        ClusterAuth::Bearer => "bearer",
        ClusterAuth::Oidc => "oidc",
        ClusterAuth::Gcp => "gcp",
        ClusterAuth::Aws => "aws",
    }
}

fn parse_cluster_auth(value: &str) -> Option<ClusterAuth> {
    match value {
        "local" => Some(ClusterAuth::Local),
        "x509" => Some(ClusterAuth::X509),
        "basic" => Some(ClusterAuth::Basic),
        "bearer" => Some(ClusterAuth::Bearer),
        "oidc" => Some(ClusterAuth::Oidc),
        "gcp" => Some(ClusterAuth::Gcp),
        "aws" => Some(ClusterAuth::Aws),
        _ => None,
    }
}
