//! SurrealDB graph backend.

use async_trait::async_trait;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info};

use super::error::BackendError;
use super::models::{Label, Relation};
use super::pattern::PatternQuery;
use super::record::{Params, Record};
use super::{GraphBackend, GraphStats};
use crate::config::BackendConfig;

/// Graph backend over a SurrealDB connection.
///
/// The connection string selects the engine: `rocksdb://path` for an
/// embedded on-disk store, `mem://` for an in-memory one, `ws://host:port`
/// for a remote server. The client is internally synchronized and shared by
/// all sessions.
pub struct SurrealBackend {
    db: Surreal<Any>,
    endpoint: String,
}

impl SurrealBackend {
    /// Connect, authenticate if credentials are configured, and select the
    /// namespace and database.
    pub async fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        info!(endpoint = %config.endpoint, "Connecting to SurrealDB");

        let db = any::connect(config.endpoint.as_str())
            .await
            .map_err(|e| BackendError::Unavailable(format!("Failed to connect: {e}")))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| BackendError::Unavailable(format!("Authentication failed: {e}")))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| {
                BackendError::Unavailable(format!("Failed to select namespace/database: {e}"))
            })?;

        Ok(Self {
            db,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The underlying client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    async fn count_table(&self, table: &str) -> Result<usize, BackendError> {
        // SurrealDB returns count as { count: N }
        #[derive(serde::Deserialize)]
        struct CountResult {
            count: i64,
        }

        let result: Option<CountResult> = self
            .db
            .query(format!("SELECT count() FROM {table} GROUP ALL"))
            .await?
            .take(0)?;

        Ok(result.map(|r| r.count.max(0) as usize).unwrap_or(0))
    }
}

#[async_trait]
impl GraphBackend for SurrealBackend {
    fn name(&self) -> &str {
        "surrealdb"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        debug!(kind = %query.kind(), endpoint = %self.endpoint, "Executing pattern");

        let mut request = self.db.query(query.text());
        for (name, value) in params.iter() {
            request = request.bind((name.clone(), value.clone()));
        }

        let rows: Vec<serde_json::Value> = request.await?.take(0)?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let value: Option<i64> = self.db.query("RETURN 1").await?.take(0)?;
        match value {
            Some(1) => Ok(()),
            other => Err(BackendError::Unavailable(format!(
                "Unexpected ping response: {other:?}"
            ))),
        }
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        let mut stats = GraphStats::default();
        for label in Label::ALL {
            let count = self.count_table(label.table()).await?;
            stats.nodes.insert(label.to_string(), count);
        }
        for relation in Relation::ALL {
            let count = self.count_table(relation.table()).await?;
            stats.relationships.insert(relation.to_string(), count);
        }
        Ok(stats)
    }
}
