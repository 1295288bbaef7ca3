//! The relay pipeline: authenticate, query, normalize, and divert to the
//! fallback resolver when the live path fails.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::auth::acquire_token;
use crate::config::RelayConfig;
use crate::domain::QueryResult;
use crate::error::RelayError;
use crate::fallback::resolve_fallback;
use crate::http_client::HttpClient;
use crate::normalize::normalize;
use crate::upstream::{fetch, QueryKind};

/// One relay pipeline over a shared transport. Cheap to clone; holds no
/// per-request state, so concurrent requests need no coordination.
#[derive(Clone)]
pub struct RelayService {
    http: Arc<dyn HttpClient>,
    config: RelayConfig,
}

impl RelayService {
    pub fn new(http: Arc<dyn HttpClient>, config: RelayConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run one query through the pipeline.
    ///
    /// A failure anywhere on the live path diverts to the fallback
    /// resolver as a normal branch; only fallback exhaustion surfaces to
    /// the caller.
    pub async fn query(&self, kind: QueryKind) -> Result<QueryResult, RelayError> {
        match self.live_query(&kind).await {
            Ok(raw) => Ok(normalize(raw)),
            Err(error) => {
                warn!(%error, "live query failed, diverting to fallback");
                resolve_fallback(&self.config, &kind).map_err(RelayError::from)
            }
        }
    }

    pub async fn activities(&self) -> Result<QueryResult, RelayError> {
        self.query(QueryKind::Activities).await
    }

    pub async fn client_lookup(&self, account: impl Into<String>) -> Result<QueryResult, RelayError> {
        self.query(QueryKind::Client {
            account: account.into(),
        })
        .await
    }

    async fn live_query(&self, kind: &QueryKind) -> Result<Value, RelayError> {
        let token = acquire_token(self.http.as_ref(), &self.config).await?;
        let raw = fetch(self.http.as_ref(), &self.config, &token, kind).await?;
        Ok(raw)
    }
}
