//! Upstream query client: the authenticated GET against the gateway.

use serde_json::Value;

use crate::auth::Token;
use crate::config::RelayConfig;
use crate::error::{body_excerpt, UpstreamError};
use crate::http_client::{HttpClient, HttpRequest};

/// The field the gateway filters on. 31 selects the economic-activity
/// catalog; client lookups relate an account number to it.
const FIELD_ID: &str = "31";

/// What to ask the gateway for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// The full economic-activity catalog, with the fixed parameter set.
    Activities,
    /// A single client record, looked up by account number.
    Client { account: String },
}

impl QueryKind {
    /// The caller-supplied identifier, empty for catalog queries. Demo
    /// branch selection keys off this.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Activities => "",
            Self::Client { account } => account,
        }
    }

    fn query_string(&self) -> String {
        let related = match self {
            Self::Activities => String::new(),
            Self::Client { account } => urlencoding::encode(account).into_owned(),
        };
        format!("fieldId={FIELD_ID}&valueRelated={related}&fieldRelationship=")
    }
}

/// Issue the authenticated query and parse the raw body.
///
/// The body is returned unnormalized; shape reconciliation is the
/// normalizer's job.
pub async fn fetch(
    http: &dyn HttpClient,
    config: &RelayConfig,
    token: &Token,
    kind: &QueryKind,
) -> Result<Value, UpstreamError> {
    let url = format!("{}?{}", config.query_url, kind.query_string());
    let request = HttpRequest::get(url)
        .with_bearer(&token.access_token)
        .with_timeout_ms(config.timeout.as_millis() as u64);

    let response = http
        .execute(request)
        .await
        .map_err(|error| UpstreamError::Transport {
            reason: error.message().to_owned(),
        })?;

    if !response.is_success() {
        return Err(UpstreamError::Status {
            status: response.status,
            excerpt: body_excerpt(&response.body),
        });
    }

    serde_json::from_str(&response.body).map_err(|error| UpstreamError::MalformedBody {
        reason: error.to_string(),
    })
}
