use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::warn;

use crate::config::{ClientCert, RelayConfig};

/// Minimal HTTP method set needed by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP request envelope used by outbound transport calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: 10_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Attach a `application/x-www-form-urlencoded` body built from key/value pairs.
    pub fn with_form_body(mut self, pairs: &[(&str, &str)]) -> Self {
        let body = pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(body);
        self.with_header("content-type", "application/x-www-form-urlencoded")
    }

    /// Attach a JSON body.
    pub fn with_json_body(mut self, value: &serde_json::Value) -> Self {
        self.body = Some(value.to_string());
        self.with_header("content-type", "application/json")
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("authorization", format!("Bearer {token}"))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract that supports async execution of envelope requests.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("relevo/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    /// Build a client for the configured upstream.
    ///
    /// The QA gateway presents a broken certificate chain, so verification
    /// is disabled for it. When client certificate paths are configured,
    /// the PEM identity is attached for mutual TLS; an unreadable identity
    /// downgrades to plain TLS with a warning rather than failing startup.
    pub fn from_config(config: &RelayConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .user_agent("relevo/0.1.0")
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true);

        if let Some(identity) = config.client_cert.as_ref().and_then(load_identity) {
            builder = builder.identity(identity);
        }

        Self {
            client: Arc::new(builder.build().unwrap_or_else(|_| reqwest::Client::new())),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn load_identity(cert: &ClientCert) -> Option<reqwest::Identity> {
    let mut pem = match std::fs::read(&cert.cert_path) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(path = %cert.cert_path.display(), %error, "client certificate unreadable");
            return None;
        }
    };
    match std::fs::read(&cert.key_path) {
        Ok(mut key) => pem.append(&mut key),
        Err(error) => {
            warn!(path = %cert.key_path.display(), %error, "client key unreadable");
            return None;
        }
    }

    match reqwest::Identity::from_pem(&pem) {
        Ok(identity) => Some(identity),
        Err(error) => {
            warn!(%error, "client certificate could not be parsed");
            None
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_populates_authorization_header() {
        let request = HttpRequest::get("https://example.test/query").with_bearer("token-123");

        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer token-123")
        );
    }

    #[test]
    fn form_body_is_urlencoded_with_content_type() {
        let request = HttpRequest::post("https://example.test/authenticate")
            .with_form_body(&[("client_id", "usaccoinfo"), ("grant_type", "client credentials")]);

        assert_eq!(
            request.body.as_deref(),
            Some("client_id=usaccoinfo&grant_type=client%20credentials")
        );
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = HttpRequest::post("https://example.test/authenticate")
            .with_json_body(&serde_json::json!({"client_id": "usaccoinfo"}));

        assert_eq!(request.body.as_deref(), Some(r#"{"client_id":"usaccoinfo"}"#));
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }
}
