//! Credential provider: bearer token acquisition with a one-shot
//! alternate-encoding retry.
//!
//! The authentication endpoint is supposed to take the standard OAuth2
//! form-encoded body, but some gateway deployments only accept JSON. The
//! provider sends the form encoding first and retries exactly once with
//! JSON when the first attempt is rejected. Tokens are acquired per
//! request and never persisted.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::{body_excerpt, AuthError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};

/// Bearer token for upstream calls. No expiry tracking; its scope is a
/// single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
}

/// The token field name varies across gateway versions.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "token")]
    access_token: Option<String>,
}

/// Obtain a bearer token from the authentication endpoint.
pub async fn acquire_token(
    http: &dyn HttpClient,
    config: &RelayConfig,
) -> Result<Token, AuthError> {
    let timeout_ms = config.timeout.as_millis() as u64;
    let credentials = &config.credentials;

    let form_request = HttpRequest::post(&config.auth_url)
        .with_form_body(&[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", credentials.grant_type.as_str()),
        ])
        .with_timeout_ms(timeout_ms);

    let mut response = execute(http, form_request).await?;

    if !response.is_success() {
        debug!(
            status = response.status,
            "form-encoded auth attempt rejected, retrying with JSON body"
        );
        let json_request = HttpRequest::post(&config.auth_url)
            .with_json_body(&json!({
                "client_id": credentials.client_id,
                "client_secret": credentials.client_secret,
                "grant_type": credentials.grant_type,
            }))
            .with_timeout_ms(timeout_ms);

        let retry = execute(http, json_request).await?;
        if retry.is_success() {
            response = retry;
        }
    }

    if !response.is_success() {
        return Err(AuthError::Rejected {
            status: response.status,
            excerpt: body_excerpt(&response.body),
        });
    }

    extract_token(&response)
}

async fn execute(http: &dyn HttpClient, request: HttpRequest) -> Result<HttpResponse, AuthError> {
    http.execute(request)
        .await
        .map_err(|error| AuthError::Transport {
            reason: error.message().to_owned(),
        })
}

fn extract_token(response: &HttpResponse) -> Result<Token, AuthError> {
    let parsed: TokenResponse =
        serde_json::from_str(&response.body).map_err(|error| AuthError::MalformedResponse {
            reason: error.to_string(),
            excerpt: body_excerpt(&response.body),
        })?;

    match parsed.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(Token { access_token }),
        _ => Err(AuthError::MissingToken {
            excerpt: body_excerpt(&response.body),
        }),
    }
}
