//! # Relevo Core
//!
//! Relay pipeline for the relevo backend: authenticate against an
//! OAuth2-protected gateway, forward a query, and reconcile the response
//! into a single predictable contract, falling back to a cached snapshot
//! or canned demo data when the upstream is unreachable.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`auth`] | Credential provider (bearer token acquisition) |
//! | [`config`] | Process configuration, built once at startup |
//! | [`domain`] | The normalized [`QueryResult`] contract |
//! | [`error`] | Error taxonomy |
//! | [`fallback`] | Snapshot/demo fallback resolver |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Upstream shape reconciliation |
//! | [`relay`] | The combined pipeline |
//! | [`upstream`] | Authenticated gateway queries |
//!
//! ## Control flow
//!
//! ```text
//! ┌──────────────────┐
//! │ Delivery adapter │
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐   failure   ┌───────────────────┐
//! │ Credential       │────────────▶│ Fallback resolver │
//! │ provider         │             │ (snapshot / demo) │
//! └────────┬─────────┘             └─────────┬─────────┘
//!          ▼                                 │
//! ┌──────────────────┐   failure             │
//! │ Upstream query   │───────────────────────┤
//! └────────┬─────────┘                       │
//!          ▼                                 ▼
//! ┌──────────────────────────────────────────────────┐
//! │ Normalizer → QueryResult { source, status, body }│
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Every result carries a non-empty `source` tag; consumers never guess
//! provenance.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod http_client;
pub mod normalize;
pub mod relay;
pub mod upstream;

pub use auth::{acquire_token, Token};
pub use config::{ClientCert, Credentials, RelayConfig};
pub use domain::{QueryResult, QueryStatus, SourceTag};
pub use error::{body_excerpt, AuthError, NoFallbackError, RelayError, UpstreamError};
pub use fallback::resolve_fallback;
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use normalize::{extract_records, find_activity, normalize};
pub use relay::RelayService;
pub use upstream::{fetch, QueryKind};
