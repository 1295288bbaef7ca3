use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub const DEFAULT_AUTH_URL: &str =
    "https://apim-calidad.claro.com.co/MsCommunicatAuthToken/User/authenticate";
pub const DEFAULT_QUERY_URL: &str =
    "https://apim-calidad.claro.com.co/APIMCusAccoInfoQuery/MS/CUS/CustomerBill/RSCusAccoInfoQuery/V1/GET/InfoQuery";

const DEFAULT_CLIENT_ID: &str = "usaccoinfo";
const DEFAULT_CLIENT_SECRET: &str = "757fb7ee-55cc-4311-9b11-e97616d24689";
const DEFAULT_SNAPSHOT_PATH: &str = "cache/snapshot.json";
const DEFAULT_PORT: u16 = 8000;
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth client credentials. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
}

impl Credentials {
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: String::from("client_credentials"),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::client_credentials(DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET)
    }
}

/// Paths of a PEM client certificate and key for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCert {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Process-wide configuration, constructed once at startup and passed into
/// each component.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub auth_url: String,
    pub query_url: String,
    pub credentials: Credentials,
    /// Bounded timeout applied to every outbound call.
    pub timeout: Duration,
    /// Last-known-good snapshot, written out-of-band. Read-only at runtime.
    pub snapshot_path: PathBuf,
    pub port: u16,
    pub client_cert: Option<ClientCert>,
    /// True when running on a port-assigning platform without client
    /// certificates. Canned responses substitute for a missing snapshot.
    pub demo_mode: bool,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let platform_port = env::var("PORT").ok();
        let port = platform_port
            .as_deref()
            .map(|raw| raw.parse().expect("PORT must be a valid TCP port number"))
            .unwrap_or(DEFAULT_PORT);

        let client_cert = match (env::var("CERT_PATH"), env::var("KEY_PATH")) {
            (Ok(cert_path), Ok(key_path)) => Some(ClientCert {
                cert_path: cert_path.into(),
                key_path: key_path.into(),
            }),
            _ => None,
        };

        let demo_mode = platform_port.is_some() && client_cert.is_none();
        if demo_mode {
            info!("platform port assigned without client certificates, demo fallback enabled");
        }

        Self {
            auth_url: var_or("RELEVO_AUTH_URL", DEFAULT_AUTH_URL),
            query_url: var_or("RELEVO_QUERY_URL", DEFAULT_QUERY_URL),
            credentials: Credentials::client_credentials(
                var_or("RELEVO_CLIENT_ID", DEFAULT_CLIENT_ID),
                var_or("RELEVO_CLIENT_SECRET", DEFAULT_CLIENT_SECRET),
            ),
            timeout: OUTBOUND_TIMEOUT,
            snapshot_path: PathBuf::from(var_or("RELEVO_SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH)),
            port,
            client_cert,
            demo_mode,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            auth_url: String::from(DEFAULT_AUTH_URL),
            query_url: String::from(DEFAULT_QUERY_URL),
            credentials: Credentials::default(),
            timeout: OUTBOUND_TIMEOUT,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            port: DEFAULT_PORT,
            client_cert: None,
            demo_mode: false,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default");
        default.to_owned()
    })
}
