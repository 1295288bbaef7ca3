//! relevo-web - delivery adapters for the relay pipeline
//!
//! Exposes the pipeline three ways:
//! - `GET /api/data` - the normalized activities dataset as JSON
//! - `GET /api/client/:id` - a client lookup by account number as JSON
//! - `POST /webhook/whatsapp` - Twilio inbound messages, answered as TwiML
//!
//! plus the static frontend at `/` and `/static`. The JSON endpoints
//! surface fallback exhaustion as 502; the webhook never fails outward -
//! chat replies must always be well-formed, so every pipeline error
//! becomes a fixed apology message.

pub mod twiml;

mod error;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use relevo_core::{extract_records, find_activity, QueryResult, RelayService};

pub use error::AppError;

const STATIC_DIR: &str = "static";

/// Fixed apology sent when the webhook cannot answer from any source.
const APOLOGY_REPLY: &str = "⚠️ Lo siento, en este momento tenemos problemas para consultar la \
                             base de datos de actividades. Por favor intenta más tarde.";

/// Application state shared across handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(api_data))
        .route("/api/client/:id", get(api_client))
        .route("/webhook/whatsapp", post(whatsapp_webhook))
        .route_service("/", ServeFile::new(format!("{STATIC_DIR}/index.html")))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn api_data(State(state): State<AppState>) -> Result<Json<QueryResult>, AppError> {
    Ok(Json(state.relay.activities().await?))
}

async fn api_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueryResult>, AppError> {
    Ok(Json(state.relay.client_lookup(id).await?))
}

/// Twilio posts inbound messages form-encoded; `Body` is the user text and
/// `From` the sender id. A missing `Body` is an empty code, which never
/// matches an activity.
#[derive(Debug, Deserialize)]
struct WhatsappForm {
    #[serde(default, rename = "Body")]
    body: String,
    #[serde(default, rename = "From")]
    from: String,
}

async fn whatsapp_webhook(
    State(state): State<AppState>,
    Form(form): Form<WhatsappForm>,
) -> Response {
    let code = form.body.trim();
    info!(sender = %form.from, code, "incoming whatsapp message");

    let reply = match state.relay.activities().await {
        Ok(result) => match extract_records(&result).and_then(|records| find_activity(records, code))
        {
            Some(activity) => found_reply(code, activity),
            None => not_found_reply(code),
        },
        Err(error) => {
            warn!(%error, "whatsapp lookup failed, sending apology");
            String::from(APOLOGY_REPLY)
        }
    };

    twiml::message_reply(&reply)
}

fn found_reply(code: &str, activity: &Value) -> String {
    let description = activity
        .get("descriptionField")
        .and_then(Value::as_str)
        .unwrap_or("(Sin descripción)");
    format!("✅ *Actividad Encontrada*\n\n*Código:* {code}\n*Descripción:* {description}")
}

fn not_found_reply(code: &str) -> String {
    format!(
        "❌ Lo siento, no encontré ninguna actividad económica con el código *{code}*. \
         Por favor, verifica el código e intenta nuevamente."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn found_reply_includes_code_and_description() {
        let activity = json!({"dataField": "31", "descriptionField": "Retail"});
        let reply = found_reply("31", &activity);
        assert!(reply.contains("*Código:* 31"));
        assert!(reply.contains("Retail"));
    }

    #[test]
    fn found_reply_tolerates_missing_description() {
        let activity = json!({"dataField": "31"});
        let reply = found_reply("31", &activity);
        assert!(reply.contains("(Sin descripción)"));
    }

    #[test]
    fn not_found_reply_echoes_the_code() {
        assert!(not_found_reply("99").contains("*99*"));
    }
}
