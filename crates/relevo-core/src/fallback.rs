//! Fallback resolver: answers a query after the live path has failed.
//!
//! Policy, in order: a durable snapshot of the last good response, then a
//! canned demo branch when the deployment has no real upstream
//! credentials, then nothing.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::domain::{QueryResult, QueryStatus, SourceTag};
use crate::error::NoFallbackError;
use crate::upstream::QueryKind;

pub fn resolve_fallback(
    config: &RelayConfig,
    kind: &QueryKind,
) -> Result<QueryResult, NoFallbackError> {
    if let Some(body) = read_snapshot(&config.snapshot_path) {
        info!(path = %config.snapshot_path.display(), "serving cached snapshot");
        return Ok(snapshot_result(body));
    }

    if config.demo_mode {
        let result = demo_result(kind.identifier());
        info!(source = %result.source, "serving demo branch");
        return Ok(result);
    }

    Err(NoFallbackError::new(
        "upstream unreachable, no snapshot on disk and demo mode is inactive",
    ))
}

/// A snapshot passes through untouched apart from the provenance stamp;
/// status derivation stays a live-path concern.
fn snapshot_result(mut body: Map<String, Value>) -> QueryResult {
    body.remove("source");
    let status = body
        .remove("status")
        .and_then(|value| serde_json::from_value::<QueryStatus>(value).ok());
    QueryResult::new(SourceTag::Cache, status, body)
}

fn read_snapshot(path: &Path) -> Option<Map<String, Value>> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(path = %path.display(), "snapshot is not a JSON object, ignoring");
            None
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "snapshot is unreadable, ignoring");
            None
        }
    }
}

/// Canned branch selection by substring of the requested identifier.
fn demo_result(identifier: &str) -> QueryResult {
    if identifier.contains("9595") {
        demo_found(identifier)
    } else if identifier.contains("error") {
        demo_error()
    } else {
        demo_not_found(identifier)
    }
}

fn demo_found(identifier: &str) -> QueryResult {
    let body = json!({
        "message": "Consulta exitosa",
        "data": {
            "nit": identifier,
            "nombre": "Comercializadora El Dorado S.A.S.",
            "estado": "ACTIVO",
            "segmento": "Corporativo",
            "direccion": "Cra 7 # 71-21, Bogotá",
            "fecha_vinculacion": "2019-03-14",
        },
    });
    into_result(SourceTag::DemoFound, Some(QueryStatus::Success), body)
}

fn demo_error() -> QueryResult {
    let body = json!({
        "message": "Error simulado del servicio de consulta",
        "detail": "El identificador solicitado dispara la rama de error de demostración",
    });
    into_result(SourceTag::DemoError, Some(QueryStatus::Error), body)
}

fn demo_not_found(identifier: &str) -> QueryResult {
    let body = json!({
        "message": format!("No se encontró información para el identificador '{identifier}'"),
    });
    into_result(SourceTag::DemoNotFound, Some(QueryStatus::NotFound), body)
}

fn into_result(source: SourceTag, status: Option<QueryStatus>, body: Value) -> QueryResult {
    let map = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    QueryResult::new(source, status, map)
}
