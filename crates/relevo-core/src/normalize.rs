//! Response normalizer: reconciles the gateway's inconsistent JSON shapes
//! into the [`QueryResult`] contract.
//!
//! The upstream schema is not contractually stable. Different gateway
//! versions move the record list around, rename the status field, or
//! return a bare list. Normalization stamps provenance, derives a status
//! when the body carries enough signal, and locates the record list via an
//! ordered sequence of extraction strategies.

use serde_json::{Map, Value};

use crate::domain::{QueryResult, QueryStatus, SourceTag};

/// Substrings of `message` that indicate a successful upstream reply.
const SUCCESS_MARKERS: [&str; 3] = ["exitosa", "exito", "success"];

/// Keys whose presence marks a data-bearing body.
const DATA_KEYS: [&str; 2] = ["data", "information"];

/// Normalize a raw upstream body.
///
/// Idempotent: a body that already carries a `source` tag keeps it, and
/// an already-derived `status` survives another pass unchanged.
pub fn normalize(raw: Value) -> QueryResult {
    let mut body = match raw {
        Value::Object(map) => map,
        // Bare-list (or scalar) bodies are wrapped so the contract always
        // serializes as an object.
        other => {
            let mut map = Map::new();
            map.insert(String::from("data"), other);
            map
        }
    };

    let source = body
        .remove("source")
        .and_then(|value| serde_json::from_value::<SourceTag>(value).ok())
        .unwrap_or(SourceTag::Live);

    let status = body
        .remove("status")
        .and_then(|value| serde_json::from_value::<QueryStatus>(value).ok())
        .or_else(|| derive_status(&body));

    QueryResult::new(source, status, body)
}

fn derive_status(body: &Map<String, Value>) -> Option<QueryStatus> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        let lowered = message.to_lowercase();
        if SUCCESS_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return Some(QueryStatus::Success);
        }
    }

    if DATA_KEYS.iter().any(|key| body.contains_key(*key)) {
        return Some(QueryStatus::Success);
    }

    None
}

/// Locate the record list in a normalized result.
///
/// Strategies, tried in order until one matches:
/// 1. a list nested at `data.information`;
/// 2. a list directly under `data` (covers bare-list bodies, which
///    [`normalize`] wraps there);
/// 3. the first list-valued field found scanning the body's keys.
pub fn extract_records(result: &QueryResult) -> Option<&Vec<Value>> {
    nested_information(&result.body)
        .or_else(|| data_list(&result.body))
        .or_else(|| first_list_value(&result.body))
}

fn nested_information(body: &Map<String, Value>) -> Option<&Vec<Value>> {
    body.get("data")?.as_object()?.get("information")?.as_array()
}

fn data_list(body: &Map<String, Value>) -> Option<&Vec<Value>> {
    body.get("data")?.as_array()
}

fn first_list_value(body: &Map<String, Value>) -> Option<&Vec<Value>> {
    body.values().find_map(Value::as_array)
}

/// Find the activity record whose `dataField` equals the requested code.
pub fn find_activity<'a>(records: &'a [Value], code: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|record| record.get("dataField").and_then(Value::as_str) == Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bodies_without_source_are_stamped_live() {
        let result = normalize(json!({"message": "Consulta exitosa", "data": {}}));
        assert_eq!(result.source, SourceTag::Live);
    }

    #[test]
    fn existing_source_tags_are_preserved() {
        let result = normalize(json!({"source": "cache", "foo": "bar"}));
        assert_eq!(result.source, SourceTag::Cache);
    }

    #[test]
    fn status_derives_success_from_spanish_message() {
        let result = normalize(json!({"message": "Transacción Exitosa"}));
        assert_eq!(result.status, Some(QueryStatus::Success));
    }

    #[test]
    fn status_derives_success_from_data_bearing_key() {
        let result = normalize(json!({"information": []}));
        assert_eq!(result.status, Some(QueryStatus::Success));
    }

    #[test]
    fn status_stays_unset_without_signal() {
        let result = normalize(json!({"foo": "bar"}));
        assert_eq!(result.status, None);
    }

    #[test]
    fn explicit_status_wins_over_derivation() {
        let result = normalize(json!({"status": "not_found", "message": "exitosa"}));
        assert_eq!(result.status, Some(QueryStatus::NotFound));
    }

    #[test]
    fn normalize_is_idempotent() {
        let first = normalize(json!({
            "message": "Consulta exitosa",
            "data": {"information": [{"dataField": "31"}]},
        }));
        let reserialized = serde_json::to_value(&first).expect("result serializes");
        let second = normalize(reserialized);
        assert_eq!(first, second);
    }

    #[test]
    fn bare_list_bodies_are_wrapped_under_data() {
        let result = normalize(json!([{"dataField": "31"}]));
        assert_eq!(result.source, SourceTag::Live);
        assert_eq!(result.status, Some(QueryStatus::Success));
        let records = extract_records(&result).expect("records should be found");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn extraction_prefers_nested_information() {
        let result = normalize(json!({
            "data": {"information": [{"dataField": "1"}]},
            "otherList": [{"dataField": "2"}],
        }));
        let records = extract_records(&result).expect("records should be found");
        assert_eq!(records[0]["dataField"], json!("1"));
    }

    #[test]
    fn extraction_scans_keys_as_a_last_resort() {
        let result = normalize(json!({
            "message": "exitosa",
            "resultado": [{"dataField": "7"}],
        }));
        let records = extract_records(&result).expect("records should be found");
        assert_eq!(records[0]["dataField"], json!("7"));
    }

    #[test]
    fn extraction_fails_cleanly_on_listless_bodies() {
        let result = normalize(json!({"message": "exitosa"}));
        assert!(extract_records(&result).is_none());
    }

    #[test]
    fn find_activity_matches_on_data_field() {
        let records = vec![
            json!({"dataField": "31", "descriptionField": "Retail"}),
            json!({"dataField": "32", "descriptionField": "Wholesale"}),
        ];

        let found = find_activity(&records, "32").expect("record should match");
        assert_eq!(found["descriptionField"], json!("Wholesale"));
        assert!(find_activity(&records, "99").is_none());
        assert!(find_activity(&records, "").is_none());
    }
}
