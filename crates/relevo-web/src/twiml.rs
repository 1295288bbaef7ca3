//! Minimal TwiML rendering for Twilio chat replies.

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Render a single-message TwiML reply.
pub fn message_reply(text: &str) -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        document(text),
    )
        .into_response()
}

fn document(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(text)
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
