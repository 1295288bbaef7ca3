//! The normalized result contract returned to every delivery adapter.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance tag carried by every result handed to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Live,
    Cache,
    DemoFound,
    DemoError,
    DemoNotFound,
    Error,
}

impl SourceTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cache => "cache",
            Self::DemoFound => "demo_found",
            Self::DemoError => "demo_error",
            Self::DemoNotFound => "demo_not_found",
            Self::Error => "error",
        }
    }

    /// Whether this result was synthesized by a demo branch.
    pub const fn is_demo(self) -> bool {
        matches!(self, Self::DemoFound | Self::DemoError | Self::DemoNotFound)
    }
}

impl Display for SourceTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Success,
    Error,
    NotFound,
}

impl QueryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::NotFound => "not_found",
        }
    }
}

impl Display for QueryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized query result.
///
/// Serializes flat: the upstream body's own keys sit next to the injected
/// `source` and `status` fields, so consumers see the original payload plus
/// provenance. `status` is omitted entirely when nothing could be derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub source: SourceTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QueryStatus>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl QueryResult {
    pub fn new(source: SourceTag, status: Option<QueryStatus>, body: Map<String, Value>) -> Self {
        Self {
            source,
            status,
            body,
        }
    }
}
