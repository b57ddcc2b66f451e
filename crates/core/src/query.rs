use serde::{Deserialize, Serialize};

use crate::model::Span;

/// Body of an upstream `search` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub reverse: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            name: None,
            reverse: true,
            limit: 100,
            offset: 0,
        }
    }
}

impl SearchRequest {
    /// Unfiltered listing of the most recent spans.
    pub fn latest(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>, limit: usize) -> Self {
        let name = name.into();
        Self {
            name: (!name.trim().is_empty()).then(|| name.trim().to_string()),
            limit,
            ..Self::default()
        }
    }
}

/// Body of an upstream `read` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadRequest {
    pub id: String,
}

/// Response shape shared by `search` and `read`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpansResponse {
    #[serde(default)]
    pub spans: Vec<Span>,
}
