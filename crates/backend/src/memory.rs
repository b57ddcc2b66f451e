use std::fs;
use std::path::Path;
use std::sync::Arc;

use traceweb_core::error::{Result, TraceWebError};
use traceweb_core::ids::TraceId;
use traceweb_core::model::Span;
use traceweb_core::order::{SpanOrder, sort_spans};
use traceweb_core::query::SearchRequest;

/// Spans held in memory, typically loaded from a JSON fixture file.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    spans: Arc<Vec<Span>>,
}

impl MemoryBackend {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans: Arc::new(spans),
        }
    }

    /// Loads a file containing a JSON array of spans.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| TraceWebError::Io(format!("failed reading {}: {e}", path.display())))?;
        let spans: Vec<Span> = serde_json::from_str(&raw)
            .map_err(|e| TraceWebError::Parse(format!("failed parsing {}: {e}", path.display())))?;
        Ok(Self::new(spans))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Case-insensitive substring match on span name. Matches are ordered by
    /// timestamp (newest first when `reverse`) before `offset` and `limit` apply.
    pub fn search(&self, req: &SearchRequest) -> Result<Vec<Span>> {
        let needle = req.name.as_deref().map(str::to_ascii_lowercase);
        let matched = self
            .spans
            .iter()
            .filter(|s| match &needle {
                Some(n) => s.name.to_ascii_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        let order = if req.reverse {
            SpanOrder::LatestFirst
        } else {
            SpanOrder::Chronological
        };
        Ok(sort_spans(matched, order)
            .into_iter()
            .skip(req.offset)
            .take(req.limit)
            .collect())
    }

    pub fn read(&self, id: &TraceId) -> Result<Vec<Span>> {
        Ok(self
            .spans
            .iter()
            .filter(|s| s.trace_key() == id.as_str())
            .cloned()
            .collect())
    }
}
