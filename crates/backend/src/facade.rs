use traceweb_core::ids::TraceId;
use traceweb_core::model::Span;
use traceweb_core::order::{SpanOrder, order_trace};
use traceweb_core::query::SearchRequest;

use crate::Backend;

/// Read side used by the views: fetch, re-sort locally, and turn failures
/// into empty results.
#[derive(Clone)]
pub struct TraceQuery {
    backend: Backend,
    search_limit: usize,
}

impl TraceQuery {
    pub fn new(backend: Backend, search_limit: usize) -> Self {
        Self {
            backend,
            search_limit,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Most recent spans, latest first.
    pub async fn latest(&self) -> Vec<Span> {
        let req = SearchRequest::latest(self.search_limit);
        self.fetch_search(&req).await
    }

    /// Spans whose name matches `name`, latest first.
    pub async fn search(&self, name: &str) -> Vec<Span> {
        let req = SearchRequest::named(name, self.search_limit);
        self.fetch_search(&req).await
    }

    /// Every span of one trace, chronological so the first span is the root.
    pub async fn trace(&self, id: &TraceId) -> Vec<Span> {
        match self.backend.read(id).await {
            Ok(spans) => {
                tracing::debug!(trace_id = %id, count = spans.len(), "trace read");
                order_trace(spans, SpanOrder::Chronological)
            }
            Err(err) => {
                tracing::warn!(trace_id = %id, error = %err, "trace read failed");
                Vec::new()
            }
        }
    }

    async fn fetch_search(&self, req: &SearchRequest) -> Vec<Span> {
        match self.backend.search(req).await {
            Ok(spans) => order_trace(spans, SpanOrder::LatestFirst),
            Err(err) => {
                tracing::warn!(name = ?req.name, error = %err, "trace search failed");
                Vec::new()
            }
        }
    }
}
