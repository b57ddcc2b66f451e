use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, Span};

/// Direction of the outer span order. Callers always pick one explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpanOrder {
    /// Ascending start time; the first span is the trace root.
    Chronological,
    /// Descending start time, for listings.
    LatestFirst,
}

/// Orders spans by start timestamp. Equal timestamps keep their input order.
pub fn sort_spans(mut spans: Vec<Span>, order: SpanOrder) -> Vec<Span> {
    match order {
        SpanOrder::Chronological => spans.sort_by_key(|s| s.timestamp),
        SpanOrder::LatestFirst => spans.sort_by_key(|s| Reverse(s.timestamp)),
    }
    spans
}

/// Orders annotations ascending by timestamp, stable for ties.
pub fn sort_annotations(mut annotations: Vec<Annotation>) -> Vec<Annotation> {
    annotations.sort_by_key(|a| a.timestamp);
    annotations
}

/// Orders the spans and, inside each span, its annotations.
pub fn order_trace(spans: Vec<Span>, order: SpanOrder) -> Vec<Span> {
    sort_spans(spans, order)
        .into_iter()
        .map(|mut span| {
            if !span.annotations.is_empty() {
                span.annotations = sort_annotations(std::mem::take(&mut span.annotations));
            }
            span
        })
        .collect()
}
