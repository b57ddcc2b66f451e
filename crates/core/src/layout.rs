//! Waterfall geometry for a single trace.
//!
//! Every position is a whole percentage of the root span's duration, where the
//! root is the first span of a chronologically ordered trace. A root with no
//! duration cannot scale anything, so widths and non-zero offsets against it
//! are pinned to 100%.

use serde::{Deserialize, Serialize};

use crate::humanize::format_duration;
use crate::model::{Annotation, Span};

const FULL: i64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanGeometry {
    pub offset_percent: i64,
    pub width_percent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Timeline {
    pub spans: Vec<SpanGeometry>,
}

impl Timeline {
    /// Lays out `spans`, which must already be in chronological order.
    pub fn compute(spans: &[Span]) -> Self {
        Self {
            spans: spans
                .iter()
                .map(|s| SpanGeometry {
                    offset_percent: offset_percent(s.timestamp, spans),
                    width_percent: width_percent(s.duration, spans),
                })
                .collect(),
        }
    }
}

/// Start of a span relative to the root, as a percentage of the root duration.
pub fn offset_percent(timestamp: i64, spans: &[Span]) -> i64 {
    let Some(root) = spans.first() else {
        return 0;
    };
    let delta = timestamp.saturating_sub(root.timestamp);
    if delta == 0 {
        return 0;
    }
    if root.duration <= 0 {
        return FULL;
    }
    percent_of(delta, root.duration)
}

/// Length of `duration` as a percentage of the root duration.
pub fn width_percent(duration: i64, spans: &[Span]) -> i64 {
    let Some(root) = spans.first() else {
        return FULL;
    };
    if root.duration <= 0 {
        return FULL;
    }
    percent_of(duration, root.duration)
}

/// Halves round to the even neighbour, so 12.5% renders as 12% and 37.5% as 38%.
fn percent_of(part: i64, whole: i64) -> i64 {
    (part as f64 / whole as f64 * 100.0).round_ties_even() as i64
}

pub fn format_percent(percent: i64) -> String {
    format!("{percent}%")
}

/// Time since the previous annotation, `0ms` for the first one.
pub fn delta(index: usize, annotations: &[Annotation]) -> String {
    if index == 0 || index >= annotations.len() {
        return "0ms".to_string();
    }
    let gap = annotations[index]
        .timestamp
        .saturating_sub(annotations[index - 1].timestamp);
    format_duration(gap)
}

pub fn annotation_deltas(annotations: &[Annotation]) -> Vec<String> {
    (0..annotations.len())
        .map(|i| delta(i, annotations))
        .collect()
}
