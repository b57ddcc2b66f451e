//! Render-ready view models.
//!
//! Builders expect spans in the order produced by the query facade: latest
//! first for listings, chronological for a single trace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::colour::Palette;
use crate::humanize::{DEFAULT_STALE_AFTER_MINUTES, format_duration, time_ago};
use crate::layout::{Timeline, annotation_deltas, format_percent};
use crate::model::{Annotation, Service, Span};
use crate::time::{format_timestamp, micros_to_secs};

pub const ABSENT_SERVICE: &str = "n/a";

/// Presentation settings, built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub palette: Palette,
    pub stale_after_minutes: f64,
    pub absent_service: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
            absent_service: ABSENT_SERVICE.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn service_label<'a>(&'a self, service: Option<&'a Service>) -> &'a str {
        match service {
            Some(s) => &s.name,
            None => &self.absent_service,
        }
    }

    pub fn colour(&self, name: &str) -> &str {
        self.palette.colour(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanSummary {
    pub id: String,
    pub trace_id: String,
    pub name: String,
    pub service: String,
    pub colour: String,
    pub timestamp: i64,
    pub started: String,
    pub age: String,
    pub duration_us: i64,
    pub duration: String,
    pub annotation_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationView {
    pub timestamp: i64,
    pub kind: String,
    pub label: String,
    pub service: String,
    pub colour: String,
    pub delta: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanView {
    #[serde(flatten)]
    pub summary: SpanSummary,
    pub offset_percent: i64,
    pub width_percent: i64,
    pub offset: String,
    pub width: String,
    pub annotations: Vec<AnnotationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LatestView {
    pub spans: Vec<SpanSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchView {
    pub query: Option<String>,
    pub results: Vec<SpanSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraceView {
    pub id: String,
    pub duration: String,
    pub spans: Vec<SpanView>,
}

pub struct ViewBuilder<'a> {
    cfg: &'a RenderConfig,
    now: DateTime<Utc>,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(cfg: &'a RenderConfig, now: DateTime<Utc>) -> Self {
        Self { cfg, now }
    }

    pub fn latest(&self, spans: &[Span]) -> LatestView {
        LatestView {
            spans: spans.iter().map(|s| self.summary(s)).collect(),
        }
    }

    pub fn search(&self, query: Option<&str>, spans: &[Span]) -> SearchView {
        SearchView {
            query: query.map(str::to_string),
            results: spans.iter().map(|s| self.summary(s)).collect(),
        }
    }

    pub fn trace(&self, id: &str, spans: &[Span]) -> TraceView {
        let timeline = Timeline::compute(spans);
        let views = spans
            .iter()
            .zip(timeline.spans)
            .map(|(span, geometry)| SpanView {
                summary: self.summary(span),
                offset_percent: geometry.offset_percent,
                width_percent: geometry.width_percent,
                offset: format_percent(geometry.offset_percent),
                width: format_percent(geometry.width_percent),
                annotations: self.annotations(span),
            })
            .collect();

        TraceView {
            id: id.to_string(),
            duration: format_duration(spans.first().map(|s| s.duration).unwrap_or(0)),
            spans: views,
        }
    }

    pub fn summary(&self, span: &Span) -> SpanSummary {
        let service = self.cfg.service_label(span.source.as_ref());
        SpanSummary {
            id: span.id.clone(),
            trace_id: span.trace_key().to_string(),
            name: span.name.clone(),
            service: service.to_string(),
            colour: self.cfg.colour(service).to_string(),
            timestamp: span.timestamp,
            started: format_timestamp(span.timestamp),
            age: time_ago(
                micros_to_secs(span.timestamp),
                self.now,
                self.cfg.stale_after_minutes,
            ),
            duration_us: span.duration,
            duration: format_duration(span.duration),
            annotation_count: span.annotations.len(),
        }
    }

    fn annotations(&self, span: &Span) -> Vec<AnnotationView> {
        let deltas = annotation_deltas(&span.annotations);
        span.annotations
            .iter()
            .zip(deltas)
            .map(|(ann, delta)| self.annotation(span, ann, delta))
            .collect()
    }

    fn annotation(&self, span: &Span, ann: &Annotation, delta: String) -> AnnotationView {
        let service = self
            .cfg
            .service_label(ann.service.as_ref().or(span.source.as_ref()));
        AnnotationView {
            timestamp: ann.timestamp,
            kind: ann.kind.as_str().to_string(),
            label: ann.label().to_string(),
            service: service.to_string(),
            colour: self.cfg.colour(service).to_string(),
            delta,
        }
    }
}
