use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named origin of spans and annotations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Service {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    #[default]
    Unknown,
    ClientRequest,
    ClientResponse,
    ServerRequest,
    ServerResponse,
}

impl AnnotationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::ClientRequest => "client_request",
            Self::ClientResponse => "client_response",
            Self::ServerRequest => "server_request",
            Self::ServerResponse => "server_response",
        }
    }
}

/// A timestamped event recorded during a span's lifetime.
///
/// `timestamp` is in microseconds since the unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub timestamp: i64,
    #[serde(default)]
    pub kind: AnnotationKind,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debug: BTreeMap<String, String>,
}

impl Annotation {
    pub fn at(timestamp: i64, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: AnnotationKind::Unknown,
            key: String::new(),
            value: value.into(),
            service: None,
            debug: BTreeMap::new(),
        }
    }

    /// The annotation's label: its value, or its key when the value is blank.
    pub fn label(&self) -> &str {
        if self.value.is_empty() {
            &self.key
        } else {
            &self.value
        }
    }
}

/// One traced unit of work as returned by the trace-query service.
///
/// `timestamp` and `duration` are in microseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub id: String,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Service>,
    pub timestamp: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debug: BTreeMap<String, String>,
}

impl Span {
    pub fn new(id: impl Into<String>, name: impl Into<String>, timestamp: i64, duration: i64) -> Self {
        Self {
            id: id.into(),
            trace_id: String::new(),
            parent_id: None,
            name: name.into(),
            source: None,
            destination: None,
            timestamp,
            duration,
            annotations: Vec::new(),
            debug: BTreeMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_source(mut self, service: impl Into<String>) -> Self {
        self.source = Some(Service::named(service));
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Trace this span belongs to; backends that only report `id` use it for both.
    pub fn trace_key(&self) -> &str {
        if self.trace_id.is_empty() {
            &self.id
        } else {
            &self.trace_id
        }
    }
}
