use traceweb_core::model::{Annotation, AnnotationKind, Service, Span};

/// 2026-02-01T00:00:00Z in microseconds.
pub const BASE_US: i64 = 1_769_904_000_000_000;

/// Three spans of trace `trace_id`, deliberately out of order.
///
/// Chronologically: root at +1000us lasting 500us, `db.query` at +1200us
/// lasting 100us, `cache.get` at +1500us lasting 50us.
pub fn sample_trace(trace_id: &str) -> Vec<Span> {
    let root = Span::new("root", "GET /v1/orders", BASE_US + 1000, 500)
        .with_trace_id(trace_id)
        .with_source("api")
        .with_annotations(vec![
            annotation(BASE_US + 1500, AnnotationKind::ServerResponse, "ss"),
            annotation(BASE_US + 1000, AnnotationKind::ServerRequest, "sr"),
        ]);

    let mut db = Span::new("db", "db.query", BASE_US + 1200, 100)
        .with_trace_id(trace_id)
        .with_source("orders-db");
    db.parent_id = Some("root".to_string());

    let mut cache = Span::new("cache", "cache.get", BASE_US + 1500, 50).with_trace_id(trace_id);
    cache.parent_id = Some("root".to_string());
    cache.annotations = vec![
        annotation(BASE_US + 4000, AnnotationKind::ClientResponse, "cr"),
        annotation(BASE_US + 1000, AnnotationKind::ClientRequest, "cs"),
        annotation(BASE_US + 1500, AnnotationKind::Unknown, "retry"),
    ];

    vec![cache, root, db]
}

/// Root spans of several traces, one per second, oldest first.
pub fn sample_listing() -> Vec<Span> {
    ["checkout", "login", "search", "checkout-retry"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = format!("trace-{i}");
            Span::new(id.clone(), *name, BASE_US + i as i64 * 1_000_000, 2_000)
                .with_trace_id(id)
                .with_source(if i % 2 == 0 { "web" } else { "auth" })
        })
        .collect()
}

/// All sample spans encoded as a fixture file body.
pub fn fixture_json() -> String {
    let mut spans = sample_trace("abc");
    spans.extend(sample_listing());
    serde_json::to_string_pretty(&spans).unwrap_or_else(|_| "[]".to_string())
}

fn annotation(timestamp: i64, kind: AnnotationKind, key: &str) -> Annotation {
    Annotation {
        kind,
        key: key.to_string(),
        service: Some(Service::named("api")),
        ..Annotation::at(timestamp, "")
    }
}
