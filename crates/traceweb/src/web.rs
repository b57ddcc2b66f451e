use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use traceweb_backend::TraceQuery;
use traceweb_core::config::normalize_base_path;
use traceweb_core::ids::TraceId;
use traceweb_core::view::{RenderConfig, SearchView, ViewBuilder};

pub const BASE_PATH_HEADER: &str = "x-base-path";
/// Header name used by older deployments behind the micro web proxy.
pub const LEGACY_BASE_PATH_HEADER: &str = "x-micro-web-base-path";

#[derive(Clone)]
pub struct AppState {
    pub query: TraceQuery,
    pub render: Arc<RenderConfig>,
    pub base_path: Arc<str>,
}

impl AppState {
    fn views(&self) -> ViewBuilder<'_> {
        ViewBuilder::new(&self.render, Utc::now())
    }

    fn base_path(&self, headers: &HeaderMap) -> String {
        [BASE_PATH_HEADER, LEGACY_BASE_PATH_HEADER]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find(|v| !v.trim().is_empty())
            .map(normalize_base_path)
            .unwrap_or_else(|| self.base_path.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    Router::new()
        .route("/", get(latest))
        .route("/latest", get(latest))
        .route("/search", get(search_page).post(search_submit))
        .route("/trace", get(missing_trace_id))
        .route("/trace/", get(missing_trace_id))
        .route("/trace/{id}", get(trace))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

pub async fn run_web_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind web listener {addr}"))?;
    tracing::info!(%addr, "web server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received ctrl-c, shutting down");
        })
        .await
        .context("serve web")
}

async fn latest(State(state): State<AppState>) -> Response {
    let spans = state.query.latest().await;
    Json(state.views().latest(&spans)).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchForm {
    id: Option<String>,
    q: Option<String>,
}

async fn search_page(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(q) = non_blank(params.q) else {
        return Json(SearchView::default()).into_response();
    };
    let spans = state.query.search(&q).await;
    Json(state.views().search(Some(&q), &spans)).into_response()
}

async fn search_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let base = state.base_path(&headers);
    if let Some(id) = non_blank(form.id) {
        return match TraceId::parse(&id) {
            Ok(trace_id) => found(&format!("{base}trace/{trace_id}")),
            Err(err) => {
                tracing::debug!(error = %err, "rejected trace id from search form");
                found(&base)
            }
        };
    }
    let Some(q) = non_blank(form.q) else {
        return found(&format!("{base}search"));
    };

    let spans = state.query.search(&q).await;
    Json(state.views().search(Some(&q), &spans)).into_response()
}

async fn trace(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Ok(trace_id) = TraceId::parse(&id) else {
        return found(&state.base_path(&headers));
    };
    let spans = state.query.trace(&trace_id).await;
    Json(state.views().trace(trace_id.as_str(), &spans)).into_response()
}

async fn missing_trace_id(State(state): State<AppState>, headers: HeaderMap) -> Response {
    found(&state.base_path(&headers))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use traceweb_backend::{Backend, MemoryBackend};

    use super::*;

    fn app() -> Router {
        let mut spans = testkit::sample_trace("abc");
        spans.extend(testkit::sample_listing());
        router(AppState {
            query: TraceQuery::new(Backend::Memory(MemoryBackend::new(spans)), 100),
            render: Arc::new(RenderConfig::default()),
            base_path: Arc::from("/"),
        })
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn form(body: &'static str) -> Request<Body> {
        Request::post("/search")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn index_lists_latest_first() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        let spans = body["spans"].as_array().unwrap();
        assert_eq!(spans.len(), 7);
        assert_eq!(spans[0]["name"], "checkout-retry");
    }

    #[tokio::test]
    async fn trace_view_has_waterfall_fields() {
        let response = app()
            .oneshot(Request::get("/trace/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["id"], "abc");
        let spans = body["spans"].as_array().unwrap();
        assert_eq!(spans[0]["name"], "GET /v1/orders");
        assert_eq!(spans[1]["offset"], "40%");
        assert_eq!(spans[2]["width"], "10%");
        assert_eq!(spans[2]["service"], "n/a");
        assert_eq!(spans[0]["annotations"][1]["delta"], "0.500ms");
    }

    #[tokio::test]
    async fn unknown_trace_renders_empty() {
        let response = app()
            .oneshot(Request::get("/trace/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json(response).await["spans"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_trace_id_redirects_home() {
        let response = app()
            .oneshot(
                Request::get("/trace/")
                    .header(BASE_PATH_HEADER, "/debug")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/debug/");
    }

    #[tokio::test]
    async fn search_get_without_query_is_blank() {
        let response = app()
            .oneshot(Request::get("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json(response).await;
        assert!(body["query"].is_null());
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_get_with_query() {
        let response = app()
            .oneshot(Request::get("/search?q=checkout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["query"], "checkout");
        let names = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["checkout-retry", "checkout"]);
    }

    #[tokio::test]
    async fn search_post_with_id_redirects_to_trace() {
        let response = app().oneshot(form("id=abc&q=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/trace/abc");
    }

    #[tokio::test]
    async fn legacy_base_path_header_is_honoured() {
        let response = app()
            .oneshot(
                Request::get("/trace")
                    .header(LEGACY_BASE_PATH_HEADER, "/micro/web")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(location(&response), "/micro/web/");
    }

    #[tokio::test]
    async fn search_post_with_unsafe_id_redirects_home() {
        for body in ["id=abc%3Fq%3D1", "id=abc%23top", "id=a%2Fb"] {
            let response = app().oneshot(form(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(location(&response), "/", "form body {body}");
        }
    }

    #[tokio::test]
    async fn search_post_without_query_redirects_back() {
        let response = app().oneshot(form("q=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/search");
    }

    #[tokio::test]
    async fn search_post_miss_is_empty() {
        let response = app()
            .oneshot(form("q=nonexistent-service"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["query"], "nonexistent-service");
        assert!(body["results"].as_array().unwrap().is_empty());
    }
}
