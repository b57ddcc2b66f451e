use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use traceweb_core::error::{Result, TraceWebError};
use traceweb_core::ids::TraceId;
use traceweb_core::model::Span;
use traceweb_core::query::{ReadRequest, SearchRequest, SpansResponse};

/// JSON-over-HTTP client for the upstream trace-query service.
///
/// Calls are `POST {endpoint}/search` and `POST {endpoint}/read`, both
/// answering `{"spans": [...]}`.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TraceWebError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<Span>> {
        self.call("search", req).await
    }

    pub async fn read(&self, id: &TraceId) -> Result<Vec<Span>> {
        self.call(
            "read",
            &ReadRequest {
                id: id.as_str().to_string(),
            },
        )
        .await
    }

    async fn call<T: Serialize>(&self, method: &str, body: &T) -> Result<Vec<Span>> {
        let url = format!("{}/{method}", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TraceWebError::BackendUnavailable(format!("{method} {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TraceWebError::BackendUnavailable(format!(
                "{method} {url} returned status {status}"
            )));
        }

        let decoded: SpansResponse = response.json().await.map_err(|e| {
            TraceWebError::BackendUnavailable(format!("{method} {url}: bad response body: {e}"))
        })?;
        tracing::debug!(method, count = decoded.spans.len(), "trace backend answered");
        Ok(decoded.spans)
    }
}
