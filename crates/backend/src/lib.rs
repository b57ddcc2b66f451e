pub mod facade;
pub mod http;
pub mod memory;

use traceweb_core::ids::TraceId;
use traceweb_core::model::Span;
use traceweb_core::query::SearchRequest;
use traceweb_core::Result;

pub use facade::TraceQuery;
pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Source of raw spans. Ordering of returned spans is never relied upon.
#[derive(Clone)]
pub enum Backend {
    Http(HttpBackend),
    Memory(MemoryBackend),
}

impl Backend {
    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<Span>> {
        match self {
            Backend::Http(b) => b.search(req).await,
            Backend::Memory(b) => b.search(req),
        }
    }

    pub async fn read(&self, id: &TraceId) -> Result<Vec<Span>> {
        match self {
            Backend::Http(b) => b.read(id).await,
            Backend::Memory(b) => b.read(id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Http(b) => b.endpoint().to_string(),
            Backend::Memory(b) => format!("memory ({} spans)", b.len()),
        }
    }
}
