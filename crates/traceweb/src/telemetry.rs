use std::io::IsTerminal;

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init_cli_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();
}

/// Owns the OTLP pipeline started by [`init_serve_tracing`]. Dropping it
/// flushes and stops the exporter.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let Some(provider) = self.provider.take() else {
            return;
        };
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "otlp exporter shutdown failed");
        }
    }
}

/// Logging for `serve`: compact stderr output at `info` unless `RUST_LOG`
/// says otherwise, plus OTLP export of request spans when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_serve_tracing() -> TelemetryGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact();

    let provider = provider_from_env();
    let export = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("traceweb")));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(export)
        .try_init();

    TelemetryGuard { provider }
}

fn provider_from_env() -> Option<SdkTracerProvider> {
    std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT")?;
    match SpanExporter::builder().with_tonic().build() {
        Ok(exporter) => Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .build(),
        ),
        Err(err) => {
            eprintln!("traceweb: otlp export disabled: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_guard_shuts_down_provider() {
        drop(TelemetryGuard { provider: None });

        let provider = SdkTracerProvider::builder().build();
        drop(TelemetryGuard {
            provider: Some(provider.clone()),
        });
        // Clones share state, so the guard already stopped this one.
        assert!(provider.shutdown().is_err());
    }
}
