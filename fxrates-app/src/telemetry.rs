//! Tracing subscriber and optional OTLP span export.

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppEnv;

const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn default_filter(app_env: AppEnv) -> &'static str {
    match app_env {
        AppEnv::Local | AppEnv::Dev => {
            "info,fxrates_app=debug,fxrates_service=debug,fxrates_sdmx=debug,fxrates_repo=debug"
        }
        AppEnv::Prod => "info",
    }
}

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // The tonic exporter picks the endpoint up from OTEL_EXPORTER_OTLP_ENDPOINT
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create OTLP span exporter: {}", e))?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fxrates-worker"), provider))
}

/// Installs the global subscriber.
///
/// `local` logs human-readable text, `dev` and `prod` log JSON lines. `RUST_LOG`
/// overrides the per-environment default filter. Returns the tracer provider when
/// OTLP export is enabled so the caller can flush it on shutdown.
pub fn init(app_env: AppEnv) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(app_env)));

    let (text, json) = match app_env {
        AppEnv::Local => (Some(fmt::layer()), None),
        AppEnv::Dev | AppEnv::Prod => (None, Some(fmt::layer().json())),
    };

    let (telemetry, provider) = if std::env::var_os(OTLP_ENDPOINT_VAR).is_some() {
        let (tracer, provider) = init_tracer()?;
        (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .with(telemetry)
        .init();

    Ok(provider)
}
