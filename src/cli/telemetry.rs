use anyhow::Result;
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{Tracer, TracerProvider},
};
use std::{env::var, sync::OnceLock, time::Duration};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;

static TRACER_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

/// gRPC needs a scheme; bare `host:port` values get https.
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint.trim_end_matches('/'))
    }
}

fn init_tracer(endpoint: &str) -> Result<Tracer> {
    if let Ok(proto) = var("OTEL_EXPORTER_OTLP_PROTOCOL") {
        if proto != "grpc" {
            debug!("OTEL_EXPORTER_OTLP_PROTOCOL='{proto}' ignored: only 'grpc' is supported");
        }
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(normalize_endpoint(endpoint))
        .with_timeout(Duration::from_secs(3))
        .build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance_id),
        ]))
        .build();

    let _ = TRACER_PROVIDER.set(provider.clone());

    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

/// Initialize logging, plus OTLP span export when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// # Errors
///
/// Returns an error if the exporter or the global subscriber cannot be set up
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false);

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    match var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) if !endpoint.is_empty() => {
            let tracer = init_tracer(&endpoint)?;
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

            let subscriber = Registry::default()
                .with(fmt_layer)
                .with(otel_layer)
                .with(filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        _ => {
            let subscriber = Registry::default().with(fmt_layer).with(filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Flush and stop the span exporter; a no-op when tracing export is off.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        if let Err(err) = provider.shutdown() {
            debug!("tracer provider shutdown failed: {err}");
        }
    }
}
