use crate::config::Config;
use crate::server::error::{Result, ServerError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "signal_relay=debug,tower_http=debug,axum=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn fmt_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true);
    if json {
        layer.json().boxed()
    } else {
        layer.with_ansi(true).boxed()
    }
}

pub fn init_telemetry(config: &Config) -> Result<()> {
    if config.enable_telemetry {
        return init_with_jaeger(config);
    }

    Registry::default()
        .with(env_filter())
        .with(fmt_layer(config.log_json))
        .try_init()
        .map_err(|e| ServerError::Telemetry(e.to_string()))?;

    tracing::info!("Telemetry disabled");
    Ok(())
}

#[cfg(feature = "telemetry")]
fn init_with_jaeger(config: &Config) -> Result<()> {
    use opentelemetry::sdk::propagation::TraceContextPropagator;
    use opentelemetry::sdk::{
        trace::{self, RandomIdGenerator, Sampler},
        Resource,
    };
    use opentelemetry::{global, KeyValue};

    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer = opentelemetry_jaeger::new_collector_pipeline()
        .with_service_name("signal-relay")
        .with_endpoint(&config.jaeger_endpoint)
        .with_isahc()
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_max_events_per_span(64)
                .with_max_attributes_per_span(16)
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "signal-relay"),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .with_timeout(std::time::Duration::from_secs(2))
        .install_batch(opentelemetry::runtime::Tokio)
        .map_err(|e| ServerError::Telemetry(e.to_string()))?;

    Registry::default()
        .with(env_filter())
        .with(fmt_layer(config.log_json))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|e| ServerError::Telemetry(e.to_string()))?;

    tracing::info!(
        "Telemetry initialized with Jaeger endpoint: {}",
        config.jaeger_endpoint
    );
    Ok(())
}

#[cfg(not(feature = "telemetry"))]
fn init_with_jaeger(_config: &Config) -> Result<()> {
    Err(ServerError::InvalidConfig(
        "telemetry requested but the `telemetry` feature is not enabled".to_string(),
    ))
}

#[cfg(feature = "telemetry")]
pub fn shutdown_telemetry(config: &Config) {
    if config.enable_telemetry {
        // Flush spans still buffered in the batch exporter.
        opentelemetry::global::shutdown_tracer_provider();
    }
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_telemetry(_config: &Config) {}

#[cfg(all(test, not(feature = "telemetry")))]
mod tests {
    use super::*;

    #[test]
    fn test_jaeger_requires_feature() {
        let config = Config {
            enable_telemetry: true,
            ..Config::default()
        };
        assert!(matches!(
            init_telemetry(&config),
            Err(ServerError::InvalidConfig(_))
        ));
    }
}
