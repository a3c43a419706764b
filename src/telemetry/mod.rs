//! # Módulo de Telemetria
//!
//! Instala o subscriber do `tracing` e, opcionalmente, exporta os spans via
//! OpenTelemetry (OTLP/gRPC).
//!
//! O console (stdout) é da narração da execução; os logs vão para stderr.
//! Por isso o nível padrão é `warn`: só avisos e erros aparecem junto com a
//! narração, a não ser que `RUST_LOG` ou `--log-level` peçam mais.
//!
//! ## Spans emitidos
//!
//! ```text
//! test_case {order, name}
//!   └── http_send {method, url}
//! ```
//!
//! ## Configuração via variáveis de ambiente:
//!
//! - `RUST_LOG`: filtro do `tracing-subscriber` (tem precedência)
//! - `OTEL_SERVICE_NAME`: nome do serviço nos traces
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: URL do coletor OTLP; sem ela, nada é exportado
//! - `OTEL_TRACES_SAMPLER_ARG`: taxa de sampling (0.0-1.0)

use std::str::FromStr;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::runtime::Tokio;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, Tracer, TracerProvider};
use opentelemetry_sdk::{trace as sdktrace, Resource};
use tracing::Level;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const SERVICE_NAME: &str = "apitester";

// ============================================================================
// CONFIGURAÇÃO
// ============================================================================

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Nome do serviço nos traces exportados.
    pub service_name: String,

    /// Endpoint OTLP (ex: "http://localhost:4317"). `None` = só stderr.
    pub otlp_endpoint: Option<String>,

    /// Taxa de sampling (0.0 a 1.0).
    pub sampling_ratio: f64,

    /// Nível usado quando `RUST_LOG` não está definido.
    pub log_level: Level,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME.to_string(),
            otlp_endpoint: None,
            sampling_ratio: 1.0,
            log_level: Level::WARN,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("OTEL_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Some(endpoint) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.otlp_endpoint = Some(endpoint);
            }
        }

        if let Some(ratio) = lookup("OTEL_TRACES_SAMPLER_ARG") {
            if let Ok(r) = ratio.parse::<f64>() {
                config.sampling_ratio = r.clamp(0.0, 1.0);
            }
        }

        config
    }

    /// Sobrescreve o nível padrão (`trace`, `debug`, `info`, `warn`, `error`).
    pub fn with_log_level(mut self, level: &str) -> anyhow::Result<Self> {
        self.log_level = Level::from_str(level)
            .map_err(|_| anyhow::anyhow!("invalid log level {:?}", level))?;
        Ok(self)
    }
}

// ============================================================================
// INICIALIZAÇÃO
// ============================================================================

/// Instala o subscriber global.
///
/// Retorna o tracer OTLP quando um endpoint foi configurado.
pub fn init_telemetry(config: TelemetryConfig) -> anyhow::Result<Option<Tracer>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(endpoint) = &config.otlp_endpoint {
        let tracer = init_otlp_tracer(&config.service_name, endpoint, config.sampling_ratio)?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(OpenTelemetryLayer::new(tracer.clone()))
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;

        tracing::info!(
            service_name = %config.service_name,
            endpoint = %endpoint,
            sampling_ratio = config.sampling_ratio,
            "OTLP telemetry initialized"
        );

        Ok(Some(tracer))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;

        tracing::debug!("Telemetry initialized (stderr only)");
        Ok(None)
    }
}

// ============================================================================
// TRACER OTLP
// ============================================================================

fn sampler_for(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn init_otlp_tracer(
    service_name: &str,
    endpoint: &str,
    sampling_ratio: f64,
) -> anyhow::Result<Tracer> {
    // Batch exporter: os spans são enviados em lotes pelo runtime Tokio.
    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint)
                .build_span_exporter()?,
            Tokio,
        )
        .with_config(
            sdktrace::Config::default()
                .with_sampler(sampler_for(sampling_ratio))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    service_name.to_string(),
                )])),
        )
        .build();

    let tracer = tracer_provider.tracer(service_name.to_string());
    global::set_tracer_provider(tracer_provider);

    Ok(tracer)
}

// ============================================================================
// ENCERRAMENTO
// ============================================================================

/// Faz o flush dos spans pendentes. Chamar antes de sair do processo.
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_otlp_installs_stderr_subscriber() {
        // Único teste que instala o subscriber global.
        let tracer = init_telemetry(TelemetryConfig::default()).unwrap();
        assert!(tracer.is_none());
        tracing::warn!("subscriber installed");
    }

    #[test]
    fn test_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "apitester");
        assert!(config.otlp_endpoint.is_none());
        assert_eq!(config.sampling_ratio, 1.0);
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn test_config_from_env() {
        let config = TelemetryConfig::from_lookup(|key| match key {
            "OTEL_EXPORTER_OTLP_ENDPOINT" => Some("http://collector:4317".to_string()),
            "OTEL_TRACES_SAMPLER_ARG" => Some("7".to_string()),
            _ => None,
        });

        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(config.sampling_ratio, 1.0);
        assert_eq!(config.service_name, "apitester");
    }

    #[test]
    fn test_blank_endpoint_disables_otlp() {
        let config = TelemetryConfig::from_lookup(|key| {
            (key == "OTEL_EXPORTER_OTLP_ENDPOINT").then(|| "  ".to_string())
        });
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_with_log_level() {
        let config = TelemetryConfig::default().with_log_level("debug").unwrap();
        assert_eq!(config.log_level, Level::DEBUG);

        assert!(TelemetryConfig::default().with_log_level("loud").is_err());
    }

    #[test]
    fn test_sampler_for() {
        assert!(matches!(sampler_for(1.0), Sampler::AlwaysOn));
        assert!(matches!(sampler_for(0.0), Sampler::AlwaysOff));
        assert!(matches!(sampler_for(0.5), Sampler::TraceIdRatioBased(_)));
    }
}
