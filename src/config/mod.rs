//! # Módulo de Configuração da Execução
//!
//! Parâmetros que valem para a execução inteira (não por test case).
//!
//! ## Precedência
//!
//! | Fonte                  | Exemplo                                |
//! |------------------------|----------------------------------------|
//! | Padrão                 | sem base URL, não para, timeout 30s    |
//! | Variáveis de ambiente  | `APITESTER_BASE_URL=https://api.dev`   |
//! | Flags da CLI           | `--base-url https://api.local`         |
//!
//! Cada camada só sobrescreve o que define.

use std::time::Duration;

use crate::protocol::DEFAULT_TIMEOUT_SECS;

pub const ENV_BASE_URL: &str = "APITESTER_BASE_URL";
pub const ENV_STOP_ON_FAILURE: &str = "APITESTER_STOP_ON_FAILURE";
pub const ENV_DEFAULT_TIMEOUT: &str = "APITESTER_DEFAULT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Prefixo dos endpoints, sem barra final. Vazio = endpoints absolutos.
    pub base_url: String,
    pub stop_on_failure: bool,
    /// Timeout para test cases sem `timeout` próprio.
    pub default_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            stop_on_failure: false,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RunnerConfig {
    /// Padrões sobrescritos pelas variáveis de ambiente.
    ///
    /// Valores que não parseiam são ignorados.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(val);
        }

        if let Some(val) = lookup(ENV_STOP_ON_FAILURE) {
            if let Some(flag) = parse_flag(&val) {
                config.stop_on_failure = flag;
            }
        }

        if let Some(val) = lookup(ENV_DEFAULT_TIMEOUT) {
            if let Ok(secs) = val.trim().parse::<u64>() {
                if secs > 0 {
                    config.default_timeout = Duration::from_secs(secs);
                }
            }
        }

        config
    }

    /// Define a base URL removendo uma barra final, se houver.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
