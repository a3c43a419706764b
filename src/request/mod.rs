//! # Módulo de Montagem de Requests
//!
//! Transforma um [`TestCase`] + [`VariableStore`] em um [`PreparedRequest`]
//! pronto para o transporte HTTP.
//!
//! ## Ordem de montagem
//!
//! 1. URL: substitui variáveis no endpoint e concatena com a base URL
//! 2. Body: só para POST/PUT/PATCH com body declarado; substituição profunda
//!    e serialização JSON compacta
//! 3. Request: método, headers (valores substituídos) e query string
//!    (valores substituídos, URL-encoded, ordenada por chave)
//!
//! Falhas no passo 2 são `BodyPreparation`; no passo 3, `RequestConstruction`.
//! Nenhum header é adicionado implicitamente.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;

use crate::context::VariableStore;
use crate::errors::ExecutionError;
use crate::protocol::{HttpMethod, TestCase};

/// Request totalmente resolvido (sem placeholders).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    /// URL final, incluindo a query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

/// Endpoint com variáveis substituídas, prefixado pela base URL quando houver.
///
/// A base URL já chega sem a barra final (ver `RunnerConfig::with_base_url`).
pub fn build_url(case: &TestCase, base_url: &str, store: &VariableStore) -> String {
    let api = store.substitute(&case.api);
    if base_url.is_empty() {
        api
    } else {
        format!("{}{}", base_url, api)
    }
}

/// Headers com valores substituídos. Chaves não são alteradas.
pub fn build_headers(case: &TestCase, store: &VariableStore) -> BTreeMap<String, String> {
    store.substitute_map(&case.headers)
}

/// Query string URL-encoded (`a=1&b=x%20y`), ordenada por chave.
///
/// Retorna `None` quando o test case não declara params.
pub fn build_query(case: &TestCase, store: &VariableStore) -> Option<String> {
    if case.params.is_empty() {
        return None;
    }

    let query = store
        .substitute_map(&case.params)
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    Some(query)
}

/// Body serializado para POST/PUT/PATCH; `None` para os demais métodos ou
/// quando o test case não declara body.
pub fn build_body(
    case: &TestCase,
    method: HttpMethod,
    store: &VariableStore,
) -> Result<Option<Vec<u8>>, ExecutionError> {
    let Some(body) = case.body.as_ref() else {
        return Ok(None);
    };

    if !method.allows_body() {
        return Ok(None);
    }

    let resolved = store.substitute_deep(body);
    serde_json::to_vec(&resolved)
        .map(Some)
        .map_err(|e| ExecutionError::BodyPreparation(e.to_string()))
}

/// Timeout efetivo: o do test case, ou `default` quando não definido (0).
pub fn effective_timeout(case: &TestCase, default: Duration) -> Duration {
    if case.timeout == 0 {
        default
    } else {
        Duration::from_secs(case.timeout)
    }
}

/// Acrescenta a query antes de um eventual `#fragment`, com `?` ou `&`.
fn append_query(url: &str, query: &str) -> String {
    let (base, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}{}", base, separator, query, fragment)
}

/// Monta o request completo a partir da URL já resolvida.
pub fn build_request(
    case: &TestCase,
    url: &str,
    store: &VariableStore,
    default_timeout: Duration,
) -> Result<PreparedRequest, ExecutionError> {
    let method = HttpMethod::parse(&case.method).ok_or_else(|| {
        ExecutionError::RequestConstruction(format!("invalid method {:?}", case.method))
    })?;

    let body = build_body(case, method, store)?;

    let url = match build_query(case, store) {
        Some(query) => append_query(url, &query),
        None => url.to_string(),
    };

    Url::parse(&url)
        .map_err(|e| ExecutionError::RequestConstruction(format!("invalid URL {:?}: {}", url, e)))?;

    // Nomes de header não diferenciam maiúsculas: o último (em ordem de
    // chave) substitui os anteriores na mesma posição.
    let mut headers: Vec<(String, String)> = Vec::with_capacity(case.headers.len());
    for (key, value) in build_headers(case, store) {
        HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            ExecutionError::RequestConstruction(format!("invalid header name {:?}: {}", key, e))
        })?;
        HeaderValue::from_str(&value).map_err(|e| {
            ExecutionError::RequestConstruction(format!("invalid value for header {:?}: {}", key, e))
        })?;

        match headers.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(&key)) {
            Some(existing) => *existing = (key, value),
            None => headers.push((key, value)),
        }
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
        timeout: effective_timeout(case, default_timeout),
    })
}
