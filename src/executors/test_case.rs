//! # Executor de Test Case
//!
//! Conduz um único test case do início ao fim:
//!
//! ```text
//! PENDING ──► URL ──► body ──► request ──► envio ──► leitura ──► parse
//!    │          (erros de preparação/envio/leitura → FAILED)        │
//!    │                                                            ▼
//!    └──────────────── PASSED / FAILED ◄── validação ◄── extração
//! ```
//!
//! Uma única tentativa por test case. Erros de execução ficam isolados no
//! resultado do próprio test case; a execução segue para o próximo.

use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::HttpTransport;
use crate::context::VariableStore;
use crate::errors::{ErrorCode, ExecutionError};
use crate::extractors::Extractor;
use crate::matcher;
use crate::protocol::{TestCase, TestResult, TestStatus, DEFAULT_TIMEOUT_SECS};
use crate::request::{build_request, build_url};
use crate::runner::RunObserver;

/// Executa test cases contra um [`HttpTransport`].
pub struct TestExecutor {
    transport: Box<dyn HttpTransport>,
    base_url: String,
    default_timeout: Duration,
}

impl TestExecutor {
    /// `base_url` deve chegar sem barra final.
    pub fn new(transport: Box<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Timeout usado quando o test case não define um.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executa um test case, atualizando o store com as extrações.
    #[tracing::instrument(
        name = "test_case",
        skip_all,
        fields(order = case.order, name = %case.test_case_name)
    )]
    pub async fn execute(
        &self,
        case: &TestCase,
        store: &mut VariableStore,
        observer: &mut dyn RunObserver,
    ) -> TestResult {
        let mut result = TestResult::pending(case);
        result.url = build_url(case, &self.base_url, store);
        observer.on_test_start(&result);

        // 1. Preparação (body + request)
        let request = match build_request(case, &result.url, store, self.default_timeout) {
            Ok(request) => request,
            Err(e) => return Self::fail(result, e, observer),
        };

        // 2. Envio
        let start = Instant::now();
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                result.response_time_ms = millis(start.elapsed());
                return Self::fail(result, e, observer);
            }
        };

        result.response_time_ms = millis(response.elapsed);
        result.response_status_code = response.status;
        info!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            duration_ms = result.response_time_ms,
            "HTTP request finished"
        );

        // 3. Leitura + parse (body não-JSON vira string)
        let bytes = match response.body {
            Ok(bytes) => bytes,
            Err(e) => return Self::fail(result, e, observer),
        };
        result.response_body = parse_body(&bytes);

        // 4. Extração
        let (extractions, values) = Extractor::process(&case.extract, &result.response_body);
        for miss in extractions.iter().filter(|r| !r.found()) {
            debug!(target_var = %miss.target, path = %miss.path, "Extraction path not found");
        }
        for (name, value) in values {
            observer.on_extracted(&name, &value);
            store.set(name, value);
        }

        // 5. Validação
        if let Some(expected) = case.expected_status() {
            if expected != response.status {
                warn!(code = %ErrorCode::STATUS_MISMATCH, expected, actual = response.status, "Status mismatch");
                result.errors.push(format!(
                    "HTTP Status: Expected {}, got {}",
                    expected, response.status
                ));
            }
        }

        if let Some(expected) = &case.expected_response {
            let discrepancies = matcher::validate(expected, &result.response_body, "");
            if !discrepancies.is_empty() {
                warn!(code = %ErrorCode::BODY_MISMATCH, count = discrepancies.len(), "Response body mismatch");
            }
            result.errors.extend(discrepancies);
        }

        result.status = if result.errors.is_empty() {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };

        observer.on_test_finished(&result, None);
        result
    }

    fn fail(mut result: TestResult, error: ExecutionError, observer: &mut dyn RunObserver) -> TestResult {
        let code = error.code();
        warn!(
            code = %code,
            category = %code.category(),
            description = code.description(),
            error = %error,
            "Test case aborted"
        );
        result.status = TestStatus::Failed;
        result.errors.push(error.to_string());
        observer.on_test_finished(&result, Some(&error));
        result
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_millis() as f64
}

/// JSON quando possível; caso contrário o body bruto como string.
fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ============================================================================
// TESTES
// ============================================================================
