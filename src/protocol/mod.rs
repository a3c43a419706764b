//! # Modelo de Dados - Test Cases, Resultados e Relatório
//!
//! Estruturas compartilhadas por todo o runner. O formato em disco é um
//! documento JSON com a lista `test_case`:
//!
//! ```json
//! {
//!   "test_case": [
//!     {
//!       "test_case_name": "Login",
//!       "order": 1,
//!       "api": "/auth/login",
//!       "method": "POST",
//!       "headers": { "Content-Type": "application/json" },
//!       "body": { "user": "admin", "password": "secret" },
//!       "expected_status_code": 200,
//!       "expected_response": { "status": "1000" },
//!       "extract": { "token": "data.access_token" }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Timeout aplicado quando o test case não define `timeout` (ou define 0).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Documento carregado do disco.
#[derive(Debug, Deserialize, Serialize)]
pub struct TestSuite {
    #[serde(rename = "test_case", default)]
    pub test_cases: Vec<TestCase>,
}

/// Uma unidade declarativa de requisição + expectativas.
///
/// Imutável depois de carregada. Os mapas usam `BTreeMap` para que a ordem de
/// headers, params e extrações seja estável entre execuções.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TestCase {
    pub test_case_name: String,
    pub order: i64,
    /// Endpoint relativo à base URL (ou URL completa quando não há base).
    pub api: String,
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Timeout em segundos. 0 significa "usar o padrão".
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub expected_status_code: Option<u16>,
    #[serde(default)]
    pub expected_response: Option<Value>,
    /// Nome da variável → caminho em notação de ponto.
    #[serde(default)]
    pub extract: BTreeMap<String, String>,
}

impl TestCase {
    /// Status esperado, tratando `0` como "não declarado".
    pub fn expected_status(&self) -> Option<u16> {
        self.expected_status_code.filter(|code| *code != 0)
    }
}

/// Métodos HTTP aceitos nos test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Interpreta o método sem diferenciar maiúsculas/minúsculas.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Apenas POST, PUT e PATCH enviam body.
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pending,
    Passed,
    Failed,
}

/// Resultado de um test case executado.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TestResult {
    pub test_case_name: String,
    pub order: i64,
    pub method: String,
    /// URL resolvida (sem query string).
    pub url: String,
    pub status: TestStatus,
    pub errors: Vec<String>,
    pub response_time_ms: f64,
    pub response_status_code: u16,
    pub response_body: Value,
}

impl TestResult {
    /// Resultado inicial, ainda PENDING.
    pub fn pending(case: &TestCase) -> Self {
        Self {
            test_case_name: case.test_case_name.clone(),
            order: case.order,
            method: case.method.trim().to_uppercase(),
            url: String::new(),
            status: TestStatus::Pending,
            errors: Vec::new(),
            response_time_ms: 0.0,
            response_status_code: 0,
            response_body: Value::Null,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    pub fn failed(&self) -> bool {
        self.status == TestStatus::Failed
    }
}

/// Estatísticas derivadas da sequência de resultados.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pass_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avg_response_time_ms: Option<f64>,
}

/// Relatório final exportado em JSON.
#[derive(Debug, Deserialize, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub config_file: String,
    pub base_url: String,
    pub summary: Summary,
    pub results: Vec<TestResult>,
}
