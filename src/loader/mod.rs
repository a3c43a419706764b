//! # Módulo de Carregamento - Leitura da Suíte de Testes
//!
//! Lê o arquivo JSON da suíte (`{"test_case": [...]}`) e devolve os test
//! cases já ordenados por `order`.
//!
//! ## Exemplo de uso:
//!
//! ```ignore
//! let cases = load_suite_from_file("./suites/users.json")?;
//! println!("{} test cases", cases.len());
//! ```
//!
//! Erros de leitura (E4001) e de formato (E1005) voltam como `anyhow::Error`
//! com o caminho do arquivo no contexto.

use crate::errors::ErrorCode;
use crate::protocol::{TestCase, TestSuite};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Carrega e ordena os test cases de um arquivo JSON.
///
/// A ordenação é estável: test cases com o mesmo `order` mantêm a ordem do
/// arquivo.
pub fn load_suite_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TestCase>> {
    let path_ref = path.as_ref();

    let content = fs::read_to_string(path_ref).with_context(|| {
        format!(
            "[{}] Failed to read suite file {:?}",
            ErrorCode::SUITE_FILE_UNREADABLE,
            path_ref
        )
    })?;

    let cases = parse_suite(&content).with_context(|| {
        format!(
            "[{}] Failed to parse suite JSON {:?}",
            ErrorCode::INVALID_SUITE_FORMAT,
            path_ref
        )
    })?;

    tracing::debug!(path = ?path_ref, count = cases.len(), "Suite loaded");
    Ok(cases)
}

/// Parseia o conteúdo da suíte e ordena por `order`.
pub fn parse_suite(content: &str) -> Result<Vec<TestCase>> {
    let suite: TestSuite = serde_json::from_str(content)?;
    let mut cases = suite.test_cases;
    cases.sort_by_key(|case| case.order);
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn suite_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sorts_by_order() {
        let content = json!({
            "test_case": [
                {"test_case_name": "Second", "order": 2, "api": "/b", "method": "GET"},
                {"test_case_name": "First", "order": 1, "api": "/a", "method": "POST",
                 "body": {"x": 1}, "extract": {"id": "data.id"}},
                {"test_case_name": "Also second", "order": 2, "api": "/c", "method": "GET"}
            ]
        })
        .to_string();
        let file = suite_file(&content);

        let cases = load_suite_from_file(file.path()).unwrap();

        let names: Vec<&str> = cases.iter().map(|c| c.test_case_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Also second"]);
        assert_eq!(cases[0].extract.get("id"), Some(&"data.id".to_string()));
        assert_eq!(cases[1].timeout, 0);
        assert!(cases[1].headers.is_empty());
    }

    #[test]
    fn test_missing_test_case_key_is_empty_suite() {
        assert!(parse_suite("{}").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_suite_from_file(dir.path().join("missing.json")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("E4001"));
        assert!(message.contains("Failed to read suite file"));
    }

    #[test]
    fn test_invalid_json() {
        let file = suite_file("{\"test_case\": [ {");
        let err = load_suite_from_file(file.path()).unwrap_err();

        assert!(err.to_string().contains("E1005"));
    }

    #[test]
    fn test_missing_required_field() {
        let content = r#"{"test_case": [{"test_case_name": "No api", "order": 1, "method": "GET"}]}"#;
        let err = parse_suite(content).unwrap_err();
        assert!(err.to_string().contains("api"));
    }
}
