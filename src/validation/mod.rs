//! # Módulo de Validação da Suíte
//!
//! Valida os test cases antes da execução. Um erro aqui é de configuração:
//! nenhum request é enviado.
//!
//! ## Validações realizadas:
//!
//! 1. **Nome**: `test_case_name` não pode ser vazio
//! 2. **Método**: GET, POST, PUT, DELETE ou PATCH (case-insensitive)
//! 3. **Status esperado**: quando declarado, entre 100 e 599
//! 4. **Extrações**: nome da variável e path não podem ser vazios
//!
//! Todos os erros são coletados de uma vez (não para no primeiro).
//!
//! ## Exemplo de uso:
//!
//! ```ignore
//! match validate_suite(&cases) {
//!     Ok(()) => run(cases),
//!     Err(errors) => {
//!         for err in errors {
//!             eprintln!("[{}] {}", err.code(), err);
//!         }
//!     }
//! }
//! ```

use thiserror::Error;

use crate::errors::ErrorCode;
use crate::protocol::{HttpMethod, TestCase};

// ============================================================================
// TIPOS DE ERRO
// ============================================================================

/// Problema de configuração em um test case.
///
/// Os test cases são identificados por `order` porque o nome pode ser
/// justamente o que está errado.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Test case #{order}: HTTP method '{method}' is not supported (GET, POST, PUT, DELETE, PATCH)")]
    InvalidHttpMethod { order: i64, method: String },

    #[error("Test case #{order}: test_case_name is empty")]
    EmptyTestName { order: i64 },

    #[error("Test case #{order}: expected_status_code {status} is outside 100-599")]
    InvalidExpectedStatus { order: i64, status: u16 },

    #[error("Test case #{order}: extraction '{variable}' -> '{path}' needs both a variable name and a path")]
    InvalidExtraction {
        order: i64,
        variable: String,
        path: String,
    },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidHttpMethod { .. } => ErrorCode::INVALID_HTTP_METHOD,
            ValidationError::EmptyTestName { .. } => ErrorCode::EMPTY_TEST_NAME,
            ValidationError::InvalidExpectedStatus { .. } => ErrorCode::INVALID_EXPECTED_STATUS,
            ValidationError::InvalidExtraction { .. } => ErrorCode::INVALID_EXTRACTION,
        }
    }
}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// VALIDAÇÃO
// ============================================================================

/// Valida todos os test cases, acumulando os erros.
///
/// Uma suíte vazia é válida (a execução só reporta 0 testes).
pub fn validate_suite(cases: &[TestCase]) -> ValidationResult {
    let mut errors = Vec::new();

    for case in cases {
        validate_case(case, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_case(case: &TestCase, errors: &mut Vec<ValidationError>) {
    let order = case.order;

    if case.test_case_name.trim().is_empty() {
        errors.push(ValidationError::EmptyTestName { order });
    }

    if HttpMethod::parse(&case.method).is_none() {
        errors.push(ValidationError::InvalidHttpMethod {
            order,
            method: case.method.clone(),
        });
    }

    // 0 equivale a "não declarado" (ver TestCase::expected_status)
    if let Some(status) = case.expected_status() {
        if !(100..=599).contains(&status) {
            errors.push(ValidationError::InvalidExpectedStatus { order, status });
        }
    }

    for (variable, path) in &case.extract {
        if variable.trim().is_empty() || path.trim().is_empty() {
            errors.push(ValidationError::InvalidExtraction {
                order,
                variable: variable.clone(),
                path: path.clone(),
            });
        }
    }
}

// ============================================================================
// TESTES
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_case(order: i64, name: &str, method: &str) -> TestCase {
        TestCase {
            test_case_name: name.to_string(),
            order,
            api: "/health".to_string(),
            method: method.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_suite() {
        let mut login = create_case(1, "Login", "post");
        login.expected_status_code = Some(200);
        login
            .extract
            .insert("token".to_string(), "data.token".to_string());

        let result = validate_suite(&[login, create_case(2, "Profile", "GET")]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_suite_is_valid() {
        assert!(validate_suite(&[]).is_ok());
    }

    #[test]
    fn test_invalid_http_method() {
        let result = validate_suite(&[create_case(3, "Trace", "TRACE")]);

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ValidationError::InvalidHttpMethod {
                order: 3,
                method: "TRACE".to_string()
            }
        );
        assert_eq!(errors[0].code(), ErrorCode::INVALID_HTTP_METHOD);
    }

    #[test]
    fn test_empty_name() {
        let errors = validate_suite(&[create_case(1, "   ", "GET")]).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EmptyTestName { order: 1 }));
    }

    #[test]
    fn test_expected_status_range() {
        let mut low = create_case(1, "Low", "GET");
        low.expected_status_code = Some(99);
        let mut high = create_case(2, "High", "GET");
        high.expected_status_code = Some(600);
        let mut unset = create_case(3, "Unset", "GET");
        unset.expected_status_code = Some(0);

        let errors = validate_suite(&[low, high, unset]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.code() == ErrorCode::INVALID_EXPECTED_STATUS));
    }

    #[test]
    fn test_invalid_extraction() {
        let mut case = create_case(4, "Extract", "GET");
        case.extract.insert("".to_string(), "data.id".to_string());
        case.extract.insert("id".to_string(), " ".to_string());

        let errors = validate_suite(&[case]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("needs both a variable name and a path"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut case = create_case(5, "", "FETCH");
        case.expected_status_code = Some(1000);

        let errors = validate_suite(&[case, create_case(6, "ok", "GET")]).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].to_string().starts_with("Test case #5"));
    }
}
