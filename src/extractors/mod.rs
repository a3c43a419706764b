//! # Módulo de Extração - Captura de Dados das Respostas HTTP
//!
//! Implementa a extração de valores do body das respostas para popular o
//! [`VariableStore`](crate::context::VariableStore), permitindo encadear
//! test cases.
//!
//! ## Exemplo de Fluxo:
//!
//! ```text
//! Test 1: POST /login
//! Resposta: { "data": { "access_token": "abc123" } }
//! Extração: "token": "data.access_token"
//! Resultado: store.set("token", "abc123")
//!
//! Test 2: GET /profile
//! Header: Authorization: Bearer {{token}}
//! Substituído: Authorization: Bearer abc123
//! ```
//!
//! ## Sintaxe do path
//!
//! Segmentos separados por ponto. Em objetos o segmento é a chave; em
//! arrays é um índice inteiro não negativo:
//!
//! | Path            | Body                              | Resultado |
//! |-----------------|-----------------------------------|-----------|
//! | `data.id`       | `{"data": {"id": 123}}`           | `123`     |
//! | `items.1.name`  | `{"items": [{}, {"name": "b"}]}`  | `"b"`     |
//! | `1`             | `[10, 20, 30]`                    | `20`      |
//! | `data.missing`  | `{"data": {"id": 123}}`           | não achou |
//!
//! Extração é best-effort: um path que não resolve nunca falha o teste,
//! apenas não atribui a variável.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// NAVEGAÇÃO
// ============================================================================

/// Resolve um path em notação de ponto dentro de `root`.
///
/// Retorna `None` (sentinela "não encontrado") quando uma chave não existe,
/// quando um segmento não é índice válido para um array, quando o índice
/// está fora dos limites ou quando o caminho atravessa um escalar.
pub fn extract<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;

    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }

    Some(current)
}

// ============================================================================
// ESTRUTURAS DE RESULTADO
// ============================================================================

/// Resultado de uma extração declarada em um test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    /// Nome da variável de destino.
    pub target: String,

    /// Path usado.
    pub path: String,

    /// Valor extraído, se encontrado.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ExtractionResult {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

// ============================================================================
// EXTRATOR PRINCIPAL
// ============================================================================

/// Motor de extração.
pub struct Extractor;

impl Extractor {
    /// Processa todas as extrações de um test case.
    ///
    /// ## Retorno:
    /// - Um resultado por extração declarada (na ordem dos nomes de variável)
    /// - Os valores encontrados, prontos para o store
    ///
    /// Um path que resolve para `null` conta como não encontrado.
    pub fn process(
        extractions: &BTreeMap<String, String>,
        body: &Value,
    ) -> (Vec<ExtractionResult>, Vec<(String, Value)>) {
        let mut results = Vec::with_capacity(extractions.len());
        let mut values = Vec::new();

        for (target, path) in extractions {
            let value = extract(body, path).filter(|v| !v.is_null()).cloned();

            if let Some(ref found) = value {
                values.push((target.clone(), found.clone()));
            }

            results.push(ExtractionResult {
                target: target.clone(),
                path: path.clone(),
                value,
            });
        }

        (results, values)
    }
}

// ============================================================================
// TESTES
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ------------------------------------------------------------------------
    // Navegação
    // ------------------------------------------------------------------------

    #[test]
    fn test_extract_nested_field() {
        let body = json!({"data": {"id": 123}});
        assert_eq!(extract(&body, "data.id"), Some(&json!(123)));
    }

    #[test]
    fn test_extract_missing_field() {
        let body = json!({"data": {"id": 123}});
        assert_eq!(extract(&body, "data.missing"), None);
    }

    #[test]
    fn test_extract_array_index() {
        let body = json!([10, 20, 30]);
        assert_eq!(extract(&body, "1"), Some(&json!(20)));
        assert_eq!(extract(&body, "5"), None);
    }

    #[test]
    fn test_extract_invalid_index() {
        let body = json!([10, 20, 30]);
        assert_eq!(extract(&body, "-1"), None);
        assert_eq!(extract(&body, "first"), None);
    }

    #[test]
    fn test_extract_through_array_of_objects() {
        let body = json!({"users": [{"id": 1}, {"id": 2, "name": "Bia"}]});
        assert_eq!(extract(&body, "users.1.name"), Some(&json!("Bia")));
        assert_eq!(extract(&body, "users.0.name"), None);
    }

    #[test]
    fn test_extract_through_scalar() {
        let body = json!({"token": "abc"});
        assert_eq!(extract(&body, "token.value"), None);

        let raw = json!("plain text body");
        assert_eq!(extract(&raw, "data"), None);
    }

    #[test]
    fn test_extract_whole_subtree() {
        let body = json!({"data": {"user": {"id": 42, "roles": ["admin"]}}});
        assert_eq!(
            extract(&body, "data.user"),
            Some(&json!({"id": 42, "roles": ["admin"]}))
        );
    }

    #[test]
    fn test_extract_empty_segment_is_a_key() {
        let body = json!({"": {"x": 1}});
        assert_eq!(extract(&body, ".x"), Some(&json!(1)));
    }

    // ------------------------------------------------------------------------
    // Extractor::process
    // ------------------------------------------------------------------------

    #[test]
    fn test_process_collects_found_values_only() {
        let body = json!({
            "data": {
                "access_token": "eyJhbGciOiJIUzI1NiJ9.test",
                "user": { "id": 42 }
            }
        });

        let mut extractions = BTreeMap::new();
        extractions.insert("token".to_string(), "data.access_token".to_string());
        extractions.insert("user_id".to_string(), "data.user.id".to_string());
        extractions.insert("missing".to_string(), "data.refresh_token".to_string());

        let (results, values) = Extractor::process(&extractions, &body);

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.found()).count(), 2);
        assert_eq!(
            values,
            vec![
                ("token".to_string(), json!("eyJhbGciOiJIUzI1NiJ9.test")),
                ("user_id".to_string(), json!(42)),
            ]
        );
    }

    #[test]
    fn test_process_treats_null_as_not_found() {
        let body = json!({"token": null});
        let mut extractions = BTreeMap::new();
        extractions.insert("token".to_string(), "token".to_string());

        let (results, values) = Extractor::process(&extractions, &body);

        assert!(!results[0].found());
        assert!(values.is_empty());
    }

    #[test]
    fn test_process_against_raw_string_body() {
        let body = json!("<html>oops</html>");
        let mut extractions = BTreeMap::new();
        extractions.insert("id".to_string(), "data.id".to_string());

        let (results, values) = Extractor::process(&extractions, &body);

        assert_eq!(results.len(), 1);
        assert!(values.is_empty());
    }
}
