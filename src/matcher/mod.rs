//! # Módulo de Comparação de Respostas (Partial Match)
//!
//! Compara recursivamente uma estrutura "esperada" (parcial) com a resposta
//! real e devolve a lista de divergências. Lista vazia = resposta aceita.
//!
//! ## Regras
//!
//! A comparação é guiada pelo formato do **esperado**:
//!
//! - **Objeto**: a resposta precisa ser objeto; cada chave esperada precisa
//!   existir e é comparada recursivamente. Chaves extras na resposta são
//!   ignoradas.
//! - **Array**: a resposta precisa ser array; cada índice esperado precisa
//!   existir e é comparado recursivamente. Elementos extras são ignorados.
//! - **Escalar**: os dois lados são convertidos para texto e comparados.
//!   Assim `1000` no arquivo casa com `"1000"` na resposta, e `1.0` casa com `1`.
//!
//! ## Exemplo:
//!
//! ```text
//! esperado: {"status": "1000", "data": {"items": [{"id": 1}]}}
//! resposta: {"status": "4000", "data": {"items": []}, "extra": true}
//!
//! divergências:
//!   status: Expected '1000', got '4000'
//!   data.items[0]: Index out of range
//! ```

use serde_json::Value;

use crate::context::stringify;

/// Nome do tipo JSON usado nas mensagens de divergência.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compara `expected` com `actual` a partir de `path` (use `""` na raiz).
pub fn validate(expected: &Value, actual: &Value, path: &str) -> Vec<String> {
    let mut errors = Vec::new();
    compare(expected, actual, path, &mut errors);
    errors
}

fn compare(expected: &Value, actual: &Value, path: &str, errors: &mut Vec<String>) {
    match expected {
        Value::Object(expected_map) => {
            let Value::Object(actual_map) = actual else {
                errors.push(format!("{}: Expected object, got {}", path, kind_of(actual)));
                return;
            };

            for (key, expected_value) in expected_map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };

                match actual_map.get(key) {
                    Some(actual_value) => compare(expected_value, actual_value, &child, errors),
                    None => errors.push(format!("{}: Key not found in response", child)),
                }
            }
        }
        Value::Array(expected_items) => {
            let Value::Array(actual_items) = actual else {
                errors.push(format!("{}: Expected array, got {}", path, kind_of(actual)));
                return;
            };

            for (index, expected_item) in expected_items.iter().enumerate() {
                let child = format!("{}[{}]", path, index);

                match actual_items.get(index) {
                    Some(actual_item) => compare(expected_item, actual_item, &child, errors),
                    None => errors.push(format!("{}: Index out of range", child)),
                }
            }
        }
        _ => {
            let expected_text = stringify(expected);
            let actual_text = stringify(actual);
            if expected_text != actual_text {
                errors.push(format!(
                    "{}: Expected '{}', got '{}'",
                    path, expected_text, actual_text
                ));
            }
        }
    }
}

// ============================================================================
// TESTES
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_keys_are_ignored() {
        let errors = validate(
            &json!({"status": "1000"}),
            &json!({"status": "1000", "extra": "x"}),
            "",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_single_scalar_mismatch() {
        let errors = validate(&json!({"status": "1000"}), &json!({"status": "4000"}), "");
        assert_eq!(errors, vec!["status: Expected '1000', got '4000'".to_string()]);
    }

    #[test]
    fn test_number_matches_numeric_string() {
        let errors = validate(&json!({"status": 1000}), &json!({"status": "1000"}), "");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_float_with_zero_fraction_matches_integer() {
        assert!(validate(&json!({"v": 1.0}), &json!({"v": 1}), "").is_empty());
        assert_eq!(validate(&json!({"v": 1.5}), &json!({"v": 1}), "").len(), 1);
    }

    #[test]
    fn test_missing_key_uses_dotted_path() {
        let errors = validate(
            &json!({"data": {"user": {"id": 1}}}),
            &json!({"data": {"user": {}}}),
            "",
        );
        assert_eq!(errors, vec!["data.user.id: Key not found in response".to_string()]);
    }

    #[test]
    fn test_object_expected_but_scalar_received() {
        let errors = validate(&json!({"data": {"id": 1}}), &json!({"data": "nope"}), "");
        assert_eq!(errors, vec!["data: Expected object, got string".to_string()]);
    }

    #[test]
    fn test_object_expected_for_raw_body() {
        let errors = validate(&json!({"status": "ok"}), &json!("Internal Server Error"), "");
        assert_eq!(errors, vec![": Expected object, got string".to_string()]);
    }

    #[test]
    fn test_array_index_paths() {
        let errors = validate(
            &json!({"items": [{"id": 1}, {"id": 2}, {"id": 3}]}),
            &json!({"items": [{"id": 1}, {"id": 5}]}),
            "",
        );
        assert_eq!(
            errors,
            vec![
                "items[1].id: Expected '2', got '5'".to_string(),
                "items[2]: Index out of range".to_string(),
            ]
        );
    }

    #[test]
    fn test_array_expected_but_object_received() {
        let errors = validate(&json!({"items": [1]}), &json!({"items": {"0": 1}}), "");
        assert_eq!(errors, vec!["items: Expected array, got object".to_string()]);
    }

    #[test]
    fn test_extra_array_elements_are_ignored() {
        assert!(validate(&json!([1, 2]), &json!([1, 2, 3]), "").is_empty());
    }

    #[test]
    fn test_root_array_path() {
        let errors = validate(&json!([1, 2]), &json!([1, 3]), "");
        assert_eq!(errors, vec!["[1]: Expected '2', got '3'".to_string()]);
    }

    #[test]
    fn test_collects_every_discrepancy() {
        let errors = validate(
            &json!({"a": 1, "b": true, "c": null, "d": "x"}),
            &json!({"a": 2, "b": "true", "c": "null"}),
            "",
        );
        // `b` e `c` casam pela forma textual; `a` difere; `d` não existe.
        assert_eq!(
            errors,
            vec![
                "a: Expected '1', got '2'".to_string(),
                "d: Key not found in response".to_string(),
            ]
        );
    }

    #[test]
    fn test_custom_base_path() {
        let errors = validate(&json!({"id": 1}), &json!({"id": 2}), "body");
        assert_eq!(errors, vec!["body.id: Expected '1', got '2'".to_string()]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(kind_of(&json!(null)), "null");
        assert_eq!(kind_of(&json!(false)), "boolean");
        assert_eq!(kind_of(&json!(1)), "number");
        assert_eq!(kind_of(&json!([])), "array");
    }
}
