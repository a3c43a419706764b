// Module: Context
// Holds the variables extracted during a run and performs {{name}} substitution.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}]*)\}\}").expect("valid placeholder regex")
});

/// Named values captured from earlier responses.
///
/// Empty at run start and only ever grows. The orchestrator owns it and lends
/// it to each test case in turn, so no synchronization is needed.
#[derive(Debug, Default, Clone)]
pub struct VariableStore {
    variables: HashMap<String, Value>,
}

impl VariableStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or overwrites a variable.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replaces every `{{name}}` with the stringified value of `name`.
    ///
    /// Unknown names are left untouched. Inserted values are not scanned again,
    /// so the output depends only on the input and the current store.
    pub fn substitute(&self, input: &str) -> String {
        if self.is_empty() || !input.contains("{{") {
            return input.to_string();
        }

        PLACEHOLDER_RE
            .replace_all(input, |caps: &Captures| match self.get(&caps[1]) {
                Some(value) => stringify(value),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Substitutes every value of a string map. Keys are kept as-is.
    pub fn substitute_map(&self, input: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        input
            .iter()
            .map(|(key, value)| (key.clone(), self.substitute(value)))
            .collect()
    }

    /// Recursively substitutes strings inside a JSON tree.
    pub fn substitute_deep(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.substitute(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.substitute_deep(item)).collect())
            }
            Value::Object(map) => {
                let mut new_map = Map::with_capacity(map.len());
                for (k, v) in map {
                    new_map.insert(k.clone(), self.substitute_deep(v));
                }
                Value::Object(new_map)
            }
            _ => value.clone(),
        }
    }
}

/// Canonical text form of a JSON value.
///
/// Used both for substitution and for the loose scalar comparison of the
/// response matcher: strings are raw, numbers drop a zero fraction (`1.0` and
/// `1` both become `1`), everything else is compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| n.to_string())
            }
        }
        other => other.to_string(),
    }
}
