//! Variable values and the text coercion rules.
//!
//! Operators type values as free text. Before a value is persisted upstream
//! it is converted by [`coerce`], applying these rules in order, first match
//! wins:
//!
//! 1. **Structured**: the trimmed text starts with `{` or `[` and parses as
//!    JSON. If parsing fails, rules 2 and 3 are skipped and the text is kept
//!    as a string.
//! 2. **Numeric**: the *entire* trimmed text is a decimal literal: optional
//!    sign, digits with an optional fraction, optional exponent. `123abc`,
//!    hex, `NaN` and `Infinity` are not numeric. Literals without fraction or
//!    exponent become integers when they fit, everything else becomes a
//!    float; a literal that overflows to infinity stays a string.
//! 3. **Boolean**: the trimmed text equals `true` or `false`, ignoring case.
//! 4. **String**: the original text, untrimmed.
//!
//! [`render`] is the inverse used to prefill edit forms: structured values
//! become indented JSON, everything else its natural string form. For every
//! value `v` produced by `coerce`, `coerce(&render(&v)) == v`.
//!
//! Empty text is rejected by callers before coercion; see
//! [`TypedValue::from_input`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("numeric literal pattern compiles")
});

// ─────────────────────────────────────────────────────────────────────────────
// TypedValue
// ─────────────────────────────────────────────────────────────────────────────

/// A variable value with its runtime type made explicit.
///
/// Serializes to the plain JSON value, so `{"value": 5}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

/// Why a client-supplied value cannot be stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("value is required")]
    Missing,
    #[error("value cannot be empty")]
    Empty,
}

impl TypedValue {
    /// Convert a value from a request body.
    ///
    /// Strings are free text and go through [`coerce`]; an exactly empty
    /// string is rejected. Values that already carry a JSON type pass
    /// through untouched. `null` counts as missing.
    pub fn from_input(input: Value) -> Result<Self, ValueError> {
        match input {
            Value::Null => Err(ValueError::Missing),
            Value::String(text) if text.is_empty() => Err(ValueError::Empty),
            Value::String(text) => Ok(coerce(&text)),
            Value::Bool(b) => Ok(TypedValue::Boolean(b)),
            Value::Number(n) => Ok(TypedValue::Number(n)),
            Value::Array(items) => Ok(TypedValue::Array(items)),
            Value::Object(map) => Ok(TypedValue::Object(map)),
        }
    }
}

impl From<TypedValue> for Value {
    fn from(v: TypedValue) -> Self {
        match v {
            TypedValue::Boolean(b) => Value::Bool(b),
            TypedValue::Number(n) => Value::Number(n),
            TypedValue::String(s) => Value::String(s),
            TypedValue::Array(items) => Value::Array(items),
            TypedValue::Object(map) => Value::Object(map),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variable
// ─────────────────────────────────────────────────────────────────────────────

/// A named entry of the shared key/value store.
///
/// Name uniqueness is enforced by the upstream store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: TypedValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: TypedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Coercion
// ─────────────────────────────────────────────────────────────────────────────

/// Convert free text into a typed value.
pub fn coerce(text: &str) -> TypedValue {
    let trimmed = text.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return coerce_structured(trimmed).unwrap_or_else(|| TypedValue::String(text.to_string()));
    }
    if let Some(n) = coerce_number(trimmed) {
        return TypedValue::Number(n);
    }
    if let Some(b) = coerce_bool(trimmed) {
        return TypedValue::Boolean(b);
    }
    TypedValue::String(text.to_string())
}

fn coerce_structured(trimmed: &str) -> Option<TypedValue> {
    match serde_json::from_str::<Value>(trimmed).ok()? {
        Value::Object(map) => Some(TypedValue::Object(map)),
        Value::Array(items) => Some(TypedValue::Array(items)),
        _ => None,
    }
}

fn coerce_number(trimmed: &str) -> Option<Number> {
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return None;
    }
    let integral = !trimmed.contains(['.', 'e', 'E']);
    if integral {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(Number::from(i));
        }
        if let Ok(u) = trimmed.trim_start_matches('+').parse::<u64>() {
            return Some(Number::from(u));
        }
    }
    // Non-finite floats have no JSON representation.
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

fn coerce_bool(trimmed: &str) -> Option<bool> {
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render a typed value as editable text.
pub fn render(value: &TypedValue) -> String {
    match value {
        TypedValue::Boolean(b) => b.to_string(),
        TypedValue::Number(n) => n.to_string(),
        TypedValue::String(s) => s.clone(),
        TypedValue::Array(items) => pretty(&Value::Array(items.clone())),
        TypedValue::Object(map) => pretty(&Value::Object(map.clone())),
    }
}

/// Render any stored JSON value as editable text.
///
/// Upstream values are not guaranteed to have come through [`coerce`], so
/// `null` is accepted here and renders as `null`.
pub fn render_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => pretty(value),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
