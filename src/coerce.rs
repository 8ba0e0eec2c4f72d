//! Type coercion for decoded values
//!
//! Coercion converts decoded strings into booleans or numbers, either on
//! request (an explicit `key:type` annotation) or opportunistically (auto
//! mode). It runs after interpolation so that a placeholder which resolves to
//! a numeric literal still coerces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::EnvValue;

/// Declared type tag of a typed line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Identity cast: the decoded text stays a string
    String,
    /// `true`/`false` literals, case-insensitive
    Boolean,
    /// Floating-point numeric literal
    Number,
}

impl ValueKind {
    /// Returns the lowercase tag text as it appears in source lines
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type tag is not in the recognized set
#[derive(Debug, Clone, Error)]
#[error("unknown type tag '{0}'")]
pub struct UnknownValueKind(pub String);

impl FromStr for ValueKind {
    type Err = UnknownValueKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueKind::String),
            "boolean" => Ok(ValueKind::Boolean),
            "number" => Ok(ValueKind::Number),
            other => Err(UnknownValueKind(other.to_string())),
        }
    }
}

/// When coercion applies to untyped values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// Only explicitly annotated keys are coerced
    #[default]
    Explicit,
    /// Untyped values attempt boolean, then number coercion
    Auto,
}

/// Parses a case-insensitive `true`/`false` literal
///
/// Anything else is not an error, just a miss.
pub fn to_boolean(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parses the whole string as a floating-point literal
///
/// Word-like spellings (`inf`, `NaN`) are rejected: a tag of `number` on a
/// non-numeric value is a no-op, not a parse of special floats.
pub fn to_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Applies an explicit type tag to a decoded value
///
/// Values that do not match the tagged shape pass through unchanged.
pub fn coerce_typed(kind: ValueKind, value: &str) -> EnvValue {
    match kind {
        ValueKind::String => EnvValue::String(value.to_string()),
        ValueKind::Boolean => match to_boolean(value) {
            Some(flag) => EnvValue::Boolean(flag),
            None => EnvValue::String(value.to_string()),
        },
        ValueKind::Number => match to_number(value) {
            Some(number) => EnvValue::Number(number),
            None => EnvValue::String(value.to_string()),
        },
    }
}

/// Auto coercion: boolean first, then number, chained
pub fn coerce_auto(value: &str) -> EnvValue {
    if let Some(flag) = to_boolean(value) {
        return EnvValue::Boolean(flag);
    }
    if let Some(number) = to_number(value) {
        return EnvValue::Number(number);
    }
    EnvValue::String(value.to_string())
}

/// Coerces a decoded value according to the key's annotation and the mode
///
/// Splits a trailing `:type` suffix off the key if one is present, returning
/// the bare key together with the coerced value. Untyped keys are only
/// coerced in [`CoercionMode::Auto`].
pub fn coerce(key: &str, value: &str, mode: CoercionMode) -> (String, EnvValue) {
    if let Some((name, tag)) = key.split_once(':')
        && let Ok(kind) = tag.parse::<ValueKind>()
    {
        return (name.to_string(), coerce_typed(kind, value));
    }
    let coerced = match mode {
        CoercionMode::Explicit => EnvValue::String(value.to_string()),
        CoercionMode::Auto => coerce_auto(value),
    };
    (key.to_string(), coerced)
}
