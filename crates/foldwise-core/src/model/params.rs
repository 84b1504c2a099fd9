//! Hyperparameter values

use crate::error::{FoldwiseError, FoldwiseResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    None,
}

/// Named hyperparameters, ordered by name
pub type ParamMap = BTreeMap<String, ParamValue>;

impl ParamValue {
    /// Numeric view; `Int` widens
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Literal form used in error messages, e.g. `'abc'` or `1.5`
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }

    /// JSON encoding used in flow descriptions and trace rows
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }

    /// Parse a command-line style literal: bool, int, float, `none`, else string
    pub fn parse_literal(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "none" | "null" => return Self::None,
            _ => {}
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Self::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Self::Float(v);
        }
        Self::Str(trimmed.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{}", v),
            Self::None => write!(f, "None"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Reject a parameter name the estimator does not know
pub(crate) fn unknown_param(estimator: &str, name: &str) -> FoldwiseError {
    FoldwiseError::invalid_configuration(
        name,
        format!("Invalid parameter {} for estimator {}", name, estimator),
    )
}

/// Split `step__param` into (`step`, `param`)
pub(crate) fn split_nested(name: &str) -> Option<(&str, &str)> {
    name.split_once("__")
}

/// Read a parameter as a positive float, echoing the value back on failure
pub(crate) fn positive_float(
    value: &ParamValue,
    parameter: &str,
    message: &str,
) -> FoldwiseResult<f64> {
    match value.as_f64() {
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        _ => Err(FoldwiseError::invalid_configuration(
            parameter,
            format!("{}; got ({}={})", message, parameter, value.repr()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(ParamValue::from("abc").repr(), "'abc'");
        assert_eq!(ParamValue::Float(0.5).repr(), "0.5");
        assert_eq!(ParamValue::None.repr(), "None");
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(ParamValue::parse_literal("3"), ParamValue::Int(3));
        assert_eq!(ParamValue::parse_literal("0.1"), ParamValue::Float(0.1));
        assert_eq!(ParamValue::parse_literal("True"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse_literal("none"), ParamValue::None);
        assert_eq!(ParamValue::parse_literal("gini"), ParamValue::from("gini"));
    }

    #[test]
    fn test_positive_float_message() {
        let err = positive_float(&ParamValue::from("abc"), "C", "Penalty term must be positive")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Penalty term must be positive; got (C='abc')"
        );
    }

    #[test]
    fn test_json_encoding() {
        assert_eq!(ParamValue::Int(2).to_json(), "2");
        assert_eq!(ParamValue::from("l2").to_json(), "\"l2\"");
        assert_eq!(ParamValue::None.to_json(), "null");
    }

    #[test]
    fn test_split_nested() {
        assert_eq!(split_nested("clf__C"), Some(("clf", "C")));
        assert_eq!(split_nested("C"), None);
    }
}
