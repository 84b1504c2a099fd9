//! ARFF document model

use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of an ARFF data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArffValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Missing,
}

/// One data row
pub type ArffRow = Vec<ArffValue>;

impl ArffValue {
    /// Numeric view of the value; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value; reals are accepted only when integral
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Text view of the value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<i64> for ArffValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for ArffValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for ArffValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for ArffValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArffValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ArffValue {
    fn from(value: bool) -> Self {
        Self::Text(if value { "true" } else { "false" }.to_string())
    }
}

impl fmt::Display for ArffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", super::writer::quote(s)),
            Self::Missing => write!(f, "?"),
        }
    }
}

/// Declared type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    Numeric,
    Integer,
    Real,
    String,
    Nominal(Vec<String>),
}

/// An `@attribute` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Nominal values, if the attribute is nominal
    pub fn nominal_values(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Nominal(values) => Some(values),
            _ => None,
        }
    }
}

/// A parsed or to-be-written ARFF document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArffDocument {
    pub relation: String,
    pub attributes: Vec<Attribute>,
    pub data: Vec<ArffRow>,
}

impl ArffDocument {
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            ..Default::default()
        }
    }

    /// Append an attribute declaration
    pub fn with_attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(Attribute::new(name, kind));
        self
    }

    /// Index of the attribute called `name` (case-sensitive)
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Index of the attribute called `name`, ignoring ASCII case
    pub fn attribute_index_ignore_case(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }
}
