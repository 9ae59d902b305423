use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// A converted parameter value.
///
/// `Null` marks a parameter that was absent with no default. It is distinct
/// from `String("null")`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an integer or number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            ParamValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

/// Renders the value in the form it would be accepted as raw input again.
/// `Null` renders as the empty string.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => Ok(()),
            ParamValue::String(s) => f.write_str(s),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Boolean(b) => write!(f, "{b}"),
            ParamValue::Date(d) => f.write_str(&d.to_rfc2822()),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Null => serializer.serialize_none(),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Integer(i) => serializer.serialize_i64(*i),
            ParamValue::Number(n) => serializer.serialize_f64(*n),
            ParamValue::Boolean(b) => serializer.serialize_bool(*b),
            ParamValue::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
        }
    }
}
