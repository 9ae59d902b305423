use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::scalar::Scalar;

/// Named parameter specifications, in declaration order.
pub type ParamSpecs = IndexMap<String, ParamSpec>;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Date => "date",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `minimum`/`maximum` bound, kept as an integer when written as one so
/// integer parameters compare exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Integer(i64),
    Number(f64),
}

impl Bound {
    pub fn as_f64(self) -> f64 {
        match self {
            Bound::Integer(i) => i as f64,
            Bound::Number(n) => n,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(i) => write!(f, "{i}"),
            Bound::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Type and constraints of one named parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    #[serde(rename = "type", default)]
    pub param_type: ParamType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Scalar>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Bound>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Bound>,

    #[serde(skip)]
    compiled_pattern: OnceLock<Result<Regex, regex::Error>>,
}

impl ParamSpec {
    pub fn new(param_type: ParamType) -> Self {
        Self {
            param_type,
            ..Self::default()
        }
    }

    /// Whether `value` is one of the declared `enum` members.
    pub fn enum_contains(&self, value: &str) -> bool {
        self.enum_values
            .as_ref()
            .is_some_and(|values| values.iter().any(|v| v.as_str() == value))
    }

    /// The compiled `pattern`, built on first use and cached on this
    /// parameter. `None` when no pattern is declared.
    pub fn compiled_pattern(&self) -> Option<Result<&Regex, &regex::Error>> {
        let pattern = self.pattern.as_deref()?;
        Some(
            self.compiled_pattern
                .get_or_init(|| Regex::new(pattern))
                .as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_spec_defaults() {
        let spec: ParamSpec = serde_yaml_ng::from_str("description: free text\n").unwrap();
        assert_eq!(spec.param_type, ParamType::String);
        assert!(!spec.required);
        assert!(spec.default.is_none());
        assert!(spec.enum_values.is_none());
    }

    #[test]
    fn test_param_spec_constraints() {
        let yaml = r#"
type: integer
required: true
default: 10
minimum: 1
maximum: 100
"#;
        let spec: ParamSpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(spec.param_type, ParamType::Integer);
        assert!(spec.required);
        assert_eq!(spec.default.as_ref().map(Scalar::as_str), Some("10"));
        assert_eq!(spec.minimum, Some(Bound::Integer(1)));
        assert_eq!(spec.maximum, Some(Bound::Integer(100)));
    }

    #[test]
    fn test_bounds_keep_their_kind() {
        let spec: ParamSpec =
            serde_yaml_ng::from_str("minimum: 0.5\nmaximum: 9007199254740993\n").unwrap();
        assert_eq!(spec.minimum, Some(Bound::Number(0.5)));
        assert_eq!(spec.maximum, Some(Bound::Integer(9007199254740993)));
        assert_eq!(spec.maximum.unwrap().to_string(), "9007199254740993");
    }

    #[test]
    fn test_enum_contains() {
        let spec: ParamSpec = serde_yaml_ng::from_str("enum: [a, '', 3]\n").unwrap();
        assert!(spec.enum_contains("a"));
        assert!(spec.enum_contains(""));
        assert!(spec.enum_contains("3"));
        assert!(!spec.enum_contains("b"));
    }

    #[test]
    fn test_compiled_pattern_is_cached() {
        let spec: ParamSpec = serde_yaml_ng::from_str("pattern: '^[a-z]+$'\n").unwrap();
        let first = spec.compiled_pattern().unwrap().unwrap() as *const Regex;
        let second = spec.compiled_pattern().unwrap().unwrap() as *const Regex;
        assert_eq!(first, second);
        assert!(ParamSpec::default().compiled_pattern().is_none());
    }

    #[test]
    fn test_invalid_pattern_reports_error() {
        let spec: ParamSpec = serde_yaml_ng::from_str("pattern: '('\n").unwrap();
        assert!(spec.compiled_pattern().unwrap().is_err());
    }
}
