use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// A scalar read as text, whatever type the document gave it.
///
/// Status keys (`200:`), versions (`version: 1.0`) and parameter defaults
/// (`default: 10`) are typed as numbers by YAML but consumed as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Scalar(String);

impl Scalar {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl Visitor<'_> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Scalar, E> {
        Ok(Scalar(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Scalar, E> {
        Ok(Scalar(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Scalar, E> {
        Ok(Scalar(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Scalar, E> {
        Ok(Scalar(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Scalar, E> {
        Ok(Scalar(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Scalar, E> {
        // Keep `1.0` as written instead of collapsing it to `1`.
        if value.is_finite() && value.fract() == 0.0 {
            Ok(Scalar(format!("{value:.1}")))
        } else {
            Ok(Scalar(value.to_string()))
        }
    }
}

/// Deserialize an explicit `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_from_yaml_types() {
        let values: Vec<Scalar> = serde_yaml_ng::from_str("[v1, 200, 1.0, 2.5, true]").unwrap();
        let values: Vec<&str> = values.iter().map(Scalar::as_str).collect();
        assert_eq!(values, ["v1", "200", "1.0", "2.5", "true"]);
    }

    #[test]
    fn test_scalar_map_keys() {
        let map: indexmap::IndexMap<Scalar, String> =
            serde_yaml_ng::from_str("200: ok\n404: missing\n").unwrap();
        assert_eq!(map.get(&Scalar::from("404")).map(String::as_str), Some("missing"));
    }
}
