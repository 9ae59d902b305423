pub mod types;
pub mod value;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;

use crate::error::ApiError;
use crate::parse::parameter::{ParamSpec, ParamSpecs};

pub use types::{ValueError, coerce, default_text, validate};
pub use value::ParamValue;

/// Raw request parameters, looked up by name.
pub trait ParamSource {
    fn get_param(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: BuildHasher> ParamSource for IndexMap<String, String, S> {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// First matching pair wins, as with repeated query string keys.
impl<K: AsRef<str>, V: AsRef<str>> ParamSource for [(K, V)] {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> ParamSource for Vec<(K, V)> {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.as_slice().get_param(name)
    }
}

/// Converts raw string parameters into typed, validated values.
#[derive(Debug, Clone)]
pub struct Converter {
    /// Treat `""` as absent unless `""` is itself an `enum` member.
    pub ignore_empty_params: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            ignore_empty_params: true,
        }
    }
}

impl Converter {
    pub fn new(ignore_empty_params: bool) -> Self {
        Self {
            ignore_empty_params,
        }
    }

    /// Convert every declared parameter, stopping at the first failure.
    ///
    /// Every name in `specs` is present in the result; absent optional
    /// parameters without a default map to [`ParamValue::Null`].
    pub fn convert_params<P: ParamSource + ?Sized>(
        &self,
        specs: &ParamSpecs,
        params: &P,
    ) -> Result<IndexMap<String, ParamValue>, ApiError> {
        let mut converted = IndexMap::with_capacity(specs.len());
        for (name, spec) in specs {
            let value = self.convert_entry(name, spec, params.get_param(name))?;
            converted.insert(name.clone(), value);
        }
        Ok(converted)
    }

    /// Like [`Converter::convert_params`], but reports every failing
    /// parameter instead of only the first.
    pub fn convert_params_all<P: ParamSource + ?Sized>(
        &self,
        specs: &ParamSpecs,
        params: &P,
    ) -> Result<IndexMap<String, ParamValue>, Vec<ApiError>> {
        let mut converted = IndexMap::with_capacity(specs.len());
        let mut errors = Vec::new();
        for (name, spec) in specs {
            match self.convert_entry(name, spec, params.get_param(name)) {
                Ok(value) => {
                    converted.insert(name.clone(), value);
                }
                Err(error) => errors.push(error),
            }
        }
        if errors.is_empty() {
            Ok(converted)
        } else {
            Err(errors)
        }
    }

    fn convert_entry(
        &self,
        name: &str,
        spec: &ParamSpec,
        raw: Option<&str>,
    ) -> Result<ParamValue, ApiError> {
        match raw {
            Some(text) if !self.is_absent(spec, text) => self.convert_param(name, spec, text),
            _ if spec.required => {
                let missing = if raw.is_none() { "missing" } else { "empty" };
                Err(
                    ApiError::parameter(name, "{missing} required parameter: '{name}'")
                        .with("missing", missing),
                )
            }
            _ => match &spec.default {
                Some(default) => self.convert_param(name, spec, &default_text(spec, default)),
                None => Ok(ParamValue::Null),
            },
        }
    }

    fn is_absent(&self, spec: &ParamSpec, text: &str) -> bool {
        text.is_empty() && self.ignore_empty_params && !spec.enum_contains("")
    }

    /// Coerce then validate a single present value.
    pub fn convert_param(
        &self,
        name: &str,
        spec: &ParamSpec,
        text: &str,
    ) -> Result<ParamValue, ApiError> {
        coerce(spec, text)
            .and_then(|value| validate(spec, &value).map(|()| value))
            .map_err(|error| {
                log::debug!("ParameterError: {name}: {error}: {text:?}");
                ApiError::parameter(name, "{name}: {error}")
                    .with("error", &error)
                    .with("value", text)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_slice_source_first_wins() {
        let pairs = vec![("q", "first"), ("q", "second")];
        assert_eq!(pairs.get_param("q"), Some("first"));
        assert_eq!(pairs.get_param("missing"), None);
    }

    #[test]
    fn test_default_ignores_empty() {
        assert!(Converter::default().ignore_empty_params);
    }
}
