use serde::{Deserialize, Serialize};

use super::parameter::ParamSpecs;
use super::resource::RawResource;
use super::scalar::{Scalar, null_as_default};

/// A documentation section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    pub title: String,
    pub content: String,
}

/// Root of a parsed API description document.
///
/// `title`, `version` and `resources` are required by normalization but kept
/// optional here so a missing field is reported by name instead of as a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Scalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri_parameters: Option<ParamSpecs>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub protocols: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub documentation: Vec<Documentation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<RawResource>>,
}
