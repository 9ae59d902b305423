use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::body::RawBody;
use super::parameter::ParamSpecs;
use super::response::RawResponse;
use super::scalar::{Scalar, null_as_default};

/// A resource node as it appears in the document, relative to its parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    pub relative_uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri_parameters: ParamSpecs,

    #[serde(default, deserialize_with = "null_as_default")]
    pub methods: Vec<RawMethod>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<RawResource>,
}

/// An HTTP method binding. `responses` is keyed by the status as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMethod {
    pub method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub query_parameters: ParamSpecs,

    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: ParamSpecs,

    #[serde(default, deserialize_with = "null_as_default")]
    pub body: IndexMap<String, Option<RawBody>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub responses: IndexMap<Scalar, Option<RawResponse>>,
}
