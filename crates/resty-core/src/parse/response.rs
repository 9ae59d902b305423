use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::body::RawBody;
use super::parameter::ParamSpecs;
use super::scalar::null_as_default;

/// A response definition. Absent bodies (`application/json:` with no value)
/// are kept as `None` and filled in during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: ParamSpecs,

    #[serde(default, deserialize_with = "null_as_default")]
    pub body: IndexMap<String, Option<RawBody>>,
}
