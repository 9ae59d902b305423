use serde::{Deserialize, Serialize};

use super::parameter::ParamSpecs;
use super::scalar::null_as_default;

/// A body descriptor for one media type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub form_parameters: ParamSpecs,
}
