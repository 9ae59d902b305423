use std::sync::Arc;

use indexmap::IndexMap;

use crate::parse::parameter::ParamSpecs;

use super::spec::ResourceId;

/// A resource with its absolute URI and the URI parameters in scope for it.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: ResourceId,
    pub relative_uri: String,
    pub uri: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Parameters declared on this resource itself.
    pub uri_parameters: ParamSpecs,
    /// Ancestor-scoped URI parameters whose `{name}` appears in `uri`.
    pub all_uri_parameters: Arc<ParamSpecs>,
    pub methods: Vec<Method>,
    /// Lower-cased verb to index into `methods`.
    pub methods_by_name: IndexMap<String, usize>,
    pub children: Vec<ResourceId>,
}

impl Resource {
    /// Look up a method by verb, case-insensitively.
    pub fn method(&self, verb: &str) -> Option<&Method> {
        let index = match self.methods_by_name.get(verb) {
            Some(index) => *index,
            None => *self.methods_by_name.get(verb.to_lowercase().as_str())?,
        };
        self.methods.get(index)
    }

    pub fn has_method(&self, verb: &str) -> bool {
        self.method(verb).is_some()
    }

    /// Declared verbs, lower-case, in declaration order.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.methods_by_name.keys().map(String::as_str)
    }
}

/// A method bound to a resource.
#[derive(Debug, Clone)]
pub struct Method {
    pub method: String,
    pub uri: String,
    pub all_uri_parameters: Arc<ParamSpecs>,
    pub description: Option<String>,
    pub query_parameters: ParamSpecs,
    pub headers: ParamSpecs,
    pub body: IndexMap<String, Body>,
    pub responses: IndexMap<u16, Response>,
}

impl Method {
    pub fn response(&self, status: u16) -> Option<&Response> {
        self.responses.get(&status)
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub description: Option<String>,
    pub headers: ParamSpecs,
    pub body: IndexMap<String, Body>,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub mimetype: String,
    pub schema: Option<serde_json::Value>,
    pub example: Option<serde_json::Value>,
    pub form_parameters: ParamSpecs,
}

impl Body {
    /// The example payload as text. String examples are returned verbatim,
    /// structured ones as compact JSON.
    pub fn example_text(&self) -> Option<String> {
        match self.example.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
