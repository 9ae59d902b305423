use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::model::{ApiSpec, Body, Method, Resource, ResourceId, Response};
use crate::parse::body::RawBody;
use crate::parse::parameter::ParamSpecs;
use crate::parse::resource::{RawMethod, RawResource};
use crate::parse::spec::RawSpec;

use super::uri::{filter_uri_parameters, uri_path};

/// Caller overrides applied during normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Base path to use instead of the path of the document's `baseUri`.
    pub uri: Option<String>,
    /// Base URI parameters to use instead of the document's `baseUriParameters`.
    pub uri_parameters: Option<ParamSpecs>,
    /// Name used when logging the load.
    pub name: Option<String>,
}

/// Normalize a parsed document with no overrides.
pub fn normalize(raw: &RawSpec) -> Result<ApiSpec, LoadError> {
    normalize_with_options(raw, &NormalizeOptions::default())
}

/// Flatten the resource tree into absolute URIs, scope URI parameters to the
/// resources whose URI uses them, and canonicalize responses and bodies.
pub fn normalize_with_options(
    raw: &RawSpec,
    options: &NormalizeOptions,
) -> Result<ApiSpec, LoadError> {
    let title = raw.title.as_deref().ok_or(LoadError::MissingField("title"))?;
    let version = raw
        .version
        .as_ref()
        .ok_or(LoadError::MissingField("version"))?
        .as_str();
    let resources = raw
        .resources
        .as_ref()
        .ok_or(LoadError::MissingField("resources"))?;

    let id = spec_id(title, version);

    let uri = match &options.uri {
        Some(uri) if !uri.starts_with('/') => {
            return Err(LoadError::InvalidBaseUri(uri.clone()));
        }
        Some(uri) => uri.clone(),
        None => raw
            .base_uri
            .as_deref()
            .map(uri_path)
            .unwrap_or_default()
            .to_string(),
    };

    let all_uri_parameters = Arc::new(
        options
            .uri_parameters
            .as_ref()
            .or(raw.base_uri_parameters.as_ref())
            .map(|params| filter_uri_parameters(params, &uri))
            .unwrap_or_default(),
    );

    let mut normalizer = Normalizer {
        id: &id,
        resources: Vec::new(),
        api: IndexMap::new(),
    };
    let mut roots = Vec::with_capacity(resources.len());
    for resource in resources {
        roots.push(normalizer.resource(&uri, &all_uri_parameters, resource)?);
    }

    let Normalizer { resources, api, .. } = normalizer;

    log::info!(
        "got {}: {} resources",
        options.name.as_deref().unwrap_or("api spec"),
        api.len()
    );

    Ok(ApiSpec {
        id,
        title: title.to_string(),
        version: version.to_string(),
        uri,
        base_uri: raw.base_uri.clone(),
        media_type: raw.media_type.clone(),
        protocols: raw.protocols.clone(),
        all_uri_parameters,
        resources,
        roots,
        api,
    })
}

/// `"My API" + "v1"` → `my_api_v1`.
pub fn spec_id(title: &str, version: &str) -> String {
    format!("{title} {version}").to_lowercase().replace(' ', "_")
}

struct Normalizer<'a> {
    id: &'a str,
    resources: Vec<Resource>,
    api: IndexMap<String, ResourceId>,
}

impl Normalizer<'_> {
    fn resource(
        &mut self,
        parent_uri: &str,
        parent_params: &ParamSpecs,
        raw: &RawResource,
    ) -> Result<ResourceId, LoadError> {
        let uri = format!("{parent_uri}{}", raw.relative_uri);
        if self.api.contains_key(&uri) {
            return Err(LoadError::DuplicateResource(uri));
        }

        let all_uri_parameters = Arc::new(filter_uri_parameters(parent_params, &uri));

        let verbs: Vec<String> = raw.methods.iter().map(|m| m.method.to_uppercase()).collect();
        log::debug!(
            "add {} {} {}",
            self.id,
            if verbs.is_empty() { "-".to_string() } else { verbs.join("/") },
            uri
        );

        let mut methods = Vec::with_capacity(raw.methods.len());
        let mut methods_by_name = IndexMap::with_capacity(raw.methods.len());
        for raw_method in &raw.methods {
            let method = build_method(&uri, &all_uri_parameters, raw_method)?;
            if methods_by_name.contains_key(&method.method) {
                return Err(LoadError::DuplicateMethod {
                    uri,
                    method: method.method,
                });
            }
            methods_by_name.insert(method.method.clone(), methods.len());
            methods.push(method);
        }

        let id = self.resources.len();
        self.api.insert(uri.clone(), id);
        self.resources.push(Resource {
            id,
            relative_uri: raw.relative_uri.clone(),
            uri: uri.clone(),
            display_name: raw.display_name.clone(),
            description: raw.description.clone(),
            uri_parameters: raw.uri_parameters.clone(),
            all_uri_parameters: Arc::clone(&all_uri_parameters),
            methods,
            methods_by_name,
            children: Vec::new(),
        });

        let mut children = Vec::with_capacity(raw.resources.len());
        for child in &raw.resources {
            children.push(self.resource(&uri, &all_uri_parameters, child)?);
        }
        self.resources[id].children = children;

        Ok(id)
    }
}

fn build_method(
    uri: &str,
    all_uri_parameters: &Arc<ParamSpecs>,
    raw: &RawMethod,
) -> Result<Method, LoadError> {
    let verb = raw.method.to_lowercase();

    let mut responses = IndexMap::with_capacity(raw.responses.len());
    for (key, response) in &raw.responses {
        let status = key
            .as_str()
            .trim()
            .parse::<u16>()
            .map_err(|_| LoadError::InvalidStatus {
                uri: uri.to_string(),
                method: verb.clone(),
                status: key.to_string(),
            })?;
        let response = response.clone().unwrap_or_default();
        responses.insert(
            status,
            Response {
                status,
                description: response.description,
                headers: response.headers,
                body: build_bodies(&response.body),
            },
        );
    }

    Ok(Method {
        method: verb,
        uri: uri.to_string(),
        all_uri_parameters: Arc::clone(all_uri_parameters),
        description: raw.description.clone(),
        query_parameters: raw.query_parameters.clone(),
        headers: raw.headers.clone(),
        body: build_bodies(&raw.body),
        responses,
    })
}

fn build_bodies(raw: &IndexMap<String, Option<RawBody>>) -> IndexMap<String, Body> {
    raw.iter()
        .map(|(mimetype, body)| {
            let body = body.clone().unwrap_or_default();
            (
                mimetype.clone(),
                Body {
                    mimetype: mimetype.clone(),
                    schema: body.schema,
                    example: body.example,
                    form_parameters: body.form_parameters,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_id() {
        assert_eq!(spec_id("Test", "v1"), "test_v1");
        assert_eq!(spec_id("My Pet Store", "1.0"), "my_pet_store_1.0");
    }
}
