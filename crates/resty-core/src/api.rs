use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;

use crate::config::ApiConfig;
use crate::convert::{Converter, ParamSource, ParamValue};
use crate::error::{ApiError, LoadError};
use crate::model::{ApiSpec, Body, Method, Resource, Response};
use crate::parse;
use crate::parse::parameter::ParamSpecs;
use crate::parse::spec::RawSpec;
use crate::transform::{self, NormalizeOptions};

/// Media type matching any request when a response declares it.
pub const WILDCARD: &str = "*/*";

/// An example payload together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub content: String,
    pub mimetype: String,
}

impl Content {
    pub fn new(content: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mimetype: mimetype.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Request-time view over a normalized API description.
///
/// Built once at load time and read-only afterwards, so it can be shared
/// across request handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Api {
    spec: ApiSpec,
    uri: String,
    id: String,
    config: ApiConfig,
    converter: Converter,
}

impl Api {
    pub fn new(raw: &RawSpec, config: ApiConfig) -> Result<Self, LoadError> {
        let options = NormalizeOptions {
            uri: config.uri.clone(),
            ..NormalizeOptions::default()
        };
        let spec = transform::normalize_with_options(raw, &options)?;
        Self::from_spec(spec, config)
    }

    /// Wrap an already-normalized spec.
    ///
    /// An empty base path is accepted and means resources live at the root.
    pub fn from_spec(spec: ApiSpec, config: ApiConfig) -> Result<Self, LoadError> {
        let uri = config.uri.clone().unwrap_or_else(|| spec.uri.clone());
        if !uri.is_empty() && !uri.starts_with('/') {
            return Err(LoadError::InvalidBaseUri(uri));
        }
        let id = config.id.clone().unwrap_or_else(|| spec.id.clone());
        let converter = Converter::new(config.ignore_empty_params);

        Ok(Self {
            spec,
            uri,
            id,
            config,
            converter,
        })
    }

    pub fn from_yaml(input: &str, config: ApiConfig) -> Result<Self, LoadError> {
        Self::new(&parse::from_yaml(input)?, config)
    }

    pub fn from_json(input: &str, config: ApiConfig) -> Result<Self, LoadError> {
        Self::new(&parse::from_json(input)?, config)
    }

    pub fn from_path(path: &Path, config: ApiConfig) -> Result<Self, LoadError> {
        let raw = parse::from_path(path)?;
        let options = NormalizeOptions {
            uri: config.uri.clone(),
            name: Some(path.display().to_string()),
            ..NormalizeOptions::default()
        };
        let spec = transform::normalize_with_options(&raw, &options)?;
        Self::from_spec(spec, config)
    }

    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Resolve a resource by absolute URI, or by a URI relative to the base
    /// path.
    pub fn resource(&self, uri: &str) -> Result<&Resource, ApiError> {
        let uri: Cow<'_, str> = if uri.starts_with(self.uri.as_str()) {
            Cow::Borrowed(uri)
        } else if !uri.starts_with('/') {
            return Err(
                ApiError::request(400, "resource uri needs to start with slash: {}").arg(uri),
            );
        } else {
            Cow::Owned(format!("{}{}", self.uri, uri))
        };

        self.spec
            .get(&uri)
            .ok_or_else(|| ApiError::request(404, "unknown resource: {}").arg(&uri))
    }

    /// Upper-cased verbs for a resource.
    ///
    /// With `None`, the configured default verbs the resource declares.
    /// Otherwise every listed verb (entries may hold several, space-separated)
    /// must be declared on the resource.
    pub fn resource_methods(
        &self,
        resource: &Resource,
        methods: Option<&[&str]>,
        allow_empty: bool,
    ) -> Result<Vec<String>, ApiError> {
        let methods: Vec<String> = match methods {
            None => self
                .config
                .default_methods
                .iter()
                .filter(|verb| resource.has_method(verb))
                .map(|verb| verb.to_uppercase())
                .collect(),
            Some(methods) => {
                let methods: Vec<String> = methods
                    .iter()
                    .flat_map(|m| m.split_whitespace())
                    .map(str::to_uppercase)
                    .collect();
                if let Some(unknown) = methods.iter().find(|m| !resource.has_method(m)) {
                    return Err(ApiError::request(405, "unknown resource method: {} {}")
                        .arg(unknown)
                        .arg(&resource.uri));
                }
                methods
            }
        };

        if methods.is_empty() && !allow_empty {
            return Err(
                ApiError::request(400, "requires a non-empty list of methods for {}")
                    .arg(&resource.uri),
            );
        }
        Ok(methods)
    }

    /// Resolve a method by verb, falling back to the alias table
    /// (`head` and `options` answer with `get` by default).
    pub fn method<'a>(&self, resource: &'a Resource, verb: &str) -> Result<&'a Method, ApiError> {
        let lower = verb.to_lowercase();
        resource
            .method(&lower)
            .or_else(|| {
                self.config
                    .method_aliases
                    .get(&lower)
                    .and_then(|alias| resource.method(alias))
            })
            .ok_or_else(|| {
                ApiError::request(405, "unsupported resource method: {} {}")
                    .arg(verb)
                    .arg(&resource.uri)
            })
    }

    /// Resolve a `"VERB /uri"` target to its resource and method.
    pub fn target(&self, target: &str) -> Result<(&Resource, &Method), ApiError> {
        let Some((verb, uri)) = target.trim().split_once(char::is_whitespace) else {
            return Err(ApiError::request(400, "expected \"VERB uri\", got {}").arg(target));
        };
        let resource = self.resource(uri.trim())?;
        Ok((resource, self.method(resource, verb)?))
    }

    pub fn method_spec(&self, target: &str) -> Result<&Method, ApiError> {
        self.target(target).map(|(_, method)| method)
    }

    /// Everything a request to `method` is converted against: the base and
    /// ancestor URI parameters in scope, the resource's own URI parameters,
    /// then query parameters.
    pub fn parameters(&self, resource: &Resource, method: &Method) -> ParamSpecs {
        let mut specs = ParamSpecs::with_capacity(
            resource.uri_parameters.len() + method.all_uri_parameters.len(),
        );
        for (name, spec) in method.all_uri_parameters.iter().chain(&resource.uri_parameters) {
            specs.insert(name.clone(), spec.clone());
        }
        for (name, spec) in &method.query_parameters {
            specs.entry(name.clone()).or_insert_with(|| spec.clone());
        }
        specs
    }

    pub fn default_status(&self) -> u16 {
        self.config.default_status
    }

    pub fn response<'a>(
        &self,
        method: &'a Method,
        status: Option<u16>,
    ) -> Result<&'a Response, ApiError> {
        let status = status.unwrap_or_else(|| self.default_status());
        method.response(status).ok_or_else(|| {
            ApiError::request(400, "unsupported resource response status {}").arg(status)
        })
    }

    /// Pick the media type to answer with.
    ///
    /// With an `accept` list: the first accepted type the response declares,
    /// else a declared `*/*` body, else 415 unless `*/*` was itself accepted.
    /// Then (or with no list): the default media type if declared, else the
    /// first declared, else `*/*`.
    pub fn response_mimetype<'a>(
        &self,
        response: &'a Response,
        accept: Option<&[&str]>,
    ) -> Result<&'a str, ApiError> {
        let bodies = &response.body;

        if let Some(accept) = accept.filter(|accept| !accept.is_empty()) {
            if let Some((mimetype, _)) = accept.iter().find_map(|m| bodies.get_key_value(*m)) {
                return Ok(mimetype.as_str());
            }
            if bodies.contains_key(WILDCARD) {
                return Ok(WILDCARD);
            }
            if !accept.contains(&WILDCARD) {
                return Err(ApiError::request(
                    415,
                    "unsupported media type response for status {}: {}",
                )
                .arg(response.status)
                .arg(accept.join(",")));
            }
        }

        if let Some((mimetype, _)) = bodies.get_key_value(self.config.default_mimetype.as_str()) {
            return Ok(mimetype.as_str());
        }
        Ok(bodies.keys().next().map_or(WILDCARD, String::as_str))
    }

    /// The body for `mimetype`, or for the preferred media type when `None`.
    pub fn response_body<'a>(
        &self,
        response: &'a Response,
        mimetype: Option<&str>,
    ) -> Result<&'a Body, ApiError> {
        let mimetype = match mimetype {
            Some(mimetype) => mimetype,
            None => self.response_mimetype(response, None)?,
        };
        response.body.get(mimetype).ok_or_else(|| {
            ApiError::request(415, "unsupported media type '{}' response for status {}")
                .arg(mimetype)
                .arg(response.status)
        })
    }

    /// The body chosen by negotiating against an ordered accept list.
    pub fn negotiate_body<'a>(
        &self,
        response: &'a Response,
        accept: &[&str],
    ) -> Result<&'a Body, ApiError> {
        let mimetype = self.response_mimetype(response, Some(accept))?;
        self.response_body(response, Some(mimetype))
    }

    pub fn response_headers<'a>(&self, response: &'a Response) -> &'a ParamSpecs {
        &response.headers
    }

    pub fn example_body(
        &self,
        response: &Response,
        mimetype: Option<&str>,
    ) -> Result<Content, ApiError> {
        let body = self.response_body(response, mimetype)?;
        match body.example_text() {
            Some(example) => Ok(Content::new(example, &body.mimetype)),
            None => Err(
                ApiError::request(415, "unsupported media type '{}' example for status {}")
                    .arg(&body.mimetype)
                    .arg(response.status),
            ),
        }
    }

    /// Example header values, with `{?}` in header names replaced by
    /// `example`. Headers without an example are left out.
    pub fn example_headers(&self, response: &Response) -> IndexMap<String, String> {
        response
            .headers
            .iter()
            .filter_map(|(name, spec)| {
                let example = spec.example.as_ref()?;
                Some((name.replace("{?}", "example"), example.to_string()))
            })
            .collect()
    }

    pub fn convert_params<P: ParamSource + ?Sized>(
        &self,
        specs: &ParamSpecs,
        params: &P,
    ) -> Result<IndexMap<String, ParamValue>, ApiError> {
        self.converter.convert_params(specs, params)
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resty.api({}: {}: {} resources)",
            self.id,
            self.uri,
            self.spec.len()
        )
    }
}

/// Split an `Accept` header into media types, highest quality first.
/// Entries with equal quality keep their order; `q=0` entries are dropped.
pub fn parse_accept(header: &str) -> Vec<&str> {
    let mut entries: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let mimetype = parts.next().filter(|m| !m.is_empty())?;
            let quality = parts
                .filter_map(|param| param.strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((mimetype, quality))
        })
        .filter(|(_, quality)| *quality > 0.0)
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(mimetype, _)| mimetype).collect()
}
