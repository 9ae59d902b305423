use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("base uri needs to start with slash: {0}")]
    InvalidBaseUri(String),

    #[error("duplicate resource uri: {0}")]
    DuplicateResource(String),

    #[error("duplicate method {method} on resource {uri}")]
    DuplicateMethod { uri: String, method: String },

    #[error("invalid response status {status:?} for {method} {uri}")]
    InvalidStatus {
        uri: String,
        method: String,
        status: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Discriminant callers branch on when handling an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Api,
    Load,
    Request,
    Parameter,
    Auth,
}

impl ErrorKind {
    pub fn default_status(self) -> u16 {
        match self {
            ErrorKind::Api | ErrorKind::Load => 500,
            ErrorKind::Request | ErrorKind::Parameter => 400,
            ErrorKind::Auth => 401,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Api => "ApiError",
            ErrorKind::Load => "LoadError",
            ErrorKind::Request => "RequestError",
            ErrorKind::Parameter => "ParameterError",
            ErrorKind::Auth => "AuthError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request-time error: a kind, an HTTP-like status, and a message template
/// with the values substituted into it.
///
/// The message is only rendered when asked for (`message()` / `Display`), so
/// the substitution data stays available to callers that translate errors
/// into their own response format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    status: u16,
    template: String,
    args: Vec<String>,
    data: IndexMap<String, String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.default_status(),
            template: template.into(),
            args: Vec::new(),
            data: IndexMap::new(),
        }
    }

    /// Generic API failure, status 500.
    pub fn api(template: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, template)
    }

    /// Resolution failure with an explicit status (400, 404, 405, 415).
    pub fn request(status: u16, template: impl Into<String>) -> Self {
        Self::new(ErrorKind::Request, template)
            .with_status(status)
            .with("status", status)
    }

    /// A single named parameter failed conversion or validation.
    pub fn parameter(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parameter, template).with("name", name.into())
    }

    pub fn auth(template: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, template)
    }

    /// Append a positional substitution value.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Set a named substitution value.
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn data(&self) -> &IndexMap<String, String> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Name of the offending parameter, for parameter errors.
    pub fn parameter_name(&self) -> Option<&str> {
        match self.kind {
            ErrorKind::Parameter => self.get("name"),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        render(&self.template, &self.args, &self.data)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<LoadError> for ApiError {
    fn from(error: LoadError) -> Self {
        ApiError::new(ErrorKind::Load, "{error}").with("error", error)
    }
}

/// Substitute values into a message template.
///
/// `{}` takes the next positional value, `{0}` a positional value by index,
/// `{name}` a named value. `{{` and `}}` are literal braces. Placeholders
/// with no matching value are kept as written.
pub fn render(template: &str, args: &[String], data: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = 0;
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix('}') {
            out.push('}');
            rest = after.strip_prefix('}').unwrap_or(after);
            continue;
        }

        let Some(end) = tail[1..].find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let key = &tail[1..1 + end];
        let value = if key.is_empty() {
            next += 1;
            args.get(next - 1)
        } else if let Ok(index) = key.parse::<usize>() {
            args.get(index)
        } else {
            data.get(key)
        };
        match value {
            Some(value) => out.push_str(value),
            None => out.push_str(&tail[..end + 2]),
        }
        rest = &tail[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_positional_and_named() {
        let err = ApiError::request(405, "unsupported resource method: {} {}")
            .arg("POST")
            .arg("/api/widgets");
        assert_eq!(err.message(), "unsupported resource method: POST /api/widgets");
        assert_eq!(err.status(), 405);
        assert_eq!(err.get("status"), Some("405"));

        let err =
            ApiError::parameter("limit", "{name}: {error}").with("error", "too large: 11 > 10");
        insta::assert_snapshot!(err.to_string(), @"limit: too large: 11 > 10");
    }

    #[test]
    fn test_render_indexed_and_escaped() {
        let args = vec!["a".to_string(), "b".to_string()];
        let data = IndexMap::new();
        assert_eq!(render("{1}{0} {{x}}", &args, &data), "ba {x}");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let data = IndexMap::new();
        assert_eq!(render("{missing} and {}", &[], &data), "{missing} and {}");
        assert_eq!(render("open {brace", &[], &data), "open {brace");
    }

    #[test]
    fn test_default_statuses() {
        assert_eq!(ApiError::api("boom").status(), 500);
        assert_eq!(ApiError::auth("unauthorized").status(), 401);
        assert_eq!(ApiError::parameter("q", "invalid {name}").status(), 400);
        assert_eq!(ApiError::request(415, "nope").kind(), ErrorKind::Request);
    }

    #[test]
    fn test_parameter_name() {
        let err = ApiError::parameter("q", "invalid {name}");
        assert_eq!(err.parameter_name(), Some("q"));
        assert_eq!(err.message(), "invalid q");
        assert_eq!(ApiError::request(400, "bad").parameter_name(), None);
    }

    #[test]
    fn test_load_error_conversion() {
        let err: ApiError = LoadError::MissingField("title").into();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.status(), 500);
        assert_eq!(err.message(), "missing required field: title");
    }
}
