use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Facade configuration loaded from `.resty.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base path override. Must start with `/`.
    pub uri: Option<String>,
    /// Identifier override for the loaded API.
    pub id: Option<String>,
    /// Status used when a response is requested without one.
    pub default_status: u16,
    /// Verbs reported for a resource when none are asked for explicitly.
    pub default_methods: Vec<String>,
    /// Media type preferred when no negotiation input is given.
    pub default_mimetype: String,
    /// Treat empty-string parameters as absent.
    pub ignore_empty_params: bool,
    /// Verb to fall back to when a method is not declared directly.
    pub method_aliases: IndexMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            uri: None,
            id: None,
            default_status: 200,
            default_methods: vec!["get".to_string()],
            default_mimetype: "application/json".to_string(),
            ignore_empty_params: true,
            method_aliases: IndexMap::from([
                ("head".to_string(), "get".to_string()),
                ("options".to_string(), "get".to_string()),
            ]),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".resty.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApiConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: ApiConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# resty configuration
# uri: /api              # base path override (defaults to the path of baseUri)
# id: my_api             # identifier override (defaults to "<title> <version>")

default_status: 200
default_methods: [get]
default_mimetype: application/json
ignore_empty_params: true   # "" counts as absent unless it is an enum member

method_aliases:
  head: get
  options: get
"#
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.default_status, 200);
        assert_eq!(config.default_methods, ["get"]);
        assert_eq!(config.default_mimetype, "application/json");
        assert!(config.ignore_empty_params);
        assert_eq!(config.method_aliases["head"], "get");
        assert_eq!(config.method_aliases["options"], "get");
        assert!(config.uri.is_none());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
uri: /v2
id: widgets
default_status: 201
default_methods: [get, post]
default_mimetype: application/xml
ignore_empty_params: false
method_aliases:
  head: get
"#;
        let config: ApiConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.uri.as_deref(), Some("/v2"));
        assert_eq!(config.id.as_deref(), Some("widgets"));
        assert_eq!(config.default_status, 201);
        assert_eq!(config.default_methods, ["get", "post"]);
        assert_eq!(config.default_mimetype, "application/xml");
        assert!(!config.ignore_empty_params);
        assert_eq!(config.method_aliases.len(), 1);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: ApiConfig = serde_yaml_ng::from_str("default_status: 204\n").unwrap();
        assert_eq!(config.default_status, 204);
        // Defaults applied
        assert_eq!(config.default_mimetype, "application/json");
        assert_eq!(config.method_aliases.len(), 2);
    }

    #[test]
    fn test_default_content_matches_default() {
        let config: ApiConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(load_config(&path).unwrap().is_none());

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "default_status: 202").unwrap();
        drop(file);

        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.default_status, 202);

        fs::write(&path, "default_status: [not, a, number]\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Yaml { .. })));
    }
}
