pub mod body;
pub mod parameter;
pub mod resource;
pub mod response;
pub mod scalar;
pub mod spec;

use std::fs;
use std::path::Path;

use crate::error::LoadError;
use spec::RawSpec;

/// Parse an API description from YAML.
pub fn from_yaml(input: &str) -> Result<RawSpec, LoadError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Parse an API description from JSON.
pub fn from_json(input: &str) -> Result<RawSpec, LoadError> {
    Ok(serde_json::from_str(input)?)
}

/// Read and parse a description file, choosing JSON or YAML by extension.
pub fn from_path(path: &Path) -> Result<RawSpec, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}
