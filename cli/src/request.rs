//! Loading request bodies from YAML or JSON files.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Path that means standard input.
pub const STDIN_PATH: &str = "-";

/// Error type for request loading.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse request (tried JSON and YAML)")]
    ParseFailed,
}

/// Loads a request from a file, or from stdin when `path` is `-`.
pub fn load_request<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RequestError> {
    let path = path.as_ref();
    if path.as_os_str() == STDIN_PATH {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return parse_request(&data, path);
    }
    let data = fs::read(path)?;
    parse_request(&data, path)
}

/// Parses request data by file extension, guessing the format otherwise.
pub fn parse_request<T: DeserializeOwned>(data: &[u8], path: impl AsRef<Path>) -> Result<T, RequestError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => serde_json::from_slice(data)
            .or_else(|_| serde_yaml::from_slice(data))
            .map_err(|_| RequestError::ParseFailed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Translate {
        text: Vec<String>,
        target: String,
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "text:\n  - hello\ntarget: de").unwrap();

        let req: Translate = load_request(file.path()).unwrap();
        assert_eq!(req.text, vec!["hello"]);
        assert_eq!(req.target, "de");
    }

    #[test]
    fn test_load_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{"text": ["hello"], "target": "fr"}}"#).unwrap();

        let req: Translate = load_request(file.path()).unwrap();
        assert_eq!(req.target, "fr");
    }

    #[test]
    fn test_guess_format() {
        let req: Translate = parse_request(b"text: [a, b]\ntarget: es", "req.txt").unwrap();
        assert_eq!(req.text, vec!["a", "b"]);
        let req: Translate = parse_request(br#"{"text":["a"],"target":"es"}"#, "req").unwrap();
        assert_eq!(req.target, "es");
    }

    #[test]
    fn test_parse_invalid() {
        let result: Result<Translate, _> = parse_request(b"invalid data {{{{", "file.txt");
        assert!(matches!(result, Err(RequestError::ParseFailed)));
        let result: Result<Translate, _> = parse_request(b"{", "file.json");
        assert!(matches!(result, Err(RequestError::ParseJson(_))));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Translate, _> = load_request("/nonexistent/request.yaml");
        assert!(matches!(result, Err(RequestError::Read(_))));
    }
}
