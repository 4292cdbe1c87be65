//! Context-based configuration for CLI tools.
//!
//! Configuration is stored in ~/.cogkit/{app_name}/config.yaml. Each named
//! context holds the credentials and service URLs of one account or region;
//! one context is current.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".cogkit";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Username that turns basic auth into API key auth.
pub const API_KEY_USERNAME: &str = "apikey";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Contexts by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contexts: BTreeMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// How a context authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Basic auth; with user `apikey` this is API key auth.
    #[default]
    Basic,
    /// Bearer token.
    Bearer,
    /// No credentials, e.g. behind an authenticating proxy.
    None,
}

/// One account/region configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    /// Context name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub auth_type: AuthType,

    /// Basic auth username. Empty means [`API_KEY_USERNAME`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    /// API key, basic auth password or bearer token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Service URL overrides keyed by service (`stt`, `tts`, `translator`,
    /// `nlu`, `assistant`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,

    /// API version date for versioned services.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: u64,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable_ssl_verification: bool,

    /// Default voice for synthesis.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_voice: String,

    /// Default recognition model.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_model: String,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds or replaces a context. The first context becomes current.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        if name.is_empty() {
            anyhow::bail!("context name must be non-empty");
        }
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        if self.current_context.is_empty() {
            self.current_context = name.to_string();
        }
        self.save()
    }

    /// Deletes a context.
    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    /// Sets the current context.
    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    /// Gets a specific context.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    /// Gets the current context.
    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or the current context if no name is
    /// given.
    pub fn resolve_context(&self, name: Option<&str>) -> Option<&Context> {
        match name {
            Some(n) if !n.is_empty() => self.get_context(n),
            _ => self.get_current_context(),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        self.contexts.keys().map(|s| s.as_str()).collect()
    }
}

impl Context {
    /// Basic auth username, defaulting to [`API_KEY_USERNAME`].
    pub fn username(&self) -> &str {
        if self.username.is_empty() {
            API_KEY_USERNAME
        } else {
            &self.username
        }
    }

    /// URL override of a service.
    pub fn url(&self, service: &str) -> Option<&str> {
        self.urls
            .get(service)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns a copy with the API key masked, for display.
    pub fn masked(&self) -> Context {
        Context {
            api_key: mask_api_key(&self.api_key),
            ..self.clone()
        }
    }
}

/// Loads configuration for the specified app, creating an empty file if
/// none exists.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        let cfg = Config::default();
        std::fs::write(&config_path, serde_yaml::to_string(&cfg)?)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;
    Ok(cfg)
}

/// Masks an API key for display, keeping the first and last four
/// characters of long keys.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(dir: &TempDir) -> Config {
        let path = dir.path().join("watson").join("config.yaml");
        load_config("watson", path.to_str()).unwrap()
    }

    #[test]
    fn test_load_creates_file() {
        let dir = TempDir::new().unwrap();
        let cfg = load(&dir);
        assert!(cfg.path().exists());
        assert!(cfg.contexts.is_empty());
        assert_eq!(cfg.app_name, "watson");
    }

    #[test]
    fn test_context_lifecycle() {
        let dir = TempDir::new().unwrap();
        let mut cfg = load(&dir);

        let mut ctx = Context {
            api_key: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        ctx.urls
            .insert("stt".to_string(), "https://stt.example.com".to_string());
        cfg.add_context("dallas", ctx).unwrap();
        cfg.add_context("frankfurt", Context::default()).unwrap();
        assert_eq!(cfg.current_context, "dallas");

        cfg.use_context("frankfurt").unwrap();
        assert!(cfg.use_context("tokyo").is_err());

        let reloaded = load(&dir);
        assert_eq!(reloaded.list_contexts(), vec!["dallas", "frankfurt"]);
        assert_eq!(reloaded.current_context, "frankfurt");
        let dallas = reloaded.resolve_context(Some("dallas")).unwrap();
        assert_eq!(dallas.url("stt"), Some("https://stt.example.com"));
        assert_eq!(dallas.url("tts"), None);
        assert_eq!(dallas.username(), API_KEY_USERNAME);
        assert_eq!(dallas.auth_type, AuthType::Basic);

        cfg.delete_context("frankfurt").unwrap();
        assert!(cfg.get_current_context().is_none());
        assert!(cfg.delete_context("frankfurt").is_err());
    }

    #[test]
    fn test_auth_type_yaml() {
        let ctx: Context = serde_yaml::from_str("auth_type: bearer\napi_key: tok\n").unwrap();
        assert_eq!(ctx.auth_type, AuthType::Bearer);
        let yaml = serde_yaml::to_string(&Context::default()).unwrap();
        assert_eq!(yaml.trim(), "auth_type: basic");
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("0123456789abcdef"), "0123********cdef");
        let ctx = Context {
            api_key: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.masked().api_key, "0123********cdef");
    }
}
