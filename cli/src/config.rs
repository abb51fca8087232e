//! Configuration management for the ayushbot CLI.
//!
//! Configuration is stored in ~/.ayushbot/{app_name}/config.yaml and holds
//! kubectl-style named contexts.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".ayushbot";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable consulted when no context supplies an API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Map of context name to context configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub contexts: HashMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// A named backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Gemini API key. `$VAR` and `${VAR}` are expanded when used.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Model override (empty uses the persona's model).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,

    /// API base URL (empty uses the default endpoint).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,

    /// Request timeout in seconds (0 uses the persona's timeout).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: u64,

    /// Temperature override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Persona preset name or path to a persona YAML file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub persona: String,

    /// Path to a rule-set file used instead of the built-in one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rules: String,
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
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds or replaces a context and saves.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        if self.current_context.is_empty() {
            self.current_context = name.to_string();
        }
        self.save()
    }

    /// Deletes a context and saves.
    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    /// Sets the current context and saves.
    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    /// Gets the current context.
    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or the current context if no name is given.
    ///
    /// Naming a context that does not exist is an error; having no current
    /// context is not.
    pub fn resolve_context(&self, name: Option<&str>) -> anyhow::Result<Option<&Context>> {
        match name {
            Some(n) if !n.is_empty() => match self.contexts.get(n) {
                Some(ctx) => Ok(Some(ctx)),
                None => anyhow::bail!("context '{}' not found", n),
            },
            _ => Ok(self.get_current_context()),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Context {
    /// The API key with environment references expanded, falling back to
    /// `GEMINI_API_KEY` when the context has none.
    pub fn resolved_api_key(&self) -> String {
        let key = expand_env(&self.api_key);
        if key.is_empty() {
            std::env::var(API_KEY_ENV).unwrap_or_default()
        } else {
            key
        }
    }
}

/// Loads configuration for the specified app, creating an empty file if needed.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg: Config = if config_path.exists() {
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

/// Expand a `$VAR` or `${VAR}` reference. Anything else is returned as is.
pub fn expand_env(s: &str) -> String {
    let name = if let Some(inner) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
        inner
    } else if let Some(rest) = s.strip_prefix('$') {
        rest
    } else {
        return s.to_string();
    };

    let is_ident = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !is_ident {
        return s.to_string();
    }
    std::env::var(name).unwrap_or_default()
}

/// Masks the API key for display.
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

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.yaml");
        let cfg = load_config("test", Some(path.to_str().unwrap())).unwrap();
        (dir, cfg)
    }

    #[test]
    fn test_load_creates_file() {
        let (_dir, cfg) = temp_config();
        assert!(cfg.path().exists());
        assert!(cfg.contexts.is_empty());
        assert_eq!(cfg.app_name, "test");
    }

    #[test]
    fn test_context_lifecycle() {
        let (_dir, mut cfg) = temp_config();
        cfg.add_context(
            "dev",
            Context {
                api_key: "AIzaSyDEVKEY1234".into(),
                temperature: Some(0.3),
                ..Default::default()
            },
        )
        .unwrap();
        cfg.add_context("prod", Context::default()).unwrap();

        // First context added becomes current.
        assert_eq!(cfg.current_context, "dev");
        assert_eq!(cfg.list_contexts(), vec!["dev", "prod"]);

        cfg.use_context("prod").unwrap();
        let reloaded = load_config("test", Some(cfg.path().to_str().unwrap())).unwrap();
        assert_eq!(reloaded.current_context, "prod");
        assert_eq!(reloaded.contexts["dev"].name, "dev");
        assert_eq!(reloaded.contexts["dev"].temperature, Some(0.3));

        cfg.delete_context("prod").unwrap();
        assert!(cfg.current_context.is_empty());
        assert!(cfg.delete_context("prod").is_err());
        assert!(cfg.use_context("missing").is_err());
    }

    #[test]
    fn test_resolve_context() {
        let (_dir, mut cfg) = temp_config();
        assert!(cfg.resolve_context(None).unwrap().is_none());
        assert!(cfg.resolve_context(Some("nope")).is_err());

        cfg.add_context("a", Context::default()).unwrap();
        assert_eq!(cfg.resolve_context(None).unwrap().unwrap().name, "a");
        assert_eq!(cfg.resolve_context(Some("")).unwrap().unwrap().name, "a");
        assert_eq!(cfg.resolve_context(Some("a")).unwrap().unwrap().name, "a");
    }

    #[test]
    fn test_empty_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        let cfg = load_config("test", Some(path.to_str().unwrap())).unwrap();
        assert!(cfg.contexts.is_empty());
    }

    #[test]
    fn test_expand_env() {
        // SAFETY: test-only variable with a unique name.
        unsafe { std::env::set_var("AYUSHBOT_TEST_KEY", "secret") };
        assert_eq!(expand_env("$AYUSHBOT_TEST_KEY"), "secret");
        assert_eq!(expand_env("${AYUSHBOT_TEST_KEY}"), "secret");
        assert_eq!(expand_env("$AYUSHBOT_TEST_UNSET_VAR"), "");
        assert_eq!(expand_env("plain"), "plain");
        assert_eq!(expand_env("$"), "$");
        assert_eq!(expand_env("$1abc"), "$1abc");
    }

    #[test]
    fn test_resolved_api_key_prefers_context() {
        let ctx = Context {
            api_key: "direct".into(),
            ..Default::default()
        };
        assert_eq!(ctx.resolved_api_key(), "direct");
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("AIzaSy0123456789"), "AIza********6789");
    }
}
