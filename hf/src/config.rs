//! htmlfy configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::watcher::WatcherConfig;

/// Main htmlfy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace root; falls back to the current directory when unset
    pub workspace: Option<PathBuf>,

    /// Generated file name, relative to the workspace root
    #[serde(rename = "output-file")]
    pub output_file: String,

    /// Directory whose entries become stylesheet links
    #[serde(rename = "assets-dir")]
    pub assets_dir: String,

    /// Extra partial search directory under the workspace root
    #[serde(rename = "snippets-dir")]
    pub snippets_dir: String,

    /// Template source extension, without the dot
    #[serde(rename = "source-extension")]
    pub source_extension: String,

    /// Document `<title>`
    pub title: String,

    /// Document `lang` attribute
    pub lang: String,

    /// Variables available to every template
    pub globals: BTreeMap<String, serde_json::Value>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Save watcher settings
    pub watcher: WatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            output_file: crate::OUTPUT_FILE.to_string(),
            assets_dir: "assets".to_string(),
            snippets_dir: "snippets".to_string(),
            source_extension: crate::SOURCE_EXTENSION.to_string(),
            title: "Document".to_string(),
            lang: "en".to_string(),
            globals: BTreeMap::new(),
            log_level: None,
            watcher: WatcherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .htmlfy.yml
        let local_config = PathBuf::from(".htmlfy.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/htmlfy/htmlfy.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("htmlfy").join("htmlfy.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".htmlfy.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("htmlfy").join("htmlfy.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Template globals with `key=value` overrides applied on top
    pub fn globals_with(&self, overrides: &[(String, String)]) -> BTreeMap<String, serde_json::Value> {
        let mut globals = self.globals.clone();
        for (key, value) in overrides {
            globals.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.output_file, "index.html");
        assert_eq!(config.assets_dir, "assets");
        assert_eq!(config.snippets_dir, "snippets");
        assert_eq!(config.source_extension, "liquid");
        assert_eq!(config.title, "Document");
        assert!(config.workspace.is_none());
        assert!(config.globals.is_empty());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
workspace: /proj
output-file: out.html
assets-dir: css
title: Landing
lang: de
log-level: debug
globals:
  name: World
  count: 3

watcher:
  settle-ms: 200
  start-armed: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.workspace, Some(PathBuf::from("/proj")));
        assert_eq!(config.output_file, "out.html");
        assert_eq!(config.assets_dir, "css");
        assert_eq!(config.title, "Landing");
        assert_eq!(config.lang, "de");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.globals["name"], serde_json::json!("World"));
        assert_eq!(config.globals["count"], serde_json::json!(3));
        assert_eq!(config.watcher.settle_ms, 200);
        assert!(!config.watcher.start_armed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
title: Only a title
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.title, "Only a title");
        assert_eq!(config.output_file, "index.html");
        assert_eq!(config.source_extension, "liquid");
        assert!(config.watcher.start_armed);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("htmlfy.yml");
        fs::write(&path, "title: From file\nlog-level: WARN\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.title, "From file");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_globals_with_overrides() {
        let mut config = Config::default();
        config.globals.insert("name".to_string(), serde_json::json!("config"));
        config.globals.insert("keep".to_string(), serde_json::json!(true));

        let globals = config.globals_with(&[("name".to_string(), "cli".to_string())]);
        assert_eq!(globals["name"], serde_json::json!("cli"));
        assert_eq!(globals["keep"], serde_json::json!(true));
    }
}
