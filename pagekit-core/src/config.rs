//! Project configuration: built-in defaults merged with `pages.config.toml`.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Override file looked up in the invocation directory.
pub const CONFIG_FILE: &str = "pages.config.toml";

/// Resolved project configuration.
///
/// Produced once by [`resolve`] and shared read-only for the rest of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub build: BuildConfig,
    /// Template payload handed to page rendering.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stages: StageCommands,
}

/// Root directories and per-asset globs, all relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub src: String,
    pub dist: String,
    pub temp: String,
    pub public: String,
    pub paths: AssetPaths,
}

/// Globs relative to `build.src`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub styles: String,
    pub scripts: String,
    pub pages: String,
    pub images: String,
    pub fonts: String,
}

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open")]
    pub open: bool,
    /// Show the connection banner in the browser.
    #[serde(default)]
    pub notify: bool,
    /// Request prefixes served from an alternate directory, checked in order.
    #[serde(default = "default_routes")]
    pub routes: IndexMap<String, String>,
}

/// Optional external commands replacing the built-in stage behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageCommands {
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_port() -> u16 {
    2080
}

fn default_open() -> bool {
    true
}

fn default_routes() -> IndexMap<String, String> {
    let mut routes = IndexMap::new();
    routes.insert("/node_modules".to_string(), "node_modules".to_string());
    routes
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            open: default_open(),
            notify: false,
            routes: default_routes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: BuildConfig {
                src: "src".to_string(),
                dist: "dist".to_string(),
                temp: "temp".to_string(),
                public: "public".to_string(),
                paths: AssetPaths {
                    styles: "assets/styles/*.scss".to_string(),
                    scripts: "assets/scripts/*.js".to_string(),
                    pages: "*.html".to_string(),
                    images: "assets/images/**".to_string(),
                    fonts: "assets/fonts/**".to_string(),
                },
            },
            data: serde_json::Value::Null,
            server: ServerConfig::default(),
            stages: StageCommands::default(),
        }
    }
}

impl Config {
    /// Resolves the configuration for a project rooted at `root`.
    pub fn load(root: &Path) -> Self {
        resolve(Config::default(), Some(&root.join(CONFIG_FILE)))
    }
}

/// Merges the override file at `override_path` onto `defaults`.
///
/// Top-level keys present in the override replace the default value wholesale.
/// A missing or malformed file yields `defaults` unchanged. A section that no
/// longer deserializes once replaced is skipped with a warning naming it; the
/// other sections of the file still apply.
pub fn resolve(defaults: Config, override_path: Option<&Path>) -> Config {
    let Some(path) = override_path else {
        return defaults;
    };

    match load_override(path).and_then(|overrides| merge(&defaults, overrides)) {
        Ok(config) => {
            debug!("Loaded configuration override from {}", path.display());
            config
        }
        Err(Error::Config { message, .. }) if message == "not found" => {
            debug!("No {} found, using defaults", path.display());
            defaults
        }
        Err(e) => {
            warn!("Ignoring configuration override: {}", e);
            defaults
        }
    }
}

fn load_override(path: &Path) -> Result<toml::Table> {
    let context = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| Error::Config {
        context: context.clone(),
        message: if e.kind() == std::io::ErrorKind::NotFound {
            "not found".to_string()
        } else {
            e.to_string()
        },
    })?;

    toml::from_str(&content).map_err(|e| Error::Config {
        context,
        message: e.to_string(),
    })
}

fn merge(defaults: &Config, overrides: toml::Table) -> Result<Config> {
    let to_config_error = |e: serde_json::Error| Error::Config {
        context: "merge".to_string(),
        message: e.to_string(),
    };

    let mut merged = serde_json::to_value(defaults).map_err(to_config_error)?;

    for (key, value) in overrides {
        let value = serde_json::to_value(value).map_err(to_config_error)?;
        let mut candidate = merged.clone();
        if let Some(base) = candidate.as_object_mut() {
            base.insert(key.clone(), value);
        }

        match serde_json::from_value::<Config>(candidate.clone()) {
            Ok(_) => merged = candidate,
            Err(e) => warn!("Ignoring [{}] from configuration override: {}", key, e),
        }
    }

    serde_json::from_value(merged).map_err(to_config_error)
}
