//! Bootstrap configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal: the caller gets defaults and a warning.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// API key for the generation service
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// Model identifier passed to the generation service
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL override for the generation service (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Token budget per generation call
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// SQLite file for the puzzle pool
    #[serde(default)]
    pub pool_database: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Puzzle shape defaults
    #[serde(default)]
    pub puzzle: PuzzleSection,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// `[puzzle]` table: raw values, validated by the generator crate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PuzzleSection {
    #[serde(default)]
    pub num_groups: Option<usize>,
    #[serde(default)]
    pub words_per_group: Option<usize>,
    #[serde(default)]
    pub difficulty_profile: Option<String>,
    #[serde(default)]
    pub theme_hint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default TOML location for a module: `<config_dir>/wordgrid/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wordgrid").join(format!("{}.toml", module_name)))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Load the TOML config if present, falling back to defaults
///
/// A missing file logs a warning and yields defaults. A file that exists but
/// does not parse is still an error, since silently ignoring it would hide
/// a typo in the operator's settings.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        debug!("No config path available, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file not found at {}, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Read an environment variable, treating empty/whitespace values as unset
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Resolve a string setting from CLI → ENV → TOML
///
/// Logs which source won and warns when more than one source is set, which
/// usually means a stale value is lingering somewhere.
pub fn resolve_string(
    setting: &str,
    cli: Option<&str>,
    env_var: &str,
    toml: Option<&str>,
) -> Option<String> {
    let env = env_value(env_var);
    let candidates = [
        ("command line", cli.map(str::to_string)),
        ("environment", env),
        ("TOML", toml.map(str::to_string)),
    ];

    let present: Vec<&str> = candidates
        .iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
        .map(|(source, _)| *source)
        .collect();

    if present.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            setting,
            present.join(", "),
            present[0]
        );
    }

    candidates
        .into_iter()
        .find_map(|(source, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| (source, v))
        })
        .map(|(source, value)| {
            debug!("{} loaded from {}", setting, source);
            value
        })
}
