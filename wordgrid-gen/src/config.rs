//! Generator configuration resolution
//!
//! Combines command-line values, environment variables and the TOML file
//! (in that priority order) into [`GeneratorSettings`] and a [`PuzzleConfig`].

use std::path::PathBuf;

use wordgrid_common::config::{env_value, resolve_string, LoggingConfig, TomlConfig};

use crate::error::{GenError, GenResult};
use crate::llm::anthropic::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::types::{DifficultyProfile, PuzzleConfig};

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "WORDGRID_MODEL";
pub const ENV_POOL_DB: &str = "WORDGRID_POOL_DB";
pub const ENV_LOG_LEVEL: &str = "WORDGRID_LOG_LEVEL";

/// Default token budget per generation call
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Values supplied on the command line, all optional
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub pool_database: Option<PathBuf>,
    pub log_level: Option<String>,
    pub num_groups: Option<usize>,
    pub words_per_group: Option<usize>,
    pub difficulty_profile: Option<String>,
    pub theme_hint: Option<String>,
}

/// Resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub pool_database: Option<PathBuf>,
}

/// Resolve service settings; a missing API key is a configuration error
pub fn resolve_settings(cli: &CliOverrides, toml: &TomlConfig) -> GenResult<GeneratorSettings> {
    let api_key = resolve_string(
        "API key",
        cli.api_key.as_deref(),
        ENV_API_KEY,
        toml.anthropic_api_key.as_deref(),
    )
    .ok_or_else(|| {
        GenError::Config(format!(
            "No API key configured. Set {} or anthropic_api_key in the TOML config.",
            ENV_API_KEY
        ))
    })?;

    let model = resolve_string("model", cli.model.as_deref(), ENV_MODEL, toml.model.as_deref())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let base_url = toml
        .base_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let max_tokens = toml.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(GenError::Config("max_tokens must be greater than 0".to_string()));
    }

    let pool_database = cli
        .pool_database
        .clone()
        .or_else(|| env_value(ENV_POOL_DB).map(PathBuf::from))
        .or_else(|| toml.pool_database.clone());

    Ok(GeneratorSettings {
        api_key,
        model,
        base_url,
        max_tokens,
        pool_database,
    })
}

/// Resolve the puzzle shape from CLI values over the `[puzzle]` table
pub fn resolve_puzzle_config(cli: &CliOverrides, toml: &TomlConfig) -> GenResult<PuzzleConfig> {
    let defaults = PuzzleConfig::default();
    let section = &toml.puzzle;

    let difficulty_profile = match cli
        .difficulty_profile
        .as_deref()
        .or(section.difficulty_profile.as_deref())
    {
        Some(name) => name.trim().to_lowercase().parse::<DifficultyProfile>()?,
        None => defaults.difficulty_profile,
    };

    let theme_hint = cli
        .theme_hint
        .clone()
        .or_else(|| section.theme_hint.clone())
        .filter(|t| !t.trim().is_empty());

    let config = PuzzleConfig {
        num_groups: cli.num_groups.or(section.num_groups).unwrap_or(defaults.num_groups),
        words_per_group: cli
            .words_per_group
            .or(section.words_per_group)
            .unwrap_or(defaults.words_per_group),
        difficulty_profile,
        theme_hint,
    };
    config.validate()?;
    Ok(config)
}

/// Logging settings with the level resolved from CLI, ENV and TOML
pub fn resolve_logging(cli: &CliOverrides, toml: &TomlConfig) -> LoggingConfig {
    let level = resolve_string(
        "log level",
        cli.log_level.as_deref(),
        ENV_LOG_LEVEL,
        Some(toml.logging.level.as_str()),
    )
    .unwrap_or_else(|| LoggingConfig::default().level);

    LoggingConfig {
        level,
        file: toml.logging.file.clone(),
    }
}
