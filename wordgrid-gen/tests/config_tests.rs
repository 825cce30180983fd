//! Tests for generator settings resolution (CLI → ENV → TOML → default)
//!
//! Tests touching ANTHROPIC_API_KEY / WORDGRID_* are marked #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;

use wordgrid_common::config::{load_toml_config, TomlConfig};
use wordgrid_gen::config::{
    resolve_logging, resolve_puzzle_config, resolve_settings, CliOverrides, DEFAULT_MAX_TOKENS, ENV_API_KEY,
    ENV_LOG_LEVEL, ENV_MODEL, ENV_POOL_DB,
};
use wordgrid_gen::llm::anthropic::DEFAULT_MODEL;
use wordgrid_gen::{DifficultyProfile, GenError};

fn clear_env() {
    env::remove_var(ENV_API_KEY);
    env::remove_var(ENV_MODEL);
    env::remove_var(ENV_POOL_DB);
    env::remove_var(ENV_LOG_LEVEL);
}

fn toml_from(contents: &str) -> TomlConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    load_toml_config(file.path()).unwrap()
}

#[test]
#[serial]
fn test_missing_api_key_is_config_error() {
    clear_env();

    let err = resolve_settings(&CliOverrides::default(), &TomlConfig::default()).unwrap_err();
    assert!(matches!(err, GenError::Config(ref msg) if msg.contains(ENV_API_KEY)));
}

#[test]
#[serial]
fn test_api_key_priority_cli_env_toml() {
    clear_env();
    let toml = toml_from(r#"anthropic_api_key = "sk-toml""#);

    let settings = resolve_settings(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(settings.api_key, "sk-toml");

    env::set_var(ENV_API_KEY, "sk-env");
    let settings = resolve_settings(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(settings.api_key, "sk-env");

    let cli = CliOverrides {
        api_key: Some("sk-cli".into()),
        ..Default::default()
    };
    let settings = resolve_settings(&cli, &toml).unwrap();
    assert_eq!(settings.api_key, "sk-cli");

    clear_env();
}

#[test]
#[serial]
fn test_blank_env_key_falls_through_to_toml() {
    clear_env();
    env::set_var(ENV_API_KEY, "   ");
    let toml = toml_from(r#"anthropic_api_key = "sk-toml""#);

    let settings = resolve_settings(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(settings.api_key, "sk-toml");

    clear_env();
}

#[test]
#[serial]
fn test_model_and_token_defaults() {
    clear_env();
    env::set_var(ENV_API_KEY, "sk-env");

    let settings = resolve_settings(&CliOverrides::default(), &TomlConfig::default()).unwrap();
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
    assert!(settings.pool_database.is_none());

    env::set_var(ENV_MODEL, "claude-env-model");
    let settings = resolve_settings(&CliOverrides::default(), &TomlConfig::default()).unwrap();
    assert_eq!(settings.model, "claude-env-model");

    clear_env();
}

#[test]
#[serial]
fn test_zero_max_tokens_rejected() {
    clear_env();
    let toml = toml_from(
        r#"
anthropic_api_key = "sk-toml"
max_tokens = 0
"#,
    );

    assert!(matches!(
        resolve_settings(&CliOverrides::default(), &toml),
        Err(GenError::Config(_))
    ));
}

#[test]
#[serial]
fn test_pool_database_env_over_toml() {
    clear_env();
    env::set_var(ENV_POOL_DB, "/tmp/env-pool.db");
    let toml = toml_from(
        r#"
anthropic_api_key = "sk-toml"
pool_database = "/tmp/toml-pool.db"
"#,
    );

    let settings = resolve_settings(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(settings.pool_database.unwrap().to_str(), Some("/tmp/env-pool.db"));

    clear_env();
}

#[test]
fn test_puzzle_defaults_without_sources() {
    let config = resolve_puzzle_config(&CliOverrides::default(), &TomlConfig::default()).unwrap();
    assert_eq!(config.num_groups, 4);
    assert_eq!(config.words_per_group, 4);
    assert_eq!(config.difficulty_profile, DifficultyProfile::Standard);
    assert!(config.theme_hint.is_none());
}

#[test]
fn test_puzzle_table_with_cli_override() {
    let toml = toml_from(
        r#"
[puzzle]
num_groups = 3
difficulty_profile = "Hard"
theme_hint = "kitchens"
"#,
    );

    let config = resolve_puzzle_config(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(config.num_groups, 3);
    assert_eq!(config.difficulty_profile, DifficultyProfile::Hard);
    assert_eq!(config.theme_hint.as_deref(), Some("kitchens"));

    let cli = CliOverrides {
        num_groups: Some(4),
        difficulty_profile: Some("easy".into()),
        theme_hint: Some("  ".into()),
        ..Default::default()
    };
    let config = resolve_puzzle_config(&cli, &toml).unwrap();
    assert_eq!(config.num_groups, 4);
    assert_eq!(config.difficulty_profile, DifficultyProfile::Easy);
    assert!(config.theme_hint.is_none(), "blank CLI theme clears the hint");
}

#[test]
fn test_unknown_profile_is_config_error() {
    let cli = CliOverrides {
        difficulty_profile: Some("brutal".into()),
        ..Default::default()
    };
    let err = resolve_puzzle_config(&cli, &TomlConfig::default()).unwrap_err();
    assert!(matches!(err, GenError::Config(ref msg) if msg.contains("brutal")));
}

#[test]
fn test_impossible_shape_is_config_error() {
    let cli = CliOverrides {
        words_per_group: Some(12),
        ..Default::default()
    };
    assert!(matches!(
        resolve_puzzle_config(&cli, &TomlConfig::default()),
        Err(GenError::Config(_))
    ));
}

#[test]
#[serial]
fn test_log_level_resolution() {
    clear_env();
    let toml = toml_from(
        r#"
[logging]
level = "warn"
"#,
    );
    assert_eq!(resolve_logging(&CliOverrides::default(), &toml).level, "warn");

    env::set_var(ENV_LOG_LEVEL, "debug");
    assert_eq!(resolve_logging(&CliOverrides::default(), &toml).level, "debug");

    let cli = CliOverrides {
        log_level: Some("trace".into()),
        ..Default::default()
    };
    assert_eq!(resolve_logging(&cli, &toml).level, "trace");

    clear_env();
}
