//! Tests for bootstrap configuration loading and CLI → ENV → TOML resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate WORDGRID_TEST_* variables are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use wordgrid_common::config::{
    default_config_path, env_value, load_or_default, load_toml_config, resolve_string,
    LoggingConfig, TomlConfig,
};
use wordgrid_common::logging::build_filter;
use wordgrid_common::Error;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_logging_config() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.file.is_none());
}

#[test]
fn test_default_config_path_names_module() {
    if let Some(path) = default_config_path("wordgrid-gen") {
        assert!(path.ends_with("wordgrid/wordgrid-gen.toml"));
    }
}

#[test]
fn test_load_full_toml() {
    let file = write_toml(
        r#"
anthropic_api_key = "sk-test"
model = "claude-test"
max_tokens = 1024
pool_database = "/tmp/wordgrid-pool.db"

[logging]
level = "debug"

[puzzle]
num_groups = 3
words_per_group = 4
difficulty_profile = "hard"
theme_hint = "kitchens"
"#,
    );

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.model.as_deref(), Some("claude-test"));
    assert_eq!(config.max_tokens, Some(1024));
    assert_eq!(config.pool_database, Some(PathBuf::from("/tmp/wordgrid-pool.db")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.puzzle.num_groups, Some(3));
    assert_eq!(config.puzzle.difficulty_profile.as_deref(), Some("hard"));
    assert_eq!(config.puzzle.theme_hint.as_deref(), Some("kitchens"));
}

#[test]
fn test_load_empty_toml_uses_defaults() {
    let file = write_toml("");
    let config = load_toml_config(file.path()).unwrap();
    assert!(config.anthropic_api_key.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(config.puzzle.num_groups.is_none());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_toml("num_groups = = 4");
    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = load_or_default(Some(&missing)).unwrap();
    assert!(config.model.is_none());
}

#[test]
fn test_no_path_falls_back_to_defaults() {
    let config: TomlConfig = load_or_default(None).unwrap();
    assert!(config.base_url.is_none());
}

#[test]
#[serial]
fn test_env_value_ignores_blank() {
    env::set_var("WORDGRID_TEST_BLANK", "   ");
    assert!(env_value("WORDGRID_TEST_BLANK").is_none());
    env::remove_var("WORDGRID_TEST_BLANK");
}

#[test]
#[serial]
fn test_resolve_prefers_cli_over_env_and_toml() {
    env::set_var("WORDGRID_TEST_MODEL", "from-env");

    let value = resolve_string("model", Some("from-cli"), "WORDGRID_TEST_MODEL", Some("from-toml"));
    assert_eq!(value.as_deref(), Some("from-cli"));

    env::remove_var("WORDGRID_TEST_MODEL");
}

#[test]
#[serial]
fn test_resolve_prefers_env_over_toml() {
    env::set_var("WORDGRID_TEST_MODEL", "from-env");

    let value = resolve_string("model", None, "WORDGRID_TEST_MODEL", Some("from-toml"));
    assert_eq!(value.as_deref(), Some("from-env"));

    env::remove_var("WORDGRID_TEST_MODEL");
}

#[test]
#[serial]
fn test_resolve_falls_through_to_toml() {
    env::remove_var("WORDGRID_TEST_MODEL");

    let value = resolve_string("model", Some("  "), "WORDGRID_TEST_MODEL", Some("from-toml"));
    assert_eq!(value.as_deref(), Some("from-toml"));

    let none = resolve_string("model", None, "WORDGRID_TEST_MODEL", None);
    assert!(none.is_none());
}

#[test]
#[serial]
fn test_build_filter_without_rust_log() {
    env::remove_var("RUST_LOG");
    let filter = build_filter("wordgrid_gen", "debug");
    assert!(filter.to_string().contains("wordgrid_gen=debug"));
}
