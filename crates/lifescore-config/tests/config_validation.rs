//! Config validation tests for lifescore-config.
// crates/lifescore-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate engine, store, and audit section constraints.
// Purpose: Ensure configuration fails closed on inconsistent settings.
// =============================================================================

use std::path::PathBuf;

use common::TestResult;
use common::assert_invalid;
use lifescore_config::AuditSinkType;
use lifescore_config::LifeScoreConfig;
use lifescore_config::ProfileStoreType;
use lifescore_store_sqlite::SqliteStoreMode;
use lifescore_store_sqlite::SqliteSyncMode;

mod common;

#[test]
fn minimal_config_uses_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.engine.starting_lifescore != 0 {
        return Err("starting_lifescore should default to 0".to_string());
    }
    if config.store.store_type != ProfileStoreType::Memory {
        return Err("store should default to memory".to_string());
    }
    if config.audit.sink != AuditSinkType::None {
        return Err("audit sink should default to none".to_string());
    }
    if config.store.sqlite_config().is_some() {
        return Err("memory store has no sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn catalog_section_is_required() -> TestResult {
    match common::config_from_toml("") {
        Ok(_) => Err("config without catalog should not parse".to_string()),
        Err(_) => Ok(()),
    }
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    let parsed = common::config_from_toml(
        "[catalog]\npath = \"catalog.json\"\n[engine]\nstarting_score = 5\n",
    );
    match parsed {
        Ok(_) => Err("unknown engine field should not parse".to_string()),
        Err(_) => Ok(()),
    }
}

#[test]
fn starting_lifescore_is_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.engine.starting_lifescore = 1_000;
    config.validate().map_err(|err| err.to_string())?;
    config.engine.starting_lifescore = 1_001;
    assert_invalid(config.validate(), "engine.starting_lifescore must be at most 1000")
}

#[test]
fn engine_settings_convert_to_engine_config() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.engine.starting_lifescore = 400;
    if config.engine.engine_config().starting_lifescore != 400 {
        return Err("engine config should carry the starting LifeScore".to_string());
    }
    Ok(())
}

#[test]
fn catalog_path_must_be_non_empty() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.catalog.path = PathBuf::from(" ");
    assert_invalid(config.validate(), "catalog.path must be non-empty")
}

#[test]
fn memory_store_rejects_path() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.path = Some(PathBuf::from("profiles.sqlite"));
    assert_invalid(config.validate(), "memory store must not set path")
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.store_type = ProfileStoreType::Sqlite;
    assert_invalid(config.validate(), "sqlite store requires path")
}

#[test]
fn sqlite_store_rejects_zero_max_versions() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.store_type = ProfileStoreType::Sqlite;
    config.store.path = Some(PathBuf::from("profiles.sqlite"));
    config.store.max_versions = Some(0);
    assert_invalid(config.validate(), "store max_versions must be greater than zero")
}

#[test]
fn sqlite_store_rejects_excessive_busy_timeout() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.store_type = ProfileStoreType::Sqlite;
    config.store.path = Some(PathBuf::from("profiles.sqlite"));
    config.store.busy_timeout_ms = 600_000;
    assert_invalid(config.validate(), "store busy_timeout_ms must be at most")
}

#[test]
fn sqlite_store_settings_parse() -> TestResult {
    let config = common::config_from_toml(
        r#"
[catalog]
path = "catalog.json"

[store]
type = "sqlite"
path = "profiles.sqlite"
busy_timeout_ms = 2000
journal_mode = "delete"
sync_mode = "normal"
max_versions = 10
"#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("sqlite config missing")?;
    if sqlite.path != PathBuf::from("profiles.sqlite")
        || sqlite.busy_timeout_ms != 2_000
        || sqlite.journal_mode != SqliteStoreMode::Delete
        || sqlite.sync_mode != SqliteSyncMode::Normal
        || sqlite.max_versions != Some(10)
    {
        return Err("sqlite config does not match the store section".to_string());
    }
    Ok(())
}

#[test]
fn file_audit_requires_path() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkType::File;
    assert_invalid(config.validate(), "file audit sink requires path")
}

#[test]
fn audit_path_requires_file_sink() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkType::Stderr;
    config.audit.path = Some(PathBuf::from("audit.jsonl"));
    assert_invalid(config.validate(), "audit path requires the file sink")
}

#[test]
fn load_resolves_paths_relative_to_config_file() -> TestResult {
    let temp = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = temp.path().join("lifescore.toml");
    std::fs::write(
        &path,
        "[catalog]\npath = \"catalog.json\"\n[audit]\nsink = \"file\"\npath = \
         \"/var/log/lifescore.jsonl\"\n",
    )
    .map_err(|err| err.to_string())?;
    let config = LifeScoreConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.catalog.path != temp.path().join("catalog.json") {
        return Err(format!("catalog path not rebased: {}", config.catalog.path.display()));
    }
    if config.audit.path != Some(PathBuf::from("/var/log/lifescore.jsonl")) {
        return Err("absolute audit path should be kept".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let temp = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = temp.path().join("lifescore.toml");
    let mut content = "[catalog]\npath = \"catalog.json\"\n".to_string();
    content.push_str(&"#".repeat(lifescore_config::MAX_CONFIG_FILE_SIZE));
    std::fs::write(&path, content).map_err(|err| err.to_string())?;
    match LifeScoreConfig::load(Some(&path)) {
        Err(err) if err.to_string().contains("size limit") => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("oversized config should fail".to_string()),
    }
}

#[test]
fn load_reports_missing_file() -> TestResult {
    let temp = tempfile::tempdir().map_err(|err| err.to_string())?;
    match LifeScoreConfig::load(Some(&temp.path().join("missing.toml"))) {
        Err(lifescore_config::ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("missing config should fail".to_string()),
    }
}
