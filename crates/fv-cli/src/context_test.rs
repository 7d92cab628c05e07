use super::*;
use crate::cli::NewTablesArg;
use fv_core::TableSetPolicy;

#[test]
fn test_defaults_without_config_file() {
    let config = resolve_config(&GlobalArgs::default()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "database": { "path": "file.duckdb", "schema": "staging" },
            "in": "file-in.json",
            "out": "file-out.json",
            "threads": 2
        }"#,
    )
    .unwrap();

    let args = GlobalArgs {
        config: Some(path.display().to_string()),
        output: Some("flag-out.json".to_string()),
        database: Some("flag.duckdb".to_string()),
        threads: Some(8),
        new_tables: Some(NewTablesArg::Strict),
        ..Default::default()
    };
    let config = resolve_config(&args).unwrap();

    assert_eq!(config.input.as_deref(), Some("file-in.json"));
    assert_eq!(config.output.as_deref(), Some("flag-out.json"));
    assert_eq!(config.database.path.as_deref(), Some("flag.duckdb"));
    assert_eq!(config.database.schema, "staging");
    assert_eq!(config.threads, 8);
    assert_eq!(config.new_tables, TableSetPolicy::Strict);
}

#[test]
fn test_empty_flags_are_ignored() {
    let mut config = Config {
        input: Some("kept.json".to_string()),
        ..Config::default()
    };
    let args = GlobalArgs {
        input: Some(String::new()),
        ..Default::default()
    };
    apply_overrides(&mut config, &args);
    assert_eq!(config.input.as_deref(), Some("kept.json"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let args = GlobalArgs {
        config: Some("/nonexistent/fv.json".to_string()),
        ..Default::default()
    };
    let err = resolve_config(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("[E001]"));
}

#[tokio::test]
async fn test_runtime_context_connects() {
    let args = GlobalArgs {
        database: Some(":memory:".to_string()),
        ..Default::default()
    };
    let ctx = RuntimeContext::new(&args).await.unwrap();
    assert_eq!(ctx.config.database.path.as_deref(), Some(":memory:"));
}

#[tokio::test]
async fn test_runtime_context_rejects_zero_threads() {
    let args = GlobalArgs {
        database: Some(":memory:".to_string()),
        threads: Some(0),
        ..Default::default()
    };
    assert!(RuntimeContext::new(&args).await.is_err());
}

#[tokio::test]
async fn test_flag_repairs_invalid_file_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "threads": 0 }"#).unwrap();

    let args = GlobalArgs {
        config: Some(path.display().to_string()),
        database: Some(":memory:".to_string()),
        threads: Some(4),
        ..Default::default()
    };
    let ctx = RuntimeContext::new(&args).await.unwrap();
    assert_eq!(ctx.config.threads, 4);
}

#[tokio::test]
async fn test_legacy_database_name_needs_no_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "database": { "host": "localhost", "port": "3306", "database": ":memory:" } }"#,
    )
    .unwrap();

    let args = GlobalArgs {
        config: Some(path.display().to_string()),
        ..Default::default()
    };
    let ctx = RuntimeContext::new(&args).await.unwrap();
    assert_eq!(ctx.config.database.database_path(), Some(":memory:"));
}
