use super::*;
use crate::cli::{ExportArgs, NewTablesArg};
use crate::commands::schema_export;
use fv_db::{DatabaseCore, DuckDbBackend};

async fn seed(path: &Path, sql: &str) {
    let db = DuckDbBackend::from_path(path, false).unwrap();
    db.execute_batch(sql).await.unwrap();
}

fn args(db: &Path, out: &Path, prior: Option<&Path>) -> GlobalArgs {
    GlobalArgs {
        verbose: true,
        database: Some(db.display().to_string()),
        output: Some(out.display().to_string()),
        input: prior.map(|p| p.display().to_string()),
        fail_on_mismatch: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_verify_writes_baseline_then_matches() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop.duckdb");
    seed(
        &db,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total DOUBLE);
         INSERT INTO orders VALUES (1, 9.5), (2, 3.25);",
    )
    .await;

    let first = dir.path().join("first.json");
    execute(&args(&db, &first, None)).await.unwrap();
    let baseline = RunResult::load(&first).unwrap().unwrap();
    assert_eq!(baseline.status, None);
    assert_eq!(baseline.tables["orders"].row_count, 2);

    let second = dir.path().join("second.json");
    execute(&args(&db, &second, Some(&first))).await.unwrap();
    let report = RunResult::load(&second).unwrap().unwrap();
    assert_eq!(report.status, Some(Verdict::Match));
}

#[tokio::test]
async fn test_verify_fails_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop.duckdb");
    seed(
        &db,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, total DOUBLE);
         INSERT INTO orders VALUES (1, 9.5);",
    )
    .await;
    let first = dir.path().join("first.json");
    execute(&args(&db, &first, None)).await.unwrap();

    seed(&db, "INSERT INTO orders VALUES (2, 4.0)").await;
    let second = dir.path().join("second.json");
    let err = execute(&args(&db, &second, Some(&first)))
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(1));
    let report = RunResult::load(&second).unwrap().unwrap();
    assert_eq!(report.status, Some(Verdict::NotMatch));
}

#[tokio::test]
async fn test_verify_uses_table_list_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop.duckdb");
    seed(
        &db,
        "CREATE TABLE orders (id INTEGER);
         CREATE TABLE audit (id INTEGER);",
    )
    .await;
    let list = dir.path().join("schema.csv");
    std::fs::write(&list, "orders\n").unwrap();

    let out = dir.path().join("run.json");
    let global = GlobalArgs {
        schema: Some(list.display().to_string()),
        new_tables: Some(NewTablesArg::Strict),
        ..args(&db, &out, None)
    };
    execute(&global).await.unwrap();

    let report = RunResult::load(&out).unwrap().unwrap();
    assert_eq!(report.tables.len(), 1);
    assert!(report.tables.contains_key("orders"));
}

#[tokio::test]
async fn test_table_list_names_resolve_in_configured_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop.duckdb");
    seed(
        &db,
        "CREATE SCHEMA staging;
         CREATE TABLE staging.orders (id INTEGER, total DOUBLE);
         INSERT INTO staging.orders VALUES (1, 9.5), (2, 3.0);",
    )
    .await;
    let list = dir.path().join("schema.csv");
    std::fs::write(&list, "orders\n").unwrap();

    let out = dir.path().join("run.json");
    let global = GlobalArgs {
        schema: Some(list.display().to_string()),
        db_schema: Some("staging".to_string()),
        ..args(&db, &out, None)
    };
    execute(&global).await.unwrap();

    let report = RunResult::load(&out).unwrap().unwrap();
    let orders = &report.tables["staging.orders"];
    assert_eq!(orders.row_count, 2);
    assert!(orders.warnings.is_empty(), "{:?}", orders.warnings);
}

#[tokio::test]
async fn test_exported_list_with_dotted_schema_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop.duckdb");
    seed(
        &db,
        r#"CREATE SCHEMA "my.s";
           CREATE TABLE "my.s".orders (id INTEGER PRIMARY KEY, total DOUBLE);
           INSERT INTO "my.s".orders VALUES (1, 9.5);"#,
    )
    .await;
    let out = dir.path().join("run.json");
    let base = GlobalArgs {
        db_schema: Some("my.s".to_string()),
        ..args(&db, &out, None)
    };

    let export_dir = dir.path().join("export");
    let export_args = ExportArgs {
        dir: export_dir.display().to_string(),
    };
    schema_export::execute(&export_args, &base).await.unwrap();

    let global = GlobalArgs {
        schema: Some(export_dir.join("schema.csv").display().to_string()),
        ..base
    };
    execute(&global).await.unwrap();

    let report = RunResult::load(&out).unwrap().unwrap();
    assert_eq!(report.tables.len(), 1);
    let orders = &report.tables["my.s.orders"];
    assert_eq!(orders.row_count, 1);
    assert!(orders.warnings.is_empty(), "{:?}", orders.warnings);
}

#[tokio::test]
async fn test_verify_missing_database_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run.json");
    let err = execute(&args(&dir.path().join("absent.duckdb"), &out, None))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("[D001]"));
    assert!(!out.exists());
}
