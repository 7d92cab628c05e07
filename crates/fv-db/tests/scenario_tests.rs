//! End-to-end verification runs against an in-memory DuckDB database

use fv_core::run::execute;
use fv_core::{
    load_prior, Config, RowSampler, RunContext, RunResult, TableDescriptor, TableName,
    TableSetPolicy, Verdict,
};
use fv_db::{DatabaseCatalog, DatabaseCore, DuckDbBackend};
use std::sync::Arc;

async fn shop() -> Arc<DuckDbBackend> {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE a (id INTEGER PRIMARY KEY, name VARCHAR);
         INSERT INTO a SELECT range, 'a-' || range FROM range(1, 11);
         CREATE TABLE b (id INTEGER, name VARCHAR);
         CREATE TABLE c (id INTEGER, name VARCHAR);
         INSERT INTO c SELECT range, 'c-' || range FROM range(1, 6);",
    )
    .await
    .unwrap();
    Arc::new(db)
}

async fn run(db: &Arc<DuckDbBackend>, config: Config, prior: Option<RunResult>) -> RunResult {
    let tables = db
        .list_tables(&config.database.schema, &config.identity_column)
        .await
        .unwrap();
    let ctx = RunContext::new(config, tables, prior);
    let sampler: Arc<dyn RowSampler> = db.clone();
    execute(&ctx, sampler, |_| {}).await
}

#[tokio::test]
async fn test_baseline_then_unchanged_run_matches() {
    let db = shop().await;

    let baseline = run(&db, Config::default(), None).await;
    assert_eq!(baseline.status, None);
    assert_eq!(baseline.tables.len(), 3);
    assert_eq!(baseline.tables["a"].row_count, 10);
    assert_eq!(baseline.tables["a"].max_key.as_deref(), Some("10"));
    assert_eq!(baseline.tables["b"].row_count, 0);
    assert_eq!(baseline.tables["b"].sample_digest, None);

    let second = run(&db, Config::default(), Some(baseline.clone())).await;
    assert_eq!(second.status, Some(Verdict::Match));
    for (name, fp) in &second.tables {
        assert_eq!(fp.fingerprint, baseline.tables[name].fingerprint);
    }
}

#[tokio::test]
async fn test_inserted_row_changes_only_that_table() {
    let db = shop().await;
    let baseline = run(&db, Config::default(), None).await;

    db.execute_batch("INSERT INTO c VALUES (6, 'c-6')")
        .await
        .unwrap();
    let second = run(&db, Config::default(), Some(baseline)).await;

    assert_eq!(second.status, Some(Verdict::NotMatch));
    let comparison = second.comparison.unwrap();
    assert_eq!(comparison.changed.len(), 1);
    let diff = &comparison.changed[0];
    assert_eq!(diff.name, "c");
    assert_eq!((diff.prior_row_count, diff.current_row_count), (5, 6));
    assert_eq!(diff.current_max_key.as_deref(), Some("6"));
}

#[tokio::test]
async fn test_updated_sample_row_is_detected() {
    let db = shop().await;
    let baseline = run(&db, Config::default(), None).await;

    db.execute_batch("UPDATE a SET name = 'renamed' WHERE id = 10")
        .await
        .unwrap();
    let second = run(&db, Config::default(), Some(baseline)).await;

    let comparison = second.comparison.unwrap();
    assert_eq!(comparison.changed.len(), 1);
    assert!(comparison.changed[0].is_content_only());
}

#[tokio::test]
async fn test_unreadable_table_is_degraded_not_fatal() {
    let db = shop().await;
    let tables = vec![
        TableDescriptor::bare(TableName::new("a")).with_identity_key("id"),
        TableDescriptor::bare(TableName::new("dropped")),
        TableDescriptor::bare(TableName::new("c")).with_identity_key("id"),
    ];
    let ctx = RunContext::new(Config::default(), tables, None);
    let result = execute(&ctx, db.clone(), |_| {}).await;

    assert_eq!(result.tables.len(), 3);
    let dropped = &result.tables["dropped"];
    assert_eq!(dropped.row_count, 0);
    assert!(dropped.is_degraded());
    assert_eq!(result.degraded_tables().len(), 1);
    assert_eq!(result.tables["c"].row_count, 5);
}

#[tokio::test]
async fn test_parallel_run_matches_sequential() {
    let db = shop().await;
    let sequential = run(&db, Config::default(), None).await;
    let parallel_config = Config {
        threads: 4,
        ..Config::default()
    };
    let parallel = run(&db, parallel_config, Some(sequential)).await;

    assert_eq!(parallel.status, Some(Verdict::Match));
}

#[tokio::test]
async fn test_strict_policy_flags_new_table() {
    let db = shop().await;
    let baseline = run(&db, Config::default(), None).await;

    db.execute_batch("CREATE TABLE d (id INTEGER)").await.unwrap();
    let report = run(&db, Config::default(), Some(baseline.clone())).await;
    assert_eq!(report.status, Some(Verdict::Match));
    assert_eq!(report.comparison.unwrap().added, vec!["d"]);

    let strict = Config {
        new_tables: TableSetPolicy::Strict,
        ..Config::default()
    };
    let report = run(&db, strict, Some(baseline)).await;
    assert_eq!(report.status, Some(Verdict::NotMatch));
}

#[tokio::test]
async fn test_saved_report_is_next_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports").join("run.json");
    let db = shop().await;

    let baseline = run(&db, Config::default(), None).await;
    baseline.save(&out).unwrap();

    let prior = load_prior(&out).expect("saved report should load");
    assert_eq!(prior, baseline);

    let second = run(&db, Config::default(), Some(prior)).await;
    assert_eq!(second.status, Some(Verdict::Match));
    assert!(db.ping().await.is_ok());
}
