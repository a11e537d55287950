#![allow(missing_docs)]

use std::fs;

use plantree::{
    source::{DumpSource, SqliteSource},
    AnalyserOptions, PlanAnalyser, PlanError, PlanNode, Value,
};
use rusqlite::Connection;
use tempfile::TempDir;

fn seeded_sqlite(dir: &TempDir) -> SqliteSource {
    let path = dir.path().join("shop.db");
    let conn = Connection::open(&path).expect("create sqlite");
    conn.execute_batch(
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL);
         CREATE INDEX idx_orders_customer ON orders (customer_id);
         CREATE TABLE recorded_plan (id INTEGER, select_type TEXT, tbl TEXT, est_rows INTEGER);
         INSERT INTO recorded_plan VALUES
             (1, 'SIMPLE', 'customers', 10),
             (1, 'SIMPLE', 'orders', 3),
             (NULL, 'UNION RESULT', NULL, NULL);",
    )
    .expect("seed schema");
    drop(conn);
    SqliteSource::open(&path).expect("open sqlite")
}

#[test]
fn default_directive_is_rejected_by_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let mut source = seeded_sqlite(&dir);
    let mut analyser = PlanAnalyser::new("SELECT * FROM customers");
    let err = analyser.explain(&mut source).expect_err("sqlite lacks EXPLAIN EXTENDED");
    match err {
        PlanError::SourceQueryFailure { source_name, .. } => {
            assert!(source_name.starts_with("sqlite:"), "{source_name}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(analyser.plan_nodes().is_empty());
}

#[test]
fn missing_sqlite_file_is_not_created() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("typo.db");
    let err = match SqliteSource::open(&path) {
        Ok(_) => panic!("opened a database that does not exist"),
        Err(err) => err,
    };
    match err {
        PlanError::SourceQueryFailure { source_name, .. } => {
            assert_eq!(source_name, format!("sqlite:{}", path.display()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!path.exists());
}

#[test]
fn sqlite_query_plan_rows_become_steps() {
    let dir = TempDir::new().expect("tempdir");
    let mut source = seeded_sqlite(&dir);
    let options = AnalyserOptions {
        explain_prefix: "EXPLAIN QUERY PLAN ".into(),
        ..AnalyserOptions::default()
    };
    let mut analyser = PlanAnalyser::with_options(
        "SELECT c.name, o.total FROM customers c JOIN orders o ON o.customer_id = c.id",
        options,
    );
    let forest = analyser.explain(&mut source).expect("explain query plan");
    let steps = forest.steps();
    assert!(steps.len() >= 2, "expected one row per table, got {steps:?}");
    let names: Vec<&str> = steps[0].columns().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["id", "parent", "notused", "detail"]);

    let details: Vec<String> = steps
        .iter()
        .filter_map(|s| s.column("detail").and_then(Value::as_str).map(str::to_string))
        .collect();
    assert!(details.iter().any(|d| d.contains("customers") || d.contains(" c")));
    assert!(details.iter().any(|d| d.contains("orders") || d.contains(" o")));

    let covered: usize = forest
        .roots()
        .iter()
        .map(|root| forest.leaf_steps(*root).len())
        .sum();
    assert_eq!(covered, steps.len());
}

#[test]
fn recorded_plan_table_replays_through_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let mut source = seeded_sqlite(&dir);
    let options = AnalyserOptions {
        explain_prefix: String::new(),
        ..AnalyserOptions::default()
    };
    let mut analyser = PlanAnalyser::with_options(
        "SELECT id, select_type, tbl, est_rows FROM recorded_plan ORDER BY rowid",
        options,
    );
    let forest = analyser.explain(&mut source).expect("replay recorded plan");
    assert_eq!(forest.len(), 2);
    assert!(matches!(forest.node(forest.roots()[0]), PlanNode::Join { .. }));

    let leftover = forest.leaf_step(forest.roots()[1]).expect("leftover leaf");
    assert_eq!(leftover.group_id(), None);
    assert_eq!(leftover.column("tbl"), Some(&Value::Null));
    assert_eq!(leftover.column("select_type"), Some(&Value::from("UNION RESULT")));
}

#[test]
fn dump_files_load_by_extension() {
    let dir = TempDir::new().expect("tempdir");
    let csv_path = dir.path().join("plan.csv");
    fs::write(
        &csv_path,
        "id,select_type,table\n1,SIMPLE,a\n1,SIMPLE,b\n2,SUBQUERY,c\n",
    )
    .expect("write csv");
    let json_path = dir.path().join("plan.json");
    fs::write(
        &json_path,
        r#"[{"id":1,"select_type":"SIMPLE","table":"a"},
            {"id":1,"select_type":"SIMPLE","table":"b"},
            {"id":2,"select_type":"SUBQUERY","table":"c"}]"#,
    )
    .expect("write json");

    let csv = DumpSource::load(&csv_path).expect("load csv");
    let json = DumpSource::load(&json_path).expect("load json");
    assert_eq!(csv.rows(), json.rows());

    let mut source = csv;
    let mut analyser = PlanAnalyser::new("select * from a, b where b.x in (select x from c)");
    let forest = analyser.explain(&mut source).expect("explain");
    assert_eq!(forest.len(), 2);
}

#[test]
fn missing_dump_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.csv");
    let err = DumpSource::load(&path).expect_err("missing file");
    match err {
        PlanError::Dump { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}
