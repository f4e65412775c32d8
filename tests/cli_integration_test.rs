//! Integration tests driving the schema-atlas binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_schema-atlas")
        .unwrap_or_else(|_| "target/debug/schema-atlas".to_string())
}

const SNAPSHOT: &str = r#"{
  "tables": [
    {"name": "users", "schema": "public", "columns": [
      {"name": "id", "dataType": "integer", "isPrimaryKey": true},
      {"name": "email", "dataType": "varchar"}
    ]},
    {"name": "orders", "schema": "public", "columns": [
      {"name": "id", "dataType": "integer", "isPrimaryKey": true},
      {"name": "user_id", "dataType": "integer", "isForeignKey": true,
       "references": {"table": "users", "column": "id"}}
    ]},
    {"name": "order_items", "schema": "public", "columns": [
      {"name": "order_id", "dataType": "integer", "isForeignKey": true,
       "references": {"table": "orders", "column": "id"}},
      {"name": "product_id", "dataType": "integer", "isForeignKey": true,
       "references": {"table": "products", "column": "id"}}
    ]},
    {"name": "products", "schema": "public", "columns": [
      {"name": "id", "dataType": "integer", "isPrimaryKey": true}
    ]},
    {"name": "categories", "schema": "public", "columns": [
      {"name": "id", "dataType": "integer", "isPrimaryKey": true},
      {"name": "parent_id", "dataType": "integer", "isForeignKey": true,
       "references": {"table": "categories", "column": "id"}}
    ]}
  ],
  "foreignKeys": [
    {"constraintName": "fk_orders_user", "sourceTable": "orders", "sourceColumn": "user_id",
     "targetTable": "users", "targetColumn": "id"},
    {"constraintName": "fk_items_order", "sourceTable": "order_items", "sourceColumn": "order_id",
     "targetTable": "orders", "targetColumn": "id"},
    {"constraintName": "fk_items_product", "sourceTable": "order_items", "sourceColumn": "product_id",
     "targetTable": "products", "targetColumn": "id"},
    {"constraintName": "fk_categories_parent", "sourceTable": "categories", "sourceColumn": "parent_id",
     "targetTable": "categories", "targetColumn": "id"}
  ]
}"#;

fn create_snapshot(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("schema.json");
    fs::write(&path, SNAPSHOT).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

#[test]
fn test_analyze_text() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&["analyze", snapshot.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tables:          5"));
    assert!(stdout.contains("categories -> categories (self-reference)"));
}

#[test]
fn test_analyze_json() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let json = run_json(&["analyze", snapshot.to_str().unwrap(), "--json"]);
    assert_eq!(json["tables"], 5);
    assert_eq!(json["foreign_keys"], 4);
    assert_eq!(json["self_references"], 1);
    assert_eq!(json["level_count"], 3);
}

#[test]
fn test_levels_json() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let json = run_json(&["levels", snapshot.to_str().unwrap(), "--json"]);
    assert_eq!(
        json["levels"][0]["tables"],
        serde_json::json!(["users", "products", "categories"])
    );
    assert_eq!(json["levels"][2]["tables"], serde_json::json!(["order_items"]));
}

#[test]
fn test_clusters_with_exclude() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let json = run_json(&[
        "clusters",
        snapshot.to_str().unwrap(),
        "--exclude",
        "order_items",
        "--json",
    ]);
    // users+orders, products, categories
    assert_eq!(json["cluster_count"], 3);
}

#[test]
fn test_hierarchy_text_tree() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&[
        "hierarchy",
        snapshot.to_str().unwrap(),
        "--tables",
        "users,orders,order_items",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "users\n└── orders\n    └── order_items\n");
}

#[test]
fn test_hierarchy_empty_view_fails() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&[
        "hierarchy",
        snapshot.to_str().unwrap(),
        "--filter",
        "no_such_table",
    ]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no hierarchy available"));
}

#[test]
fn test_matrix_focus() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let json = run_json(&[
        "matrix",
        snapshot.to_str().unwrap(),
        "--focus",
        "orders",
        "--json",
    ]);
    assert_eq!(
        json["tables"],
        serde_json::json!(["users", "orders", "order_items"])
    );
    assert_eq!(json["total_weight"], 2);
}

#[test]
fn test_focus_unknown_table_fails() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&["matrix", snapshot.to_str().unwrap(), "--focus", "ghosts"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_layout_layered_lr_to_file() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let out = dir.path().join("out/layout.json");

    let output = run(&[
        "layout",
        snapshot.to_str().unwrap(),
        "--direction",
        "lr",
        "--json",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["engine"], "layered");
    assert_eq!(json["direction"], "lr");
    assert_eq!(json["nodes"].as_array().unwrap().len(), 5);
}

#[test]
fn test_layout_force_deterministic() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let args = [
        "layout",
        snapshot.to_str().unwrap(),
        "--engine",
        "force",
        "--iterations",
        "40",
        "--json",
    ];

    let first = run_json(&args);
    let second = run_json(&args);
    assert_eq!(first, second);
    assert_eq!(first["iterations"], 40);
}

#[test]
fn test_config_overrides() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);
    let config = dir.path().join("atlas.yaml");
    fs::write(
        &config,
        "layered:\n  direction: lr\nclusters:\n  rules:\n    - name: Commerce\n      keywords: [order]\n",
    )
    .unwrap();

    let layout = run_json(&[
        "layout",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(layout["direction"], "lr");

    // CLI flag wins over config
    let layout = run_json(&[
        "layout",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--direction",
        "tb",
        "--json",
    ]);
    assert_eq!(layout["direction"], "tb");

    let clusters = run_json(&[
        "clusters",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]);
    assert_eq!(clusters["clusters"][0]["name"], "Commerce");
}

#[test]
fn test_yaml_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.yaml");
    fs::write(
        &path,
        r#"
tables:
  - name: a
  - name: b
foreignKeys:
  - sourceTable: b
    sourceColumn: a_id
    targetTable: a
    targetColumn: id
"#,
    )
    .unwrap();

    let json = run_json(&["levels", path.to_str().unwrap(), "--json"]);
    assert_eq!(json["level_count"], 2);
}

#[test]
fn test_missing_input_file() {
    let output = run(&["analyze", "/nonexistent/schema.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_invalid_engine() {
    let dir = TempDir::new().unwrap();
    let snapshot = create_snapshot(&dir);

    let output = run(&["layout", snapshot.to_str().unwrap(), "--engine", "radial"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown engine"));
}

#[test]
fn test_completions() {
    let output = run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("schema-atlas"));
}

#[test]
fn test_dangling_key_warning_printed_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dangling.json");
    fs::write(
        &path,
        r#"{"tables": [{"name": "a"}, {"name": "b"}],
            "foreignKeys": [{"constraintName": "fk_x", "sourceTable": "b", "sourceColumn": "ghost_id",
                             "targetTable": "ghost", "targetColumn": "id"}]}"#,
    )
    .unwrap();

    let output = run(&["levels", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr
            .matches("foreign key 'fk_x' references unknown table 'ghost'")
            .count(),
        1,
        "stderr was: {}",
        stderr
    );
}
