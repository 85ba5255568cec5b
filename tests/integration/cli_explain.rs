#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use keyscope::query::PlanRequest;
use keyscope::sql::{ColumnDescriptor, ColumnType, Expr, IndexDescriptor, TableDescriptor};
use keyscope::types::{ColumnId, IndexId, TableId};
use serde_json::Value;
use tempfile::TempDir;

fn request(filter: Option<Expr>) -> PlanRequest {
    let a = ColumnId(1);
    let b = ColumnId(2);
    PlanRequest {
        table: TableDescriptor::new(
            TableId(51),
            "t",
            vec![
                ColumnDescriptor::new(a, "a", ColumnType::Int),
                ColumnDescriptor::new(b, "b", ColumnType::Int),
            ],
            IndexDescriptor::new(IndexId(1), "primary", vec![a]).unique(),
        )
        .with_index(IndexDescriptor::new(IndexId(2), "idx_b", vec![b])),
        index: None,
        targets: vec!["a".into(), "b".into()],
        filter,
        cost: None,
    }
}

fn write_request(dir: &TempDir, request: &PlanRequest) -> PathBuf {
    let path = dir.path().join("request.json");
    fs::write(&path, serde_json::to_string_pretty(request).expect("serialize")).expect("write");
    path
}

fn b_equals_five() -> Option<Expr> {
    Some(Expr::eq(Expr::column(ColumnId(2), "b"), Expr::lit(5i64)))
}

#[test]
fn explain_json_reports_chosen_index() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_request(&dir, &request(b_equals_five()));

    let output = cargo_bin_cmd!("keyscope")
        .args(["--format", "json", "explain"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["index"], "idx_b");
    assert_eq!(json["secondary"], true);
    assert_eq!(json["selection"]["chosen"], "idx_b");
    assert_eq!(json["selection"]["candidates"][1]["index"], "primary");
    assert!(json["start_key"]
        .as_str()
        .expect("hex start key")
        .starts_with("0000003300000002"));
}

#[test]
fn explain_text_lists_candidates() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_request(&dir, &request(b_equals_five()));

    let output = cargo_bin_cmd!("keyscope")
        .arg("explain")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("chosen: idx_b"));
    assert!(text.contains("secondary: true"));
}

#[test]
fn unfiltered_request_scans_primary_index() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_request(&dir, &request(None));

    let output = cargo_bin_cmd!("keyscope")
        .args(["--format", "json", "explain"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["index"], "primary");
    assert_eq!(json["start_key"], "0000003300000001");
    assert_eq!(json["end_key"], "0000003300000002");
    assert!(json["selection"].is_null());
}

#[test]
fn cost_file_overrides_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_request(&dir, &request(b_equals_five()));
    let cost = dir.path().join("cost.toml");
    fs::write(&cost, "width_factor = 3.0\n").expect("write cost");

    // idx_b: 1 key per row * 3.0 * 1 column / 2 bounds.
    let output = cargo_bin_cmd!("keyscope")
        .args(["--format", "json", "--cost"])
        .arg(&cost)
        .arg("explain")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["index"], "idx_b");
    assert_eq!(json["selection"]["candidates"][0]["cost"], 1.5);
    // primary stays unconstrained: 2 keys per row * default penalty.
    assert_eq!(json["selection"]["candidates"][1]["cost"], 2000.0);
}

#[test]
fn cost_file_that_inverts_ranking_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_request(&dir, &request(b_equals_five()));
    let cost = dir.path().join("cost.toml");
    fs::write(&cost, "unconstrained_penalty = 0.25\n").expect("write cost");

    let output = cargo_bin_cmd!("keyscope")
        .arg("--cost")
        .arg(&cost)
        .arg("explain")
        .arg(&path)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(stderr.contains("unconstrained_penalty must exceed width_factor"));
}

#[test]
fn unknown_hint_fails() {
    let dir = TempDir::new().expect("tempdir");
    let mut req = request(b_equals_five());
    req.index = Some("missing".into());
    let path = write_request(&dir, &req);

    let output = cargo_bin_cmd!("keyscope")
        .arg("explain")
        .arg(&path)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).expect("utf8");
    assert!(stderr.contains("index 'missing' not found on table 't'"));
}
