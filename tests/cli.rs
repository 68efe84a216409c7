mod common;

use std::fs;

use assert_cmd::Command;
use common::{CATALOGS_CSV, PRODUCTS_CSV, TestWorkspace};
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn load_command(workspace: &TestWorkspace) -> Command {
    let catalogs = workspace.write("catalogs.csv", CATALOGS_CSV);
    let products = workspace.write("products.csv", PRODUCTS_CSV);
    let mut cmd = Command::cargo_bin("catalog-loader").expect("binary exists");
    cmd.args([
        "load",
        "--catalogs",
        catalogs.to_str().unwrap(),
        "--products",
        products.to_str().unwrap(),
        "--db",
        workspace.database().to_str().unwrap(),
    ]);
    cmd
}

fn report_command(workspace: &TestWorkspace, report: &str) -> Command {
    let mut cmd = Command::cargo_bin("catalog-loader").expect("binary exists");
    cmd.args([
        "report",
        report,
        "--db",
        workspace.database().to_str().unwrap(),
    ]);
    cmd
}

#[test]
fn load_then_report_products_as_table() {
    let workspace = TestWorkspace::new();
    load_command(&workspace).assert().success();

    report_command(&workspace, "products")
        .assert()
        .success()
        .stdout(
            contains("product_name")
                .and(contains("catalog_name"))
                .and(contains("Phone"))
                .and(contains("electronics"))
                .and(contains("2024-01-05T00:00:00Z")),
        );
}

#[test]
fn report_catalogs_as_csv_file() {
    let workspace = TestWorkspace::new();
    load_command(&workspace).assert().success();

    let output = workspace.path().join("catalogs_out.csv");
    report_command(&workspace, "catalogs")
        .args(["--format", "csv", "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read report");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "catalog_id,name,created_at,updated_at",
            "1,electronics,2024-01-01T00:00:00Z,2024-01-03T00:00:00Z",
            "2,clothing,2024-01-02T00:00:00Z,2024-01-04T00:00:00Z",
        ]
    );
}

#[test]
fn report_products_as_json_with_limit() {
    let workspace = TestWorkspace::new();
    load_command(&workspace).assert().success();

    let output = report_command(&workspace, "products")
        .args(["--format", "json", "--limit", "1"])
        .output()
        .expect("run report");
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse json");
    let rows = rows.as_array().expect("json array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["product_name"], "Phone");
    assert_eq!(rows[0]["price"], 100.0);
    assert_eq!(rows[0]["catalog_name"], "electronics");
}

#[test]
fn missing_source_exits_with_path_hint() {
    let workspace = TestWorkspace::new();
    let catalogs = workspace.write("catalogs.csv", CATALOGS_CSV);
    Command::cargo_bin("catalog-loader")
        .expect("binary exists")
        .args([
            "load",
            "--catalogs",
            catalogs.to_str().unwrap(),
            "--products",
            workspace.path().join("nope.csv").to_str().unwrap(),
            "--db",
            workspace.database().to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(contains("CSV file not found. Please check the file path."));
}

#[test]
fn other_failures_report_generic_message() {
    let workspace = TestWorkspace::new();
    let catalogs = workspace.write("catalogs.csv", "");
    let products = workspace.write("products.csv", PRODUCTS_CSV);
    Command::cargo_bin("catalog-loader")
        .expect("binary exists")
        .args([
            "load",
            "--catalogs",
            catalogs.to_str().unwrap(),
            "--products",
            products.to_str().unwrap(),
            "--db",
            workspace.database().to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(contains("ETL failed").and(contains("is empty")));
}

#[test]
fn report_before_load_fails() {
    let workspace = TestWorkspace::new();
    report_command(&workspace, "catalogs")
        .assert()
        .failure()
        .stderr(contains("run `load` first"));
}

#[test]
fn report_failures_are_not_labelled_as_etl() {
    let workspace = TestWorkspace::new();
    workspace.write("etl_data.db", &"not a sqlite file\n".repeat(64));
    report_command(&workspace, "products")
        .assert()
        .code(1)
        .stderr(contains("not a database").and(contains("ETL failed").not()));
}
