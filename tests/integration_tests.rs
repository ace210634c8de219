//! Integration tests for the rjq CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. Each
//! test runs in its own temp directory with its own data directory and
//! config file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get an rjq command isolated to `tmp`
fn rjq(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rjq").unwrap();
    cmd.current_dir(tmp.path())
        .env("RJQ_CONFIG", tmp.path().join("config.yaml"))
        .env_remove("RJQ_DATA_DIR")
        .env_remove("RJQ_LOG_LEVEL")
        .arg("--data-dir")
        .arg(data_dir(tmp));
    cmd
}

fn data_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("data")
}

/// Sphere Type-A/S100 at 120.00 and flange Type-B/F200 at 30.00
fn seed_catalog(tmp: &TempDir) {
    rjq(tmp).args(["sphere", "type", "add", "Type-A"]).assert().success();
    rjq(tmp)
        .args(["sphere", "model", "add", "Type-A", "S100", "--price", "120"])
        .assert()
        .success();
    rjq(tmp).args(["flange", "type", "add", "Type-B"]).assert().success();
    rjq(tmp)
        .args(["flange", "model", "add", "Type-B", "F200", "--price", "30"])
        .assert()
        .success();
}

fn add_example_line(tmp: &TempDir) {
    rjq(tmp)
        .args([
            "quote",
            "add",
            "--sphere-type",
            "Type-A",
            "--sphere-model",
            "S100",
            "--flange-type",
            "Type-B",
            "--flange-model",
            "F200",
            "--flange-qty",
            "2",
            "--qty",
            "3",
        ])
        .assert()
        .success();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rubber Joint Quoter"))
        .stdout(predicate::str::contains("sphere"))
        .stdout(predicate::str::contains("quote"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rjq"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rjq"));
}

// ============================================================================
// Catalog Family Tests
// ============================================================================

#[test]
fn test_type_add_and_list() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["sphere", "type", "add", "  Type-A  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added sphere type Type-A"));

    rjq(&tmp)
        .args(["sphere", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Type-A\t0"));

    // Families are independent
    rjq(&tmp)
        .args(["flange", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No flange types defined"));
}

#[test]
fn test_type_add_duplicate_fails() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp).args(["flange", "type", "add", "Type-B"]).assert().success();
    rjq(&tmp)
        .args(["flange", "type", "add", "Type-B"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_type_add_blank_name_fails() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["sphere", "type", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_model_add_requires_existing_type() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["sphere", "model", "add", "Nope", "S1", "--price", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_model_add_rejects_bad_price() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp).args(["sphere", "type", "add", "Type-A"]).assert().success();
    rjq(&tmp)
        .args(["sphere", "model", "add", "Type-A", "S1", "--price", "cheap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid number"));
}

#[test]
fn test_model_list_and_price() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);

    rjq(&tmp)
        .args(["sphere", "list", "Type-A", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MODEL,PRICE"))
        .stdout(predicate::str::contains("S100,120.00"));

    rjq(&tmp)
        .args(["flange", "price", "Type-B", "F200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30.00"));
}

#[test]
fn test_price_of_unknown_model_is_zero() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args(["sphere", "price", "Type-A", "S999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.00"))
        .stderr(predicate::str::contains("not in the catalog"));
}

#[test]
fn test_list_unknown_type_fails() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["sphere", "list", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_type_rm_requires_confirmation() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args(["sphere", "type", "rm", "Type-A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    // Still there
    rjq(&tmp)
        .args(["sphere", "price", "Type-A", "S100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("120.00"));
}

#[test]
fn test_type_rm_cascades_to_models() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args(["sphere", "type", "rm", "Type-A", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 model(s) removed"));

    rjq(&tmp)
        .args(["sphere", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sphere types defined"));
}

#[test]
fn test_model_rm() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args(["flange", "model", "rm", "Type-B", "F200", "-y"])
        .assert()
        .success();
    rjq(&tmp)
        .args(["flange", "model", "rm", "Type-B", "F200", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_catalog_is_persisted_in_data_dir() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);

    let content = fs::read_to_string(data_dir(&tmp).join("product_data.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["sphereTypes"], serde_json::json!(["Type-A"]));
    assert_eq!(doc["sphereModels"]["Type-A"][0]["model"], "S100");
    assert_eq!(doc["flangeModels"]["Type-B"][0]["price"], 30.0);
    assert_eq!(doc["version"], "1.0");
}

#[test]
fn test_catalog_show_json() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);

    let output = rjq(&tmp)
        .args(["catalog", "show", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["family"], "sphere");
    assert_eq!(rows[1]["type"], "Type-B");
}

// ============================================================================
// Import / Export Tests
// ============================================================================

#[test]
fn test_export_then_import_into_fresh_data_dir() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args(["catalog", "export", "backup"])
        .assert()
        .success();
    let backup = tmp.path().join("backup.json");
    assert!(backup.exists());

    let other = TempDir::new().unwrap();
    rjq(&other)
        .args(["catalog", "import"])
        .arg(&backup)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 sphere type(s) and 1 flange type(s)"));

    rjq(&other)
        .args(["flange", "price", "Type-B", "F200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30.00"));
}

#[test]
fn test_import_missing_field_leaves_catalog_unchanged() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);

    let partial = tmp.path().join("partial.json");
    fs::write(
        &partial,
        r#"{"sphereTypes": [], "sphereModels": {}, "flangeTypes": []}"#,
    )
    .unwrap();

    rjq(&tmp)
        .args(["catalog", "import"])
        .arg(&partial)
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("flangeModels"));

    rjq(&tmp)
        .args(["sphere", "price", "Type-A", "S100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("120.00"));
}

#[test]
fn test_import_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["catalog", "import", "nowhere.json", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Quotation Tests
// ============================================================================

#[test]
fn test_quote_price_example() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args([
            "quote",
            "price",
            "--sphere-type",
            "Type-A",
            "--sphere-model",
            "S100",
            "--flange-type",
            "Type-B",
            "--flange-model",
            "F200",
            "--flange-qty",
            "2",
            "-q",
        ])
        .assert()
        .success()
        .stdout("180.00\n");
}

#[test]
fn test_quote_price_defaults_to_two_flanges() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args([
            "quote",
            "price",
            "--sphere-type",
            "Type-A",
            "--sphere-model",
            "S100",
            "--flange-type",
            "Type-B",
            "--flange-model",
            "F200",
            "-q",
        ])
        .assert()
        .success()
        .stdout("180.00\n");
}

#[test]
fn test_quote_add_and_list() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);

    let quotation = tmp.path().join("quotation.json");
    assert!(quotation.exists());

    let output = rjq(&tmp)
        .args(["quote", "list", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["totalPrice"], 540.0);
    assert_eq!(doc["quotationItems"][0]["jointPrice"], 180.0);
    assert_eq!(doc["quotationItems"][0]["flangeQuantity"], 2);
    assert_eq!(doc["quotationItems"][0]["jointQuantity"], 3);

    rjq(&tmp)
        .args(["quote", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Type-A - S100"))
        .stdout(predicate::str::contains("1 line(s), total 540.00"));
}

#[test]
fn test_quote_add_unknown_model_fails() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args([
            "quote",
            "add",
            "--sphere-type",
            "Type-A",
            "--sphere-model",
            "S404",
            "--flange-type",
            "Type-B",
            "--flange-model",
            "F200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("S404"));
    assert!(!tmp.path().join("quotation.json").exists());
}

#[test]
fn test_quote_add_rejects_zero_quantity() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    rjq(&tmp)
        .args([
            "quote",
            "add",
            "--sphere-type",
            "Type-A",
            "--sphere-model",
            "S100",
            "--flange-type",
            "Type-B",
            "--flange-model",
            "F200",
            "--qty",
            "0",
        ])
        .assert()
        .failure();
}

#[test]
fn test_flange_limit_is_configurable() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    let args = [
        "quote",
        "price",
        "--sphere-type",
        "Type-A",
        "--sphere-model",
        "S100",
        "--flange-type",
        "Type-B",
        "--flange-model",
        "F200",
        "--flange-qty",
        "5",
        "-q",
    ];

    rjq(&tmp)
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit of 4"));

    rjq(&tmp)
        .args(["config", "set", "max_flange_quantity", "0"])
        .assert()
        .success();

    rjq(&tmp).args(args).assert().success().stdout("270.00\n");
}

#[test]
fn test_quote_keeps_prices_after_catalog_change() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);

    rjq(&tmp)
        .args(["sphere", "model", "rm", "Type-A", "S100", "--yes"])
        .assert()
        .success();
    rjq(&tmp)
        .args(["sphere", "model", "add", "Type-A", "S100", "--price", "999"])
        .assert()
        .success();

    rjq(&tmp)
        .args(["quote", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("180.00\t540.00"));
}

#[test]
fn test_quote_rm_out_of_range() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);

    rjq(&tmp)
        .args(["quote", "rm", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no line 2"));
    rjq(&tmp)
        .args(["quote", "rm", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start at 1"));

    rjq(&tmp)
        .args(["quote", "rm", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total 0.00"));
    rjq(&tmp)
        .args(["quote", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The quotation is empty"));
}

#[test]
fn test_quote_clear() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);
    add_example_line(&tmp);

    rjq(&tmp)
        .args(["quote", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    rjq(&tmp)
        .args(["quote", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared"));
    rjq(&tmp)
        .args(["quote", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already empty"));
}

#[test]
fn test_quote_save_and_load() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);

    rjq(&tmp)
        .args(["quote", "save", "saved"])
        .assert()
        .success();
    assert!(tmp.path().join("saved.json").exists());

    rjq(&tmp)
        .args(["quote", "load", "saved.json", "--file", "other.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 line(s)"));

    rjq(&tmp)
        .args(["quote", "list", "--file", "other.json", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("540.00"));
}

#[test]
fn test_quote_load_rejects_file_without_items() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.json"), r#"{"totalPrice": 10}"#).unwrap();
    rjq(&tmp)
        .args(["quote", "load", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quotationItems"));
    assert!(!tmp.path().join("quotation.json").exists());
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_markdown() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);
    rjq(&tmp)
        .args(["config", "set", "company", "Acme Rubber"])
        .assert()
        .success();

    rjq(&tmp)
        .args(["quote", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Rubber Joint Quotation"))
        .stdout(predicate::str::contains("**Acme Rubber**"))
        .stdout(predicate::str::contains("Flange Qty"))
        .stdout(predicate::str::contains("540.00"))
        .stdout(predicate::str::contains("Notes:"))
        .stdout(predicate::str::contains("Prices are in CNY."));
}

#[test]
fn test_report_csv_to_file() {
    let tmp = TempDir::new().unwrap();
    seed_catalog(&tmp);
    add_example_line(&tmp);

    rjq(&tmp)
        .args(["quote", "report", "--csv", "-o", "report.csv"])
        .assert()
        .success();

    let csv = fs::read_to_string(tmp.path().join("report.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "No.,Sphere,Flange,Flange Qty,Joint Qty,Unit Price,Subtotal"
    );
    assert_eq!(lines[1], "1,Type-A - S100,Type-B - F200,2,3,180.00,540.00");
    assert_eq!(lines[2], ",,,,,Total,540.00");
}

#[test]
fn test_report_empty_quotation_fails() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["quote", "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quotation is empty"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_show_unset() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["config", "set", "currency", "USD"])
        .assert()
        .success();
    rjq(&tmp)
        .args(["config", "show", "currency"])
        .assert()
        .success()
        .stdout("USD\n");
    rjq(&tmp)
        .args(["config", "unset", "currency"])
        .assert()
        .success();
    rjq(&tmp)
        .args(["config", "show", "currency"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));
}

#[test]
fn test_config_path_honors_env() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.yaml"),
        "max_flange_quantity: four\ncurrency: [\n",
    )
    .unwrap();
    rjq(&tmp)
        .args(["sphere", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sphere types defined."))
        .stderr(
            predicate::str::contains("using defaults")
                .and(predicate::str::contains("config.yaml")),
        );
}

#[test]
fn test_log_file_written_to_data_dir() {
    let tmp = TempDir::new().unwrap();
    rjq(&tmp).args(["sphere", "list"]).assert().success();
    let logs = data_dir(&tmp).join("logs");
    let has_log = fs::read_dir(&logs)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().starts_with("rjq"));
    assert!(has_log);
}
