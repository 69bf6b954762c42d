use std::fs;
use std::path::Path;

use dwarfone_core::db::{ImportRunStatus, ProjectContext};
use predicates::prelude::*;
use tempfile::tempdir;

const ENTRIES_JSON: &str = r#"{
  "entries": [
    { "id": 16, "tag": "compile_unit", "attributes": { "name": { "string": "widget.cc" } }, "children": [32, 80, 96] },
    { "id": 32, "tag": "class_type", "attributes": { "name": { "string": "Widget" } }, "children": [48] },
    {
      "id": 48,
      "tag": "subroutine",
      "attributes": { "name": { "string": "draw" }, "low_pc": { "address": 4096 }, "high_pc": { "address": 4128 } },
      "children": [64]
    },
    { "id": 64, "tag": "formal_parameter", "attributes": { "name": { "string": "scale" }, "fund_type": { "constant": 14 } } },
    {
      "id": 80,
      "tag": "global_subroutine",
      "attributes": { "name": { "string": "main" }, "low_pc": { "address": 4160 }, "high_pc": { "address": 4224 }, "fund_type": { "constant": 7 } }
    },
    { "id": 96, "tag": "global_subroutine", "attributes": { "name": { "string": "declared_only" } } }
  ]
}"#;

const CLASHING_YAML: &str = r#"
entries:
  - id: 0x10
    tag: global_subroutine
    attributes:
      name: { string: main }
      low_pc: { address: 0x2000 }
      high_pc: { address: 0x2010 }
"#;

fn init_project_with_text(root: &Path) {
    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("init-project")
        .arg("--root")
        .arg(root)
        .arg("--name")
        .arg("ImportProject")
        .assert()
        .success();
    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .args(["add-block", "--name", ".text", "--start", "0x1000", "--end", "0x3000"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
}

#[test]
fn import_creates_functions_and_records_a_run() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_project_with_text(root);
    let entries = root.join("entries.json");
    fs::write(&entries, ENTRIES_JSON).expect("write entries");

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("import")
        .arg("--root")
        .arg(root)
        .arg("--entries")
        .arg(&entries)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created: 2"))
        .stdout(predicate::str::contains("Skipped: 1"))
        .stdout(predicate::str::contains("Status:  succeeded"));

    let output = assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("list-functions")
        .arg("--root")
        .arg(root)
        .arg("--json")
        .output()
        .expect("run list-functions");
    assert!(output.status.success());
    let functions: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(functions.as_array().map(Vec::len), Some(2));
    assert_eq!(functions[0]["name"], "Widget::draw");
    assert_eq!(functions[0]["return_type"], "void");
    assert_eq!(functions[0]["params"][0]["name"], "scale");
    assert_eq!(functions[0]["params"][0]["data_type"], "float");
    assert_eq!(functions[1]["name"], "main");
    assert_eq!(functions[1]["return_type"], "int");

    let ctx = ProjectContext::from_root(root).expect("context");
    let runs = ctx.db.list_import_runs().expect("list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, ImportRunStatus::Succeeded);
    assert_eq!((runs[0].created, runs[0].renamed, runs[0].skipped, runs[0].failed), (2, 0, 1, 0));
    assert_eq!(runs[0].source_hash.as_deref().map(str::len), Some(64));
}

#[test]
fn reimport_and_conflicts_are_reported() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_project_with_text(root);
    let entries = root.join("entries.json");
    fs::write(&entries, ENTRIES_JSON).expect("write entries");
    let clashing = root.join("clash.yaml");
    fs::write(&clashing, CLASHING_YAML).expect("write yaml");

    for _ in 0..2 {
        assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
            .arg("import")
            .arg("--root")
            .arg(root)
            .arg("--entries")
            .arg(&entries)
            .assert()
            .success();
    }

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("import")
        .arg("--root")
        .arg(root)
        .arg("--entries")
        .arg(&clashing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed:  1"))
        .stdout(predicate::str::contains("Duplicate function name 'main'"))
        .stdout(predicate::str::contains("Status:  partial"));

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("list-runs")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Import runs (3)"))
        .stdout(predicate::str::contains("renamed=2"))
        .stdout(predicate::str::contains("[partial]"));

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("list-functions")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Functions (2)"))
        .stdout(predicate::str::contains("int main()"));
}

#[test]
fn import_fails_for_unreadable_dumps() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_project_with_text(root);
    let broken = root.join("broken.json");
    fs::write(&broken, "{ not json").expect("write broken");

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("import")
        .arg("--root")
        .arg(root)
        .arg("--entries")
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load entry dump"));

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("import")
        .arg("--root")
        .arg(root)
        .arg("--entries")
        .arg(root.join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read entry dump"));

    assert_cmd::cargo::cargo_bin_cmd!("dwarfone")
        .arg("list-runs")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));
}
