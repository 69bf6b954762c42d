use std::fs;
use std::path::Path;

use dwarfone::commands::load_entry_tree;
use dwarfone::{canonicalize_or_current, infer_project_name, parse_address, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_and_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let existing =
        canonicalize_or_current(subdir.to_str().expect("utf8 path")).expect("canonicalize");
    assert_eq!(existing, subdir.canonicalize().expect("canonicalize subdir"));

    let missing = canonicalize_or_current("does-not-exist-yet").expect("fallback");
    assert!(missing.is_absolute());
    assert!(missing.ends_with("does-not-exist-yet"));
}

#[test]
fn infer_project_name_uses_last_path_component() {
    assert_eq!(infer_project_name(Path::new("/tmp/ps2-game")), "ps2-game");
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}

#[test]
fn sha256_file_matches_known_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("abc.txt");
    fs::write(&path, b"abc").expect("write file");

    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&tmp.path().join("missing")).is_err());
}

#[test]
fn parse_address_reports_the_bad_input() {
    assert_eq!(parse_address("0x8000").expect("hex"), 0x8000);
    let err = parse_address("twelve").expect_err("not a number");
    assert!(err.to_string().contains("twelve"));
}

#[test]
fn load_entry_tree_picks_format_by_extension() {
    let tmp = tempdir().expect("tempdir");
    let json = tmp.path().join("entries.json");
    fs::write(&json, r#"{"entries":[{"id":1,"tag":"subroutine"}]}"#).expect("write json");
    let yaml = tmp.path().join("entries.yml");
    fs::write(&yaml, "entries:\n  - id: 1\n    tag: subroutine\n  - id: 2\n    tag: member\n")
        .expect("write yaml");
    let txt = tmp.path().join("entries.txt");
    fs::write(&txt, "").expect("write txt");

    assert_eq!(load_entry_tree(&json).expect("json").len(), 1);
    assert_eq!(load_entry_tree(&yaml).expect("yaml").len(), 2);
    let err = load_entry_tree(&txt).expect_err("unsupported");
    assert!(err.to_string().contains("Unsupported entry dump extension"));
}
