//! Integration tests for the sflist CLI.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use sflist_core::test_utils::ArchiveBuilder;
use sflist_core::test_utils::EntryField;
use sflist_core::test_utils::bookmark_blob;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn sflist_cmd() -> Command {
    Command::cargo_bin("sflist").unwrap()
}

/// Writes a recents-list fixture holding bookmarks for the given paths.
fn write_recents(dir: &Path, paths: &[&Path]) -> PathBuf {
    let mut builder = ArchiveBuilder::new();
    for path in paths {
        builder = builder.add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(path)))]);
    }
    let file = dir.join("com.example.app.sfl3");
    fs::write(&file, builder.build()).unwrap();
    file
}

#[test]
fn test_version() {
    sflist_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sflist"));
}

#[test]
fn test_help() {
    sflist_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("read"))
        .stdout(predicate::str::contains("recent"));
}

#[test]
fn test_read_requires_source() {
    sflist_cmd().arg("read").assert().failure();
}

#[test]
fn test_read_missing_file_fails() {
    sflist_cmd()
        .args(["read", "/nonexistent/recents.sfl3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recents list"));
}

#[test]
fn test_read_prints_resolved_paths() {
    let temp = TempDir::new().unwrap();
    let doc = temp.path().join("report.txt");
    fs::write(&doc, b"x").unwrap();
    let recents = write_recents(temp.path(), &[&doc]);

    sflist_cmd()
        .arg("read")
        .arg(&recents)
        .assert()
        .success()
        .stdout(predicate::str::contains(doc.to_str().unwrap()));
}

#[test]
fn test_read_empty_list_succeeds() {
    let temp = TempDir::new().unwrap();
    let recents = write_recents(temp.path(), &[]);

    sflist_cmd().arg("read").arg(&recents).assert().success();
}

#[test]
fn test_read_corrupt_file_fails() {
    let temp = TempDir::new().unwrap();
    let recents = temp.path().join("junk.sfl3");
    fs::write(&recents, b"not a plist at all").unwrap();

    sflist_cmd()
        .arg("read")
        .arg(&recents)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recents list"));
}

#[test]
fn test_read_json_output() {
    let temp = TempDir::new().unwrap();
    let doc = temp.path().join("notes.md");
    fs::write(&doc, b"x").unwrap();
    let recents = write_recents(temp.path(), &[&doc]);

    let output = sflist_cmd()
        .args(["--json", "read"])
        .arg(&recents)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "read");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["paths"][0], doc.to_str().unwrap());
}

#[test]
fn test_sync_and_recent_roundtrip() {
    let temp = TempDir::new().unwrap();
    let doc = temp.path().join("draft.doc");
    fs::write(&doc, b"x").unwrap();
    let recents = write_recents(temp.path(), &[&doc]);
    let db = temp.path().join("records.db");

    sflist_cmd()
        .arg("sync")
        .arg(&recents)
        .arg("--store")
        .arg(&db)
        .assert()
        .success();

    sflist_cmd()
        .args(["recent", "--store"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains(doc.to_str().unwrap()));
}

#[test]
fn test_pin_untracked_path_fails() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("records.db");

    sflist_cmd()
        .args(["pin", "/never/seen", "--store"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not tracked"));
}

#[test]
fn test_pin_and_unpin_tracked_path() {
    let temp = TempDir::new().unwrap();
    let doc = temp.path().join("pinned.txt");
    fs::write(&doc, b"x").unwrap();
    let recents = write_recents(temp.path(), &[&doc]);
    let db = temp.path().join("records.db");

    sflist_cmd()
        .arg("sync")
        .arg(&recents)
        .arg("--store")
        .arg(&db)
        .assert()
        .success();

    sflist_cmd()
        .arg("pin")
        .arg(doc.to_str().unwrap())
        .arg("--store")
        .arg(&db)
        .assert()
        .success();

    sflist_cmd()
        .arg("unpin")
        .arg(doc.to_str().unwrap())
        .arg("--store")
        .arg(&db)
        .assert()
        .success();
}

#[test]
fn test_clear_requires_confirmation() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("records.db");

    sflist_cmd()
        .args(["clear", "--store"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_clear_with_confirmation() {
    let temp = TempDir::new().unwrap();
    let doc = temp.path().join("gone.txt");
    fs::write(&doc, b"x").unwrap();
    let recents = write_recents(temp.path(), &[&doc]);
    let db = temp.path().join("records.db");

    sflist_cmd()
        .arg("sync")
        .arg(&recents)
        .arg("--store")
        .arg(&db)
        .assert()
        .success();

    sflist_cmd()
        .args(["clear", "--yes", "--store"])
        .arg(&db)
        .assert()
        .success();

    sflist_cmd()
        .args(["recent", "--store"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("gone.txt").not());
}

#[test]
fn test_quiet_and_verbose_conflict() {
    sflist_cmd()
        .args(["--quiet", "--verbose", "recent"])
        .assert()
        .failure();
}

#[test]
fn test_completion_bash() {
    sflist_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sflist"));
}
