//! Integration tests for sflist-core.
//!
//! These tests verify the end-to-end decode pipeline against real files and
//! the store workflows that consume its output.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use chrono::TimeZone;
use chrono::Utc;
use sflist_core::BookmarkStore;
use sflist_core::DecodeConfig;
use sflist_core::RecordStore;
use sflist_core::formats::bookmark;
use sflist_core::read_recents_bytes;
use sflist_core::read_recents_bytes_with;
use sflist_core::read_recents_file;
use sflist_core::test_utils::ArchiveBuilder;
use sflist_core::test_utils::EntryField;
use sflist_core::test_utils::bookmark_blob;
use tempfile::TempDir;

#[test]
fn test_full_decode_from_file() {
    let temp = TempDir::new().unwrap();
    let project_a = temp.path().join("Projects/A");
    let project_b = temp.path().join("Projects/B");
    fs::create_dir_all(&project_a).unwrap();
    fs::create_dir_all(&project_b).unwrap();

    let bytes = ArchiveBuilder::new()
        .add_entry(&[
            ("Bookmark", EntryField::Blob(bookmark_blob(&project_a))),
            ("Name", EntryField::Text("A".to_string())),
        ])
        .add_entry(&[("Other", EntryField::Int(1))])
        .add_entry(&[("Bookmark", EntryField::Blob(vec![0xFF, 0xFF]))])
        .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&project_b)))])
        .build();

    let file = temp.path().join("recents.sfl3");
    fs::write(&file, &bytes).unwrap();

    let paths = read_recents_file(&file).expect("decode should succeed");
    assert_eq!(
        paths,
        vec![
            project_a.to_string_lossy().into_owned(),
            project_b.to_string_lossy().into_owned(),
        ]
    );
}

#[test]
fn test_missing_file_vs_empty_list() {
    let temp = TempDir::new().unwrap();

    // Missing file: no result at all.
    assert!(read_recents_file(temp.path().join("absent.sfl3")).is_none());

    // Present file with an empty items list: a valid, empty result.
    let bytes = ArchiveBuilder::new().root_empty_items().build();
    let file = temp.path().join("empty.sfl3");
    fs::write(&file, &bytes).unwrap();
    assert_eq!(read_recents_file(&file), Some(Vec::new()));
}

#[test]
fn test_unreadable_structure_is_none() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("corrupt.sfl3");
    fs::write(&file, b"bplist00 but not really").unwrap();
    assert!(read_recents_file(&file).is_none());
}

#[test]
fn test_disallowed_class_anywhere_fails_whole_decode() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good");
    fs::create_dir(&good).unwrap();

    // One malicious entry poisons the decode even though another entry is
    // perfectly valid.
    let bytes = ArchiveBuilder::new()
        .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&good)))])
        .add_entry_with_class("NSInvocation", &[("cmd", EntryField::Text("x".to_string()))])
        .build();
    assert!(read_recents_bytes(&bytes).is_none());
}

#[test]
fn test_stale_bookmark_still_resolves() {
    let temp = TempDir::new().unwrap();
    let gone = temp.path().join("was-here");
    fs::create_dir(&gone).unwrap();
    let blob = bookmark_blob(&gone);
    fs::remove_dir(&gone).unwrap();

    let bytes = ArchiveBuilder::new()
        .add_entry(&[("Bookmark", EntryField::Blob(blob))])
        .build();
    let paths = read_recents_bytes(&bytes).unwrap();
    assert_eq!(paths, vec![gone.to_string_lossy().into_owned()]);
}

#[test]
fn test_minimal_config_decodes_bare_schema() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("doc");
    fs::create_dir(&target).unwrap();

    let bytes = ArchiveBuilder::new()
        .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&target)))])
        .build();
    let paths = read_recents_bytes_with(&bytes, &DecodeConfig::minimal()).unwrap();
    assert_eq!(paths.len(), 1);
}

#[test]
fn test_decode_and_sync_into_store() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("P");
    fs::create_dir(&project).unwrap();

    let bytes = ArchiveBuilder::new()
        .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&project)))])
        .build();
    let paths = read_recents_bytes(&bytes).unwrap();

    let store = RecordStore::open_in_memory().unwrap();
    let now = Utc.timestamp_opt(1_000, 0).unwrap();
    assert_eq!(store.sync(&paths, now).unwrap(), 1);

    // Pin it, then re-sync with a later timestamp: pin survives, pinned
    // record stays on top.
    let path = &paths[0];
    assert!(store.set_pinned(path, true).unwrap());
    store.upsert("/somewhere/else", Utc.timestamp_opt(2_000, 0).unwrap()).unwrap();
    store.sync(&paths, Utc.timestamp_opt(3_000, 0).unwrap()).unwrap();

    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0].path, path);
    assert!(records[0].pinned);
}

#[test]
fn test_authorized_bookmark_roundtrip_through_store() {
    let temp = TempDir::new().unwrap();
    let store = BookmarkStore::open_in_memory().unwrap();
    let blob = bookmark::create(temp.path()).unwrap();
    store.save("ApplicationRecentDocuments", &blob).unwrap();

    let resolved = store
        .resolve("ApplicationRecentDocuments")
        .unwrap()
        .expect("bookmark should resolve");
    assert_eq!(resolved.path, temp.path());
    assert!(!resolved.is_stale);
}
