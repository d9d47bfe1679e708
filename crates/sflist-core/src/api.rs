//! High-level entry points for decoding recents lists.
//!
//! The pipeline is a single synchronous pass: load bytes, decode the keyed
//! archive, extract the `"items"` sequence, resolve each entry's bookmark in
//! order. `None` means the decode produced no data at all; `Some(vec![])`
//! means the decode succeeded and the list is simply empty. Each invocation
//! operates on its own bytes, so concurrent decodes of different files are
//! safe.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::DecodeConfig;
use crate::formats::archive;
use crate::recents;

/// Well-known per-application recents directory, relative to the user's
/// Application Support directory.
const SHARED_FILE_LIST_DIR: &str =
    "com.apple.sharedfilelist/com.apple.LSSharedFileList.ApplicationRecentDocuments";

/// Reads and decodes the recents list at `path`.
///
/// A missing file is an expected condition and yields `None` without an
/// error log; unreadable files and malformed content also yield `None` but
/// are logged.
///
/// # Examples
///
/// ```no_run
/// let paths = sflist_core::read_recents_file("recents.sfl3");
/// match paths {
///     Some(paths) => println!("{} recent documents", paths.len()),
///     None => println!("no recents list"),
/// }
/// ```
#[must_use]
pub fn read_recents_file<P: AsRef<Path>>(path: P) -> Option<Vec<String>> {
    read_recents_file_with(path, &DecodeConfig::default())
}

/// Reads and decodes the recents list at `path` with an explicit
/// configuration.
#[must_use]
pub fn read_recents_file_with<P: AsRef<Path>>(path: P, config: &DecodeConfig) -> Option<Vec<String>> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "recents file absent");
            return None;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "recents file unreadable");
            return None;
        }
    };
    read_recents_bytes_with(&bytes, config)
}

/// Decodes a recents list from raw bytes with the default configuration.
#[must_use]
pub fn read_recents_bytes(bytes: &[u8]) -> Option<Vec<String>> {
    read_recents_bytes_with(bytes, &DecodeConfig::default())
}

/// Decodes a recents list from raw bytes with an explicit configuration.
///
/// Empty input yields `None` immediately. Any archive-level failure
/// (malformed container, disallowed class, missing or mis-shaped `"items"`)
/// yields `None` for the whole decode; per-entry bookmark failures only
/// skip that entry.
#[must_use]
pub fn read_recents_bytes_with(bytes: &[u8], config: &DecodeConfig) -> Option<Vec<String>> {
    if bytes.is_empty() {
        debug!("empty recents data");
        return None;
    }
    let root = match archive::decode(bytes, config) {
        Ok(root) => root,
        Err(err) => {
            warn!(error = %err, "recents archive not decodable");
            return None;
        }
    };
    let Some(items) = recents::extract_items(&root) else {
        debug!("decoded archive has no items sequence");
        return None;
    };
    Some(recents::collect_paths(items))
}

/// Returns the standard recents-list path for an application bundle id,
/// e.g. `com.apple.dt.Xcode`.
///
/// Returns `None` when the user's Application Support directory cannot be
/// determined.
#[must_use]
pub fn standard_recents_path(bundle_id: &str) -> Option<PathBuf> {
    let support = dirs::home_dir()?.join("Library/Application Support");
    Some(
        support
            .join(SHARED_FILE_LIST_DIR)
            .join(format!("{bundle_id}.sfl3")),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ArchiveBuilder;
    use crate::test_utils::EntryField;
    use crate::test_utils::bookmark_blob;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.sfl3");
        assert!(read_recents_file(&path).is_none());
    }

    #[test]
    fn test_read_empty_bytes_is_none() {
        assert!(read_recents_bytes(&[]).is_none());
    }

    #[test]
    fn test_read_garbage_bytes_is_none() {
        assert!(read_recents_bytes(b"not a plist at all").is_none());
    }

    #[test]
    fn test_read_archive_without_items_is_none() {
        let bytes = ArchiveBuilder::new().root_without_items().build();
        assert!(read_recents_bytes(&bytes).is_none());
    }

    #[test]
    fn test_read_empty_items_is_empty_not_none() {
        let bytes = ArchiveBuilder::new().root_empty_items().build();
        assert_eq!(read_recents_bytes(&bytes), Some(Vec::new()));
    }

    #[test]
    fn test_read_mixed_entries_keeps_valid_in_order() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("Projects/X");
        std::fs::create_dir_all(&project).unwrap();

        let bytes = ArchiveBuilder::new()
            .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&project)))])
            .add_entry(&[("Other", EntryField::Int(1))])
            .add_entry(&[("Bookmark", EntryField::Blob(vec![0xBA, 0xD0]))])
            .build();

        let paths = read_recents_bytes(&bytes).unwrap();
        assert_eq!(paths, vec![project.to_string_lossy().into_owned()]);
    }

    #[test]
    fn test_read_from_file_matches_bytes() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("doc");
        std::fs::create_dir(&target).unwrap();

        let bytes = ArchiveBuilder::new()
            .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&target)))])
            .build();
        let file = temp.path().join("recents.sfl3");
        std::fs::write(&file, &bytes).unwrap();

        assert_eq!(read_recents_file(&file), read_recents_bytes(&bytes));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("doc");
        std::fs::create_dir(&target).unwrap();
        let bytes = ArchiveBuilder::new()
            .add_entry(&[("Bookmark", EntryField::Blob(bookmark_blob(&target)))])
            .build();

        assert_eq!(read_recents_bytes(&bytes), read_recents_bytes(&bytes));
    }

    #[test]
    fn test_disallowed_class_yields_none() {
        let bytes = ArchiveBuilder::new()
            .add_entry_with_class("SFLListItem", &[("Bookmark", EntryField::Blob(vec![0]))])
            .build();
        assert!(read_recents_bytes(&bytes).is_none());
    }

    #[test]
    fn test_standard_recents_path_shape() {
        if let Some(path) = standard_recents_path("com.example.App") {
            let s = path.to_string_lossy();
            assert!(s.ends_with("com.example.App.sfl3"));
            assert!(s.contains("com.apple.sharedfilelist"));
        }
    }
}
