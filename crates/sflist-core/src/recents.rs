//! Recents-list extraction and path collection.
//!
//! The decoded archive root is a mapping whose `"items"` sequence holds one
//! mapping per recent document. Entries are independent: a missing or
//! unresolvable bookmark skips that entry and never aborts the rest.

use std::collections::HashMap;

use tracing::debug;

use crate::formats::Object;
use crate::formats::ResolvedBookmark;
use crate::formats::bookmark;

/// Top-level key holding the recents entries.
pub const ITEMS_KEY: &str = "items";

/// Entry key holding the security-scoped bookmark blob.
pub const BOOKMARK_KEY: &str = "Bookmark";

/// Entry key holding the display name, when present.
pub const NAME_KEY: &str = "Name";

/// One element of the `"items"` sequence.
#[derive(Debug, Clone, Copy)]
pub struct RecentEntry<'a> {
    fields: &'a HashMap<String, Object>,
}

impl<'a> RecentEntry<'a> {
    /// Wraps a sequence element, returning `None` for non-mapping shapes.
    #[must_use]
    pub fn from_object(object: &'a Object) -> Option<Self> {
        object.as_mapping().map(|fields| Self { fields })
    }

    /// Returns the bookmark blob, if the entry carries one of the right
    /// shape.
    #[must_use]
    pub fn bookmark(&self) -> Option<&'a [u8]> {
        self.fields.get(BOOKMARK_KEY).and_then(Object::as_blob)
    }

    /// Returns the display name recorded alongside the bookmark.
    #[must_use]
    pub fn display_name(&self) -> Option<&'a str> {
        match self.fields.get(NAME_KEY) {
            Some(Object::Text(name)) => Some(name),
            _ => None,
        }
    }

    /// Resolves this entry's bookmark to a filesystem location.
    ///
    /// Returns `None` when the entry has no usable bookmark; the failure is
    /// logged at debug level since stale and malformed entries are expected
    /// over the list's lifetime.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedBookmark> {
        let blob = self.bookmark().or_else(|| {
            debug!("skipping entry without a bookmark blob");
            None
        })?;
        match bookmark::resolve(blob) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                debug!(error = %err, "skipping entry with unresolvable bookmark");
                None
            }
        }
    }
}

/// Extracts the `"items"` sequence from a decoded archive root.
///
/// Returns `None` when the key is absent or not a sequence. That fails the
/// whole decode, since a malformed top level gives no reliable partial
/// data.
#[must_use]
pub fn extract_items(root: &Object) -> Option<&[Object]> {
    root.as_mapping()?.get(ITEMS_KEY)?.as_sequence()
}

/// Collects resolved paths from the items sequence, preserving source
/// order and skipping entries that fail at any stage.
#[must_use]
pub fn collect_paths(items: &[Object]) -> Vec<String> {
    items
        .iter()
        .filter_map(RecentEntry::from_object)
        .filter_map(|entry| entry.resolve())
        .map(|resolved| resolved.path.to_string_lossy().into_owned())
        .collect()
}
