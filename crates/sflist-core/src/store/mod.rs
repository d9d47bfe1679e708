//! Persistent stores: discovered path records and authorized-directory
//! bookmarks.

pub mod bookmarks;
pub mod records;

pub use bookmarks::BookmarkStore;
pub use records::PathRecord;
pub use records::RecordStore;
