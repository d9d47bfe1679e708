//! Safe decoder and tracker for macOS shared-file-list recents files.
//!
//! `sflist-core` reads the binary recents lists macOS keeps per application,
//! resolves each entry's security-scoped bookmark to a filesystem path, and
//! persists discovered paths to a local record store. The keyed-archive
//! layer only materializes an explicit allow-list of object shapes, closing
//! the arbitrary-class-instantiation surface of the legacy format.
//!
//! # Examples
//!
//! ```no_run
//! use sflist_core::read_recents_file;
//!
//! match read_recents_file("recents.sfl3") {
//!     Some(paths) => {
//!         for path in paths {
//!             println!("{path}");
//!         }
//!     }
//!     None => println!("no recents list could be decoded"),
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod formats;
pub mod icons;
pub mod recents;
pub mod store;
pub mod test_utils;
pub mod watch;

// Re-export main API types
pub use api::read_recents_bytes;
pub use api::read_recents_bytes_with;
pub use api::read_recents_file;
pub use api::read_recents_file_with;
pub use api::standard_recents_path;
pub use config::DecodeConfig;
pub use error::Result;
pub use error::SflError;
pub use formats::Object;
pub use formats::ResolvedBookmark;

// Re-export store types for easier access
pub use store::BookmarkStore;
pub use store::PathRecord;
pub use store::RecordStore;
pub use watch::FileWatcher;
