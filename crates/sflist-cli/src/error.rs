//! Error conversion utilities for CLI.
//!
//! Converts sflist-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use sflist_core::SflError;
use std::path::Path;

/// Converts `SflError` to a user-friendly anyhow error with context
pub fn convert_sfl_error(err: SflError, subject: &Path) -> anyhow::Error {
    match err {
        SflError::DisallowedClass { name } => {
            anyhow!(
                "Security violation: '{}' names archive class '{name}' outside the allow-list\n\
                 HINT: This file may be malicious or not a recents list. It was not decoded.",
                subject.display()
            )
        }
        SflError::MalformedPlist(reason) => {
            anyhow!(
                "Invalid recents file '{}': {reason}\n\
                 HINT: The file may be corrupted or not a binary property list.",
                subject.display()
            )
        }
        SflError::MalformedArchive(reason) => {
            anyhow!(
                "Invalid recents file '{}': {reason}\n\
                 HINT: The file may be written by an unsupported macOS version.",
                subject.display()
            )
        }
        SflError::Store(db_err) => {
            anyhow!(
                "Record store error at '{}': {db_err}\n\
                 HINT: Pass --store to use a different database file.",
                subject.display()
            )
        }
        SflError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {io_err}", subject.display())
        }
        SflError::MalformedBookmark(reason) => {
            anyhow!("Bookmark data in '{}' is invalid: {reason}", subject.display())
        }
    }
}

/// Adds context to a core result about a store or decode operation
pub fn add_sfl_context<T>(
    result: Result<T, SflError>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_sfl_error(e, subject))
}
