//! Error types for recents-list decoding and record storage.

use thiserror::Error;

/// Result type alias using `SflError`.
pub type Result<T> = std::result::Result<T, SflError>;

/// Errors that can occur while decoding a shared-file-list or accessing the
/// record store.
#[derive(Error, Debug)]
pub enum SflError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not a valid binary property list.
    #[error("malformed property list: {0}")]
    MalformedPlist(String),

    /// Keyed archive structure is invalid or truncated.
    #[error("malformed keyed archive: {0}")]
    MalformedArchive(String),

    /// Archive references a class outside the decode allow-list.
    #[error("disallowed archive class: {name}")]
    DisallowedClass {
        /// Class name embedded in the archive.
        name: String,
    },

    /// Bookmark data blob is invalid or truncated.
    #[error("malformed bookmark data: {0}")]
    MalformedBookmark(String),

    /// Record store operation failed.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl SflError {
    /// Returns `true` if this error represents a security boundary violation.
    ///
    /// The archive format historically permits arbitrary class
    /// instantiation; an archive naming a class outside the allow-list is
    /// treated as untrusted input rather than a mere format mismatch.
    ///
    /// # Examples
    ///
    /// ```
    /// use sflist_core::SflError;
    ///
    /// let err = SflError::DisallowedClass {
    ///     name: "NSInvocation".to_string(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = SflError::MalformedPlist("truncated trailer".to_string());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::DisallowedClass { .. })
    }

    /// Returns `true` if this error only affects a single recents entry.
    ///
    /// Per-entry failures are expected over the data's lifetime (files move,
    /// get deleted) and are skipped by the collector instead of aborting the
    /// whole decode.
    #[must_use]
    pub const fn is_per_entry(&self) -> bool {
        matches!(self, Self::MalformedBookmark(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disallowed_class_is_security_violation() {
        let err = SflError::DisallowedClass {
            name: "NSInvocation".to_string(),
        };
        assert!(err.is_security_violation());
        assert!(!err.is_per_entry());
    }

    #[test]
    fn test_malformed_bookmark_is_per_entry() {
        let err = SflError::MalformedBookmark("bad magic".to_string());
        assert!(err.is_per_entry());
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_error_display() {
        let err = SflError::MalformedArchive("missing $objects".to_string());
        assert_eq!(err.to_string(), "malformed keyed archive: missing $objects");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SflError::from(io_err);
        assert!(matches!(err, SflError::Io(_)));
    }
}
