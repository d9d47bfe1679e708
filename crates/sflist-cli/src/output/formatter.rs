//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use sflist_core::PathRecord;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format decoded paths from a recents list
    fn format_paths(&self, source: &Path, paths: &[String]) -> Result<()>;

    /// Format tracked records from the store
    fn format_records(&self, records: &[PathRecord]) -> Result<()>;

    /// Format success message
    fn format_success(&self, message: &str);

    /// Format warning message
    #[allow(dead_code)]
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    #[allow(dead_code)]
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}
