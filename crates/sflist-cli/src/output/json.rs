//! JSON output formatter for machine consumption.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use sflist_core::PathRecord;
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct PathsData {
    source: String,
    count: usize,
    paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RecordsData {
    count: usize,
    records: Vec<PathRecord>,
}

#[derive(Debug, Serialize)]
struct MessageData {
    message: String,
}

fn emit<T: Serialize>(output: &JsonOutput<T>) {
    if let Ok(json) = serde_json::to_string_pretty(output) {
        println!("{json}");
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_paths(&self, source: &Path, paths: &[String]) -> Result<()> {
        let data = PathsData {
            source: source.display().to_string(),
            count: paths.len(),
            paths: paths.to_vec(),
        };
        emit(&JsonOutput::success("read", data));
        Ok(())
    }

    fn format_records(&self, records: &[PathRecord]) -> Result<()> {
        let data = RecordsData {
            count: records.len(),
            records: records.to_vec(),
        };
        emit(&JsonOutput::success("recent", data));
        Ok(())
    }

    fn format_success(&self, message: &str) {
        emit(&JsonOutput::success(
            "status",
            MessageData {
                message: message.to_string(),
            },
        ));
    }

    fn format_warning(&self, message: &str) {
        emit(&JsonOutput::success(
            "warning",
            MessageData {
                message: message.to_string(),
            },
        ));
    }
}
