//! CLI command implementations.

pub mod clear;
pub mod completion;
pub mod pin;
pub mod read;
pub mod recent;
pub mod sync;
pub mod watch;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use std::path::PathBuf;

/// Resolves the record-store database path, defaulting to
/// `~/.sflist/records.db` and creating the parent directory.
fn store_path(store: Option<&PathBuf>) -> Result<PathBuf> {
    let path = match store {
        Some(path) => path.clone(),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow!("cannot determine home directory; pass --store"))?
            .join(".sflist")
            .join("records.db"),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    Ok(path)
}

/// Resolves the recents-list source from either an explicit file or a
/// bundle id. Clap guarantees exactly one is present.
fn source_path(file: Option<&PathBuf>, app: Option<&String>) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file.clone());
    }
    let bundle_id = app.ok_or_else(|| anyhow!("either a file or --app is required"))?;
    sflist_core::standard_recents_path(bundle_id)
        .ok_or_else(|| anyhow!("cannot determine home directory; pass a file path instead"))
}
