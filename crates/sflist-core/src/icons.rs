//! Best-effort app icon discovery.
//!
//! Walks a project directory for the first `*.appiconset` asset folder and
//! returns the first readable file inside it. Purely heuristic; callers
//! treat `None` as "no icon".

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

/// Extension of the asset-catalog folder holding app icons.
const ICONSET_EXTENSION: &str = "appiconset";

/// Finds an app icon file under `root`, skipping hidden entries.
#[must_use]
pub fn find_app_icon(root: &Path) -> Option<PathBuf> {
    let iconset = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
        .filter_map(std::result::Result::ok)
        .find(|e| {
            e.file_type().is_dir()
                && e.path().extension().and_then(|x| x.to_str()) == Some(ICONSET_EXTENSION)
        })?
        .into_path();
    debug!(iconset = %iconset.display(), "found icon set");

    WalkDir::new(&iconset)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
        .filter_map(std::result::Result::ok)
        .map(walkdir::DirEntry::into_path)
        .find(|p| p.is_file() && fs::read(p).is_ok())
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.starts_with('.') && n != "." && n != "..")
}
