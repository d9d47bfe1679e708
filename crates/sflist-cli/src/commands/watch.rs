//! Watch command - poll a recents list and re-sync on every change.

use crate::cli::WatchArgs;
use crate::error::add_sfl_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use chrono::Utc;
use sflist_core::FileWatcher;
use sflist_core::RecordStore;
use std::path::Path;
use std::time::Duration;

pub fn execute(args: &WatchArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let source = super::source_path(args.file.as_ref(), args.app.as_ref())?;
    let db = super::store_path(args.store.as_ref())?;

    // Sync once before waiting on changes so the store starts fresh.
    sync_once(&source, &db)?;
    formatter.format_success(&format!(
        "watching {} every {}s",
        source.display(),
        args.interval
    ));

    let watch_source = source.clone();
    let watch_db = db.clone();
    let watcher = FileWatcher::spawn(
        &source,
        Duration::from_secs(args.interval),
        move || match sync_once(&watch_source, &watch_db) {
            Ok(recorded) => tracing::info!(
                source = %watch_source.display(),
                recorded,
                "recents list changed"
            ),
            Err(err) => tracing::warn!(
                source = %watch_source.display(),
                error = %err,
                "re-sync failed"
            ),
        },
    );
    let _watcher = add_sfl_context(watcher, &source)?;

    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}

/// Decodes the recents list and records the paths. A list that cannot
/// be decoded records nothing, which matters mid-write during a watch.
fn sync_once(source: &Path, db: &Path) -> Result<usize> {
    let Some(paths) = sflist_core::read_recents_file(source) else {
        return Ok(0);
    };
    let store = add_sfl_context(RecordStore::open(db), db)?;
    add_sfl_context(store.sync(&paths, Utc::now()), db)
}
