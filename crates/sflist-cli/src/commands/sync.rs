//! Sync command - decode a recents list and record the paths.

use crate::cli::SyncArgs;
use crate::error::add_sfl_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use chrono::Utc;
use sflist_core::RecordStore;

pub fn execute(args: &SyncArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let source = super::source_path(args.file.as_ref(), args.app.as_ref())?;

    let Some(paths) = sflist_core::read_recents_file(&source) else {
        bail!(
            "no recents list could be decoded from '{}'\n\
             HINT: Run with --verbose to see why the decode was rejected.",
            source.display()
        );
    };

    let db = super::store_path(args.store.as_ref())?;
    let store = add_sfl_context(RecordStore::open(&db), &db)?;
    let recorded = add_sfl_context(store.sync(&paths, Utc::now()), &db)?;

    formatter.format_success(&format!(
        "recorded {recorded} paths from {}",
        source.display()
    ));
    Ok(())
}
