//! Pin and unpin commands - toggle the pinned flag on a tracked path.

use crate::cli::PinArgs;
use crate::error::add_sfl_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use sflist_core::RecordStore;

pub fn execute(args: &PinArgs, formatter: &dyn OutputFormatter, pinned: bool) -> Result<()> {
    let db = super::store_path(args.store.as_ref())?;
    let store = add_sfl_context(RecordStore::open(&db), &db)?;

    if !add_sfl_context(store.set_pinned(&args.path, pinned), &db)? {
        bail!(
            "'{}' is not tracked\n\
             HINT: Run 'sflist sync' first, or 'sflist recent' to list tracked paths.",
            args.path
        );
    }

    let verb = if pinned { "pinned" } else { "unpinned" };
    formatter.format_success(&format!("{verb} '{}'", args.path));
    Ok(())
}
