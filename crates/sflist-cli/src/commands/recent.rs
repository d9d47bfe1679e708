//! Recent command - list tracked paths, pinned first.

use crate::cli::RecentArgs;
use crate::error::add_sfl_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use sflist_core::RecordStore;

pub fn execute(args: &RecentArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let db = super::store_path(args.store.as_ref())?;
    let store = add_sfl_context(RecordStore::open(&db), &db)?;
    let records = add_sfl_context(store.list_all(), &db)?;
    formatter.format_records(&records)
}
