//! Clear command - delete all tracked paths.

use crate::cli::ClearArgs;
use crate::error::add_sfl_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use sflist_core::RecordStore;

pub fn execute(args: &ClearArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete all records without --yes");
    }

    let db = super::store_path(args.store.as_ref())?;
    let store = add_sfl_context(RecordStore::open(&db), &db)?;
    let removed = add_sfl_context(store.delete_all(), &db)?;

    formatter.format_success(&format!("removed {removed} records"));
    Ok(())
}
