//! Read command - decode a recents list and print the paths.

use crate::cli::ReadArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use sflist_core::DecodeConfig;

pub fn execute(args: &ReadArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let source = super::source_path(args.file.as_ref(), args.app.as_ref())?;
    let config = if args.minimal {
        DecodeConfig::minimal()
    } else {
        DecodeConfig::default()
    };

    match sflist_core::read_recents_file_with(&source, &config) {
        Some(paths) => formatter.format_paths(&source, &paths),
        None => bail!(
            "no recents list could be decoded from '{}'\n\
             HINT: Run with --verbose to see why the decode was rejected.",
            source.display()
        ),
    }
}
