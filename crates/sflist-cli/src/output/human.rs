//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use sflist_core::PathRecord;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_paths(&self, source: &Path, paths: &[String]) -> Result<()> {
        for path in paths {
            let _ = self.term.write_line(path);
        }
        if self.quiet {
            return Ok(());
        }
        let summary = format!("{} paths from {}", paths.len(), source.display());
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {summary}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(&summary);
        }
        Ok(())
    }

    fn format_records(&self, records: &[PathRecord]) -> Result<()> {
        for record in records {
            let marker = if record.pinned { "*" } else { " " };
            let line = if self.verbose {
                format!(
                    "{marker} {}  (last seen {})",
                    record.path,
                    record.last_seen.format("%Y-%m-%d %H:%M:%S")
                )
            } else {
                format!("{marker} {}", record.path)
            };
            if self.use_colors && record.pinned {
                let _ = self.term.write_line(&style(line).cyan().to_string());
            } else {
                let _ = self.term.write_line(&line);
            }
        }
        if !self.quiet && records.is_empty() {
            let _ = self.term.write_line("no tracked paths");
        }
        Ok(())
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
