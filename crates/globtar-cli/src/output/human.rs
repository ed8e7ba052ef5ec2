//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use globtar_core::CreationReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool, term: Term) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term,
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, output: &str, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.line(&format!(
                "{} Archive created: {output}",
                style("✓").green().bold()
            ));
        } else {
            self.line(&format!("Archive created: {output}"));
        }

        self.line("");
        self.line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        self.line(&format!(
            "  Content size:     {}",
            humanize_bytes(report.bytes_read)
        ));
        self.line(&format!(
            "  Archive size:     {}",
            humanize_bytes(report.bytes_written)
        ));

        if self.verbose {
            if report.symlinks_followed > 0 {
                self.line(&format!(
                    "  Symlinks followed: {}",
                    Self::format_number(report.symlinks_followed)
                ));
            }
            self.line(&format!(
                "  Ratio:            {:.2}",
                report.compression_ratio()
            ));
            self.line(&format!(
                "  Duration:         {:.2}s",
                report.duration.as_secs_f64()
            ));
        }

        if report.entries_skipped > 0 {
            self.line(&format!(
                "  Entries skipped:  {}",
                Self::format_number(report.entries_skipped)
            ));
        }

        if report.has_warnings() {
            self.line("");
            if self.use_colors {
                self.line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                self.line("Warnings:");
            }
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_matches(&self, paths: &[String]) -> Result<()> {
        // The path list is the command's product, so quiet does not hide it.
        for path in paths {
            self.term.write_line(path)?;
        }

        if self.verbose {
            self.line(&format!(
                "{} path(s) matched",
                Self::format_number(paths.len())
            ));
        }

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}
