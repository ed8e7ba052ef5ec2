//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use globtar_core::CreationReport;
use serde::Serialize;

pub struct JsonFormatter {
    term: Term,
}

impl JsonFormatter {
    pub const fn new(term: Term) -> Self {
        Self { term }
    }

    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.term.write_line(&json)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CreationOutput {
    output_path: String,
    files_added: usize,
    directories_added: usize,
    symlinks_followed: usize,
    entries_skipped: usize,
    bytes_read: u64,
    bytes_written: u64,
    compression_ratio: f64,
    duration_ms: u64,
    warnings: Vec<String>,
}

impl CreationOutput {
    fn new(output: &str, report: &CreationReport) -> Self {
        Self {
            output_path: output.to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_followed: report.symlinks_followed,
            entries_skipped: report.entries_skipped,
            bytes_read: report.bytes_read,
            bytes_written: report.bytes_written,
            compression_ratio: report.compression_ratio(),
            duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            warnings: report.warnings.clone(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output: &str, report: &CreationReport) -> Result<()> {
        self.output(&JsonOutput::success("create", CreationOutput::new(output, report)))
    }

    fn format_matches(&self, paths: &[String]) -> Result<()> {
        #[derive(Serialize)]
        struct MatchOutput<'a> {
            count: usize,
            paths: &'a [String],
        }

        self.output(&JsonOutput::success(
            "match",
            MatchOutput {
                count: paths.len(),
                paths,
            },
        ))
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let _ = self.output(&JsonOutput::success("warning", WarningData { message }));
    }
}
