//! Output formatter trait for CLI results.

use anyhow::Result;
use globtar_core::CreationReport;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `create`
    fn format_creation_result(&self, output: &str, report: &CreationReport) -> Result<()>;

    /// Format the matched-path trace of `match`
    fn format_matches(&self, paths: &[String]) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data,
        }
    }
}
