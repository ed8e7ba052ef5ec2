//! Error conversion utilities for CLI.
//!
//! Converts globtar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use globtar_core::ArchiveError;

/// Converts `ArchiveError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: ArchiveError, output: &str) -> anyhow::Error {
    match err {
        ArchiveError::RootNotFound { path } => {
            anyhow!(
                "Root directory not found: {}\n\
                 HINT: Use --root to point at the directory the patterns are relative to.",
                path.display()
            )
        }
        ArchiveError::RootNotDirectory { path } => {
            anyhow!(
                "Root path is not a directory: {}\n\
                 HINT: --root must name a directory, not a file.",
                path.display()
            )
        }
        ArchiveError::NoPatterns => {
            anyhow!(
                "No glob patterns given\n\
                 HINT: Pass PATTERN arguments or --glob-file with one pattern per line."
            )
        }
        ArchiveError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid glob pattern '{pattern}': {reason}\n\
                 HINT: Quote patterns so the shell does not expand them; match a literal '[' with '[[]'."
            )
        }
        ArchiveError::Resolution { path, source } => {
            anyhow!(
                "Cannot read '{}' while building '{output}': {source}\n\
                 HINT: The file may have been removed while the archive was built. Re-run once the tree is stable.",
                path.display()
            )
        }
        ArchiveError::LengthMismatch {
            path,
            declared,
            actual,
        } => {
            anyhow!(
                "File '{path}' changed while being archived (expected {declared} bytes, read {actual})\n\
                 HINT: Another process is writing to it. Re-run after that build step finishes."
            )
        }
        ArchiveError::Destination(io_err) => {
            anyhow!(
                "Failed writing '{output}': {io_err}\n\
                 HINT: Check free disk space and write permissions. Partial output was left in place."
            )
        }
        ArchiveError::NonUtf8Path { path } => {
            anyhow!(
                "Path is not valid UTF-8: {}\n\
                 HINT: Rename the file or exclude it with a narrower pattern.",
                path.display()
            )
        }
        _ => anyhow::Error::from(err).context(format!("Error creating archive '{output}'")),
    }
}

/// Adds archive context to a core result
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    output: &str,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, output))
}
