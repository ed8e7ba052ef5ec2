//! Archive creation operation reporting.

use std::time::Duration;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_read = 1024;
/// report.bytes_written = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Number of file records (including followed symlinks).
    pub files_added: usize,

    /// Number of directory records.
    pub directories_added: usize,

    /// Number of symlinks to files archived as their target content.
    ///
    /// Already included in `files_added`.
    pub symlinks_followed: usize,

    /// Number of special entries (pipes, sockets, devices) dropped.
    pub entries_skipped: usize,

    /// Content bytes read from source files.
    pub bytes_read: u64,

    /// Bytes of final output (after gzip, if enabled).
    pub bytes_written: u64,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of records written to the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Returns content bytes per output byte.
    ///
    /// Returns 0.0 if either count is 0. For plain tar output the ratio is
    /// below 1.0 because of header and padding overhead.
    ///
    /// # Examples
    ///
    /// ```
    /// use globtar_core::creation::CreationReport;
    ///
    /// let mut report = CreationReport::new();
    /// report.bytes_read = 1000;
    /// report.bytes_written = 250;
    /// assert_eq!(report.compression_ratio(), 4.0);
    ///
    /// report.bytes_written = 0;
    /// assert_eq!(report.compression_ratio(), 0.0);
    /// ```
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_read == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.bytes_written as f64
    }
}
