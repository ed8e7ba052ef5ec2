//! Progress spinner for archive creation.

use console::Term;
use globtar_core::CreationReport;
use globtar_core::ProgressCallback;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;
use std::time::Duration;

/// CLI spinner implementing `ProgressCallback`.
///
/// The number of entries is not known in advance, so this shows a spinner
/// with the entry count, bytes archived, throughput, and current path
/// instead of a bar. Draws to stderr and clears itself on drop.
pub struct CliProgress {
    bar: ProgressBar,
    label: String,
    bytes_read: u64,
}

impl CliProgress {
    /// Creates a new spinner with the given label (e.g. "Archiving").
    #[must_use]
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        // Template: "⠋ Archiving 42 entries (15.2 MB, 5.1 MB/s) dist/app.js"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {prefix} ({bytes}, {bytes_per_sec}) {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .with_key("bytes", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_bytes(state.pos())).unwrap_or(());
                })
                .with_key("bytes_per_sec", |state: &ProgressState, w: &mut dyn Write| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let bytes_per_sec = state.per_sec() as u64;
                    write!(w, "{}/s", humanize_bytes(bytes_per_sec)).unwrap_or(());
                }),
        );
        bar.set_prefix(format!("{label} 0 entries"));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            label: label.to_string(),
            bytes_read: 0,
        }
    }

    /// Checks if we should show progress (stderr is a terminal).
    #[must_use]
    pub fn should_show(quiet: bool, json: bool) -> bool {
        !quiet && !json && Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, path: &str, current: usize) {
        self.bar.set_prefix(format!("{} {current} entries", self.label));
        self.bar.set_message(path.to_string());
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_read += bytes;
        self.bar.set_position(self.bytes_read);
    }

    fn on_entry_complete(&mut self, _path: &str) {}

    fn on_complete(&mut self, _report: &CreationReport) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(512), "512 B");
        assert_eq!(humanize_bytes(1536), "1.5 KB");
        assert_eq!(humanize_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(humanize_bytes(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(humanize_bytes(1024_u64.pow(4)), "1.0 TB");
    }

    #[test]
    fn test_progress_callback() {
        let mut progress = CliProgress::new("Testing");

        progress.on_entry_start("dist/app.js", 1);
        progress.on_bytes_written(1024);
        progress.on_bytes_written(512);
        progress.on_entry_complete("dist/app.js");

        assert_eq!(progress.bytes_read, 1536);
        assert_eq!(progress.bar.position(), 1536);
    }
}
