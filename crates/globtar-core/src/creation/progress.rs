//! Progress callbacks for archive creation.

use crate::creation::report::CreationReport;

/// Receives progress updates while an archive is built.
///
/// The total number of entries is not known up front because paths are
/// matched lazily; `current` is the 1-based index of the entry.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::CreationReport;
/// use globtar_core::creation::ProgressCallback;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &str, current: usize) {
///         println!("[{current}] {path}");
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &str) {}
///
///     fn on_complete(&mut self, report: &CreationReport) {
///         println!("{} entries", report.total_entries());
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry's header is written.
    fn on_entry_start(&mut self, path: &str, current: usize);

    /// Called for every chunk of file content copied into the archive.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry, including its content, has been written.
    fn on_entry_complete(&mut self, path: &str);

    /// Called once after the archive trailer has been flushed.
    fn on_complete(&mut self, report: &CreationReport);
}

impl<P: ProgressCallback + ?Sized> ProgressCallback for &mut P {
    fn on_entry_start(&mut self, path: &str, current: usize) {
        (**self).on_entry_start(path, current);
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        (**self).on_bytes_written(bytes);
    }

    fn on_entry_complete(&mut self, path: &str) {
        (**self).on_entry_complete(path);
    }

    fn on_complete(&mut self, report: &CreationReport) {
        (**self).on_complete(report);
    }
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &str, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &str) {}

    fn on_complete(&mut self, _report: &CreationReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        started: Vec<(String, usize)>,
        bytes: u64,
        completed: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_entry_start(&mut self, path: &str, current: usize) {
            self.started.push((path.to_string(), current));
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes += bytes;
        }

        fn on_entry_complete(&mut self, _path: &str) {}

        fn on_complete(&mut self, _report: &CreationReport) {
            self.completed = true;
        }
    }

    fn drive(progress: &mut dyn ProgressCallback) {
        progress.on_entry_start("a.js", 1);
        progress.on_bytes_written(10);
        progress.on_entry_complete("a.js");
        progress.on_complete(&CreationReport::default());
    }

    #[test]
    fn test_mut_reference_forwards() {
        let mut recorder = Recorder::default();
        let mut borrowed = &mut recorder;
        drive(&mut borrowed);

        assert_eq!(recorder.started, vec![("a.js".to_string(), 1)]);
        assert_eq!(recorder.bytes, 10);
        assert!(recorder.completed);
    }

    #[test]
    fn test_noop_progress() {
        drive(&mut NoopProgress);
    }
}
