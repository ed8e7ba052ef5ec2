//! Archive pipeline entry points.
//!
//! Two shapes are offered: a pull-based [`TarStream`] the caller reads from,
//! and sink-driven functions that write the whole archive into a destination
//! and return once everything has been flushed. Both make a single pass over
//! the glob results.

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::creation::encoder::ArchiveEncoder;
use crate::creation::matcher::GlobSpec;
use crate::creation::metadata::FileIdentity;
use crate::creation::progress::NoopProgress;
use crate::creation::progress::ProgressCallback;
use crate::creation::report::CreationReport;
use crate::creation::selection::SelectedPaths;
use crate::creation::stream::TarStream;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

/// Builds an archive stream for `patterns`.
///
/// Nothing is read from disk beyond validating the root until the stream is
/// read.
///
/// # Errors
///
/// Returns a selection error if the configuration, root, or patterns are
/// invalid.
pub fn create_tar_stream<S: AsRef<str>>(patterns: &[S], config: &CreationConfig) -> Result<TarStream> {
    create_tar_stream_with_progress(patterns, config, NoopProgress)
}

/// Builds an archive stream that reports progress to `progress`.
///
/// # Errors
///
/// Returns a selection error if the configuration, root, or patterns are
/// invalid.
pub fn create_tar_stream_with_progress<S, P>(
    patterns: &[S],
    config: &CreationConfig,
    progress: P,
) -> Result<TarStream>
where
    S: AsRef<str>,
    P: ProgressCallback + 'static,
{
    let encoder = ArchiveEncoder::new(patterns, Vec::new(), config, Box::new(progress))?;
    Ok(TarStream::new(encoder))
}

/// Writes an archive for `patterns` into `writer`.
///
/// # Examples
///
/// ```no_run
/// use globtar_core::creation::CreationConfig;
/// use globtar_core::write_tar;
///
/// let mut buffer = Vec::new();
/// let config = CreationConfig::default().with_root_path("dist");
/// let report = write_tar(&["**/*.js"], &mut buffer, &config)?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), globtar_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns the first selection, resolution, length, or destination error.
/// Bytes written before the error remain in `writer`.
pub fn write_tar<S: AsRef<str>, W: Write>(
    patterns: &[S],
    writer: W,
    config: &CreationConfig,
) -> Result<CreationReport> {
    ArchiveEncoder::new(patterns, writer, config, Box::new(NoopProgress))?.run()
}

/// Writes an archive into `writer`, reporting progress.
///
/// # Errors
///
/// Same as [`write_tar`].
pub fn write_tar_with_progress<S: AsRef<str>, W: Write>(
    patterns: &[S],
    writer: W,
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    ArchiveEncoder::new(patterns, writer, config, Box::new(progress))?.run()
}

/// Writes an archive for `patterns` to the file at `output`.
///
/// The file is created if absent and truncated if present. Selection errors
/// are raised before the file is touched; on later errors the partial file
/// is left in place. If the patterns match the output file itself, it is
/// left out of the archive and reported as a warning.
///
/// # Examples
///
/// ```no_run
/// use globtar_core::create_tar;
/// use globtar_core::creation::CreationConfig;
/// use globtar_core::creation::EntryFilter;
///
/// let config = CreationConfig::default()
///     .with_root_path("dist")
///     .with_gzip(true)
///     .with_filter(EntryFilter::exclude_suffixes(vec![".test.js".to_string()]));
/// let report = create_tar(&["**/*.js", "/assets/*"], "bundle.tar.gz", &config)?;
/// println!("{} files, {} bytes", report.files_added, report.bytes_written);
/// # Ok::<(), globtar_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns an error if the output cannot be created, or any error from
/// [`write_tar`].
pub fn create_tar<S: AsRef<str>>(
    patterns: &[S],
    output: impl AsRef<Path>,
    config: &CreationConfig,
) -> Result<CreationReport> {
    create_tar_with_progress(patterns, output, config, &mut NoopProgress)
}

/// Writes an archive to the file at `output`, reporting progress.
///
/// # Errors
///
/// Same as [`create_tar`].
pub fn create_tar_with_progress<S: AsRef<str>>(
    patterns: &[S],
    output: impl AsRef<Path>,
    config: &CreationConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    config.validate()?;
    GlobSpec::new(patterns, config.resolve_root()?)?;

    let output = output.as_ref();
    let file = File::create(output).map_err(ArchiveError::Destination)?;
    let identity = FileIdentity::of_file(&file, output).map_err(ArchiveError::Destination)?;

    let mut encoder =
        ArchiveEncoder::new(patterns, BufWriter::new(file), config, Box::new(progress))?;
    encoder.exclude_output(identity);
    encoder.run()
}

/// Returns the matched-path trace: every path the archive would contain,
/// after filtering, before metadata resolution.
///
/// # Examples
///
/// ```no_run
/// use globtar_core::creation::CreationConfig;
/// use globtar_core::select_paths;
///
/// let config = CreationConfig::default().with_root_path("dist");
/// for selected in select_paths(&["**/*.js"], &config)? {
///     println!("{}", selected?.archive_path);
/// }
/// # Ok::<(), globtar_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns a selection error if the configuration, root, or patterns are
/// invalid.
pub fn select_paths<S: AsRef<str>>(patterns: &[S], config: &CreationConfig) -> Result<SelectedPaths> {
    config.validate()?;
    let spec = GlobSpec::new(patterns, config.resolve_root()?)?;
    SelectedPaths::new(&spec, config.filter.clone(), config.sort_paths)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::BTreeSet;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.js"), "console.log('b');").unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        fs::write(temp.path().join("dir/a.js"), "console.log('a');").unwrap();
        temp
    }

    fn entry_names(data: &[u8]) -> BTreeSet<String> {
        let mut archive = ::tar::Archive::new(data);
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_write_tar_recursive_pattern() {
        let temp = fixture();
        let config = CreationConfig::default().with_root_path(temp.path());

        let mut out = Vec::new();
        let report = write_tar(&["**/*.js"], &mut out, &config).unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_written, out.len() as u64);
        let expected: BTreeSet<String> = ["b.js", "dir/a.js"].map(String::from).into();
        assert_eq!(entry_names(&out), expected);
    }

    #[test]
    fn test_stream_matches_sink_output() {
        let temp = fixture();
        let config = CreationConfig::default()
            .with_root_path(temp.path())
            .with_sort_paths(true);

        let mut streamed = Vec::new();
        create_tar_stream(&["**/*.js"], &config)
            .unwrap()
            .read_to_end(&mut streamed)
            .unwrap();

        let mut written = Vec::new();
        write_tar(&["**/*.js"], &mut written, &config).unwrap();

        assert_eq!(entry_names(&streamed), entry_names(&written));
        assert_eq!(streamed.len(), written.len());
    }

    #[test]
    fn test_create_tar_truncates_existing_output() {
        let temp = fixture();
        let output_dir = TempDir::new().unwrap();
        let output = output_dir.path().join("out.tar");
        fs::write(&output, vec![0xffu8; 1 << 16]).unwrap();

        let config = CreationConfig::default().with_root_path(temp.path());
        let report = create_tar(&["b.js"], &output, &config).unwrap();

        assert_eq!(fs::metadata(&output).unwrap().len(), report.bytes_written);
        assert_eq!(entry_names(&fs::read(&output).unwrap()).len(), 1);
    }

    #[test]
    fn test_create_tar_selection_error_leaves_output_untouched() {
        let output_dir = TempDir::new().unwrap();
        let output = output_dir.path().join("out.tar");
        let config = CreationConfig::default().with_root_path("/nonexistent/globtar/root");

        let err = create_tar(&["*.js"], &output, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(!output.exists());
    }

    #[test]
    fn test_select_paths_trace() {
        let temp = fixture();
        let config = CreationConfig::default()
            .with_root_path(temp.path())
            .with_sort_paths(true);

        let paths: Vec<_> = select_paths(&["dir/*.js"], &config)
            .unwrap()
            .map(|p| p.unwrap().archive_path)
            .collect();
        assert_eq!(paths, vec!["dir/a.js"]);
    }

    #[test]
    fn test_empty_match_is_valid_archive() {
        let temp = fixture();
        let config = CreationConfig::default().with_root_path(temp.path());

        let mut out = Vec::new();
        let report = write_tar(&["*.none"], &mut out, &config).unwrap();

        assert_eq!(report.total_entries(), 0);
        assert_eq!(out.len(), 1024);
        assert!(entry_names(&out).is_empty());
    }
}
