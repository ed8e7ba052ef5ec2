//! Archive record transform.
//!
//! Turns selected paths into [`ArchiveRecord`]s one at a time. A file record
//! owns the open handle its content is read from; dropping the record (or the
//! transform) closes it.

use crate::ArchiveError;
use crate::Result;
use crate::creation::metadata::EntryMetadata;
use crate::creation::metadata::FileIdentity;
use crate::creation::metadata::Resolution;
use crate::creation::metadata::resolve;
use crate::creation::selection::SelectedPath;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use tracing::warn;

/// Content source that enforces the length declared in the header.
///
/// The reader is consumed exactly once, in chunks, by [`FileSource::fill`].
/// Reading fewer bytes than declared, or finding more after the declared
/// length, is reported as [`ArchiveError::LengthMismatch`].
#[derive(Debug)]
pub struct FileSource<R> {
    reader: R,
    path: String,
    declared: u64,
    consumed: u64,
}

impl<R: Read> FileSource<R> {
    /// Wraps `reader`, which must yield exactly `declared` bytes.
    pub fn new(reader: R, path: impl Into<String>, declared: u64) -> Self {
        Self {
            reader,
            path: path.into(),
            declared,
            consumed: 0,
        }
    }

    /// Returns the length recorded in the header.
    #[must_use]
    pub fn declared_len(&self) -> u64 {
        self.declared
    }

    /// Returns the number of bytes still expected.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.declared - self.consumed
    }

    /// Reads the next chunk of content into `buf`.
    ///
    /// Returns `Ok(0)` once the declared length has been read.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::LengthMismatch`] if the source ends early, or
    /// [`ArchiveError::Resolution`] if reading fails.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));

        loop {
            match self.reader.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(ArchiveError::LengthMismatch {
                        path: self.path.clone(),
                        declared: self.declared,
                        actual: self.consumed,
                    });
                }
                Ok(n) => {
                    self.consumed += n as u64;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ArchiveError::resolution(PathBuf::from(&self.path), e)),
            }
        }
    }

    /// Checks that the source has nothing beyond the declared length.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::LengthMismatch`] if content is left unread or
    /// the source grew after its size was recorded.
    pub fn finish(&mut self) -> Result<()> {
        if self.remaining() > 0 {
            return Err(ArchiveError::LengthMismatch {
                path: self.path.clone(),
                declared: self.declared,
                actual: self.consumed,
            });
        }

        let mut probe = [0u8; 1];
        loop {
            match self.reader.read(&mut probe) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    return Err(ArchiveError::LengthMismatch {
                        path: self.path.clone(),
                        declared: self.declared,
                        actual: self.declared + 1,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ArchiveError::resolution(PathBuf::from(&self.path), e)),
            }
        }
    }
}

/// One archive-ready entry.
#[derive(Debug)]
pub enum ArchiveRecord {
    /// File (or symlink target) with its content source.
    File {
        /// Canonical archive path.
        path: String,
        /// Header fields.
        metadata: EntryMetadata,
        /// Content, read once.
        source: FileSource<File>,
    },
    /// Directory, header only.
    Directory {
        /// Canonical archive path.
        path: String,
        /// Header fields.
        metadata: EntryMetadata,
    },
}

impl ArchiveRecord {
    /// Returns the canonical archive path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }

    /// Returns the header fields.
    #[must_use]
    pub fn metadata(&self) -> &EntryMetadata {
        match self {
            Self::File { metadata, .. } | Self::Directory { metadata, .. } => metadata,
        }
    }
}

/// Lazily maps selected paths to archive records.
///
/// Entries that are neither files, directories, nor symlinks to either are
/// dropped and counted; they never abort the pipeline. A file matching the
/// excluded identity (the archive being written) is dropped with a warning.
pub struct RecordTransform<I> {
    paths: I,
    root: PathBuf,
    excluded: Option<FileIdentity>,
    skipped: usize,
    warnings: Vec<String>,
}

impl<I> RecordTransform<I>
where
    I: Iterator<Item = Result<SelectedPath>>,
{
    /// Creates a transform reading entries below `root`.
    pub fn new(paths: I, root: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            root: root.into(),
            excluded: None,
            skipped: 0,
            warnings: Vec::new(),
        }
    }

    /// Drops any file with this identity instead of archiving it.
    pub fn exclude(&mut self, identity: FileIdentity) {
        self.excluded = Some(identity);
    }

    fn is_excluded(&self, file: &File, source: &Path) -> bool {
        self.excluded.as_ref().is_some_and(|excluded| {
            FileIdentity::of_file(file, &self.root.join(source))
                .is_ok_and(|identity| identity == *excluded)
        })
    }

    /// Returns how many special entries have been dropped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Takes the warnings accumulated so far.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

impl<I> Iterator for RecordTransform<I>
where
    I: Iterator<Item = Result<SelectedPath>>,
{
    type Item = Result<ArchiveRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let selected = match self.paths.next()? {
                Ok(selected) => selected,
                Err(e) => return Some(Err(e)),
            };

            let record = match resolve(&selected.source, &self.root) {
                Err(e) => return Some(Err(e)),
                Ok(Resolution::Directory(metadata)) => ArchiveRecord::Directory {
                    path: selected.archive_path,
                    metadata,
                },
                Ok(Resolution::File(metadata, file)) => {
                    if self.is_excluded(&file, &selected.source) {
                        warn!(path = %selected.archive_path, "skipping the archive being written");
                        self.warnings.push(format!(
                            "skipped {}: file is the archive being written",
                            selected.archive_path
                        ));
                        continue;
                    }
                    let declared = metadata.size.unwrap_or(0);
                    ArchiveRecord::File {
                        source: FileSource::new(file, selected.archive_path.as_str(), declared),
                        path: selected.archive_path,
                        metadata,
                    }
                }
                Ok(Resolution::Special(description)) => {
                    warn!(path = %selected.archive_path, kind = description, "skipping entry");
                    self.skipped += 1;
                    self.warnings
                        .push(format!("skipped {description}: {}", selected.archive_path));
                    continue;
                }
            };
            return Some(Ok(record));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::creation::metadata::EntryKind;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn selected(path: &str) -> Result<SelectedPath> {
        Ok(SelectedPath {
            source: PathBuf::from(path),
            archive_path: path.to_string(),
        })
    }

    #[test]
    fn test_file_source_exact_length() {
        let mut source = FileSource::new(Cursor::new(b"abcdef".to_vec()), "a", 6);
        let mut buf = [0u8; 4];

        assert_eq!(source.fill(&mut buf).unwrap(), 4);
        assert_eq!(source.fill(&mut buf).unwrap(), 2);
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
        assert!(source.finish().is_ok());
    }

    #[test]
    fn test_file_source_shrunk() {
        let mut source = FileSource::new(Cursor::new(b"abc".to_vec()), "a.js", 10);
        let mut buf = [0u8; 16];

        assert_eq!(source.fill(&mut buf).unwrap(), 3);
        match source.fill(&mut buf).unwrap_err() {
            ArchiveError::LengthMismatch {
                path,
                declared,
                actual,
            } => {
                assert_eq!(path, "a.js");
                assert_eq!(declared, 10);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_source_grown() {
        let mut source = FileSource::new(Cursor::new(b"abcdef".to_vec()), "a.js", 4);
        let mut buf = [0u8; 16];

        assert_eq!(source.fill(&mut buf).unwrap(), 4);
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
        let err = source.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn test_file_source_empty() {
        let mut source = FileSource::new(io::empty(), "empty", 0);
        let mut buf = [0u8; 8];
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
        assert!(source.finish().is_ok());
    }

    #[test]
    fn test_transform_classifies() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        fs::write(temp.path().join("dir/a.js"), "a").unwrap();

        let paths = vec![selected("dir"), selected("dir/a.js")];
        let records: Vec<_> = RecordTransform::new(paths.into_iter(), temp.path())
            .map(Result::unwrap)
            .collect();

        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], ArchiveRecord::Directory { .. }));
        assert_eq!(records[1].path(), "dir/a.js");
        assert_eq!(records[1].metadata().kind, EntryKind::File);
    }

    #[test]
    fn test_transform_propagates_missing_entry() {
        let temp = TempDir::new().unwrap();
        let mut transform = RecordTransform::new(vec![selected("gone.js")].into_iter(), temp.path());

        let err = transform.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_transform_drops_excluded_output() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.js"), "a").unwrap();
        let output = temp.path().join("out.tar");
        let file = File::create(&output).unwrap();

        let paths = vec![selected("a.js"), selected("out.tar")];
        let mut transform = RecordTransform::new(paths.into_iter(), temp.path());
        transform.exclude(FileIdentity::of_file(&file, &output).unwrap());
        let records: Vec<_> = transform.by_ref().map(Result::unwrap).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path(), "a.js");
        assert_eq!(transform.skipped(), 0);
        assert_eq!(
            transform.take_warnings(),
            vec!["skipped out.tar: file is the archive being written"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_transform_drops_fifo() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.js"), "a").unwrap();
        let status = std::process::Command::new("mkfifo")
            .arg(temp.path().join("pipe"))
            .status();
        if !status.is_ok_and(|s| s.success()) {
            return;
        }

        let paths = vec![selected("pipe"), selected("a.js")];
        let mut transform = RecordTransform::new(paths.into_iter(), temp.path());
        let records: Vec<_> = transform.by_ref().map(Result::unwrap).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path(), "a.js");
        assert_eq!(transform.skipped(), 1);
        assert_eq!(transform.take_warnings(), vec!["skipped named pipe: pipe"]);
    }
}
