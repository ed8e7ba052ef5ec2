//! Pull-driven archive encoder.
//!
//! [`ArchiveEncoder`] chains the matcher, filter, record transform, tar
//! encoder, and optional gzip stage. Nothing runs until [`ArchiveEncoder::advance`]
//! is called; each call performs one unit of work (one header, or one chunk
//! of at most [`CHUNK_SIZE`] content bytes) and writes its output into the
//! destination before returning. Memory is bounded by the chunk buffer and
//! whatever the destination itself retains.
//!
//! Headers are serialized by the `tar` crate (including GNU long-name
//! extensions). Content is streamed separately in chunks so a file is never
//! held in memory as a whole; the declared length is enforced by
//! [`FileSource`].

use crate::ArchiveError;
use crate::Result;
use crate::creation::compression::OutputWriter;
use crate::creation::config::CreationConfig;
use crate::creation::matcher::GlobSpec;
use crate::creation::metadata::EntryKind;
use crate::creation::metadata::EntryMetadata;
use crate::creation::metadata::FileIdentity;
use crate::creation::progress::ProgressCallback;
use crate::creation::record::ArchiveRecord;
use crate::creation::record::FileSource;
use crate::creation::record::RecordTransform;
use crate::creation::report::CreationReport;
use crate::creation::selection::SelectedPaths;
use std::fs::File;
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tar::Builder;
use tar::EntryType;
use tar::Header;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Maximum number of content bytes copied per step.
pub const CHUNK_SIZE: usize = 64 * 1024;

const BLOCK_SIZE: u64 = 512;

/// Unit of work performed by one call to [`ArchiveEncoder::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An entry header was written.
    Header,
    /// A chunk of file content (this many bytes) was written.
    Content(usize),
    /// A file entry was completed (length verified, block padding written).
    EntryEnd,
    /// The archive trailer was written and the output flushed.
    Finished,
}

enum State {
    Ready,
    Content {
        path: String,
        source: FileSource<File>,
    },
    Finished,
    Failed,
}

/// Single-pass archive pipeline writing into `W`.
///
/// Dropping an encoder before it finishes releases every open file handle
/// and seals the destination, so no tar or gzip trailer is written after
/// partial output.
pub struct ArchiveEncoder<'a, W: Write> {
    records: RecordTransform<SelectedPaths>,
    builder: Builder<OutputWriter<W>>,
    state: State,
    chunk: Box<[u8]>,
    progress: Box<dyn ProgressCallback + 'a>,
    cancel_flag: Option<Arc<AtomicBool>>,
    report: CreationReport,
    entries: usize,
    started: Instant,
}

impl<'a, W: Write> ArchiveEncoder<'a, W> {
    /// Validates the configuration and patterns and builds the pipeline.
    ///
    /// No archive bytes are produced here.
    ///
    /// # Errors
    ///
    /// Returns a selection error if the configuration is invalid, the root is
    /// missing or not a directory, or a pattern is malformed. With sorting
    /// enabled, matcher and filter errors also surface here.
    pub fn new<S: AsRef<str>>(
        patterns: &[S],
        destination: W,
        config: &CreationConfig,
        progress: Box<dyn ProgressCallback + 'a>,
    ) -> Result<Self> {
        config.validate()?;
        let root = config.resolve_root()?;
        let spec = GlobSpec::new(patterns, &root)?;
        let selected = SelectedPaths::new(&spec, config.filter.clone(), config.sort_paths)?;

        info!(
            root = %spec.root().display(),
            patterns = ?spec.patterns(),
            gzip = config.gzip,
            "building archive"
        );

        let output = OutputWriter::new(destination, config.gzip, config.compression_level);
        Ok(Self {
            records: RecordTransform::new(selected, spec.root()),
            builder: Builder::new(output),
            state: State::Ready,
            chunk: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
            progress,
            cancel_flag: config.cancel_flag.clone(),
            report: CreationReport::default(),
            entries: 0,
            started: Instant::now(),
        })
    }

    /// Keeps the file with `identity` out of the archive.
    ///
    /// Set when the destination is itself a file that the patterns may match.
    pub(crate) fn exclude_output(&mut self, identity: FileIdentity) {
        self.records.exclude(identity);
    }

    /// Performs the next unit of work.
    ///
    /// After [`Step::Finished`] every further call returns `Step::Finished`.
    /// After an error the pipeline is torn down and every further call fails.
    ///
    /// # Errors
    ///
    /// Returns the first resolution, length, destination, or cancellation
    /// error. The destination keeps whatever was written before it.
    pub fn advance(&mut self) -> Result<Step> {
        match self.state {
            State::Finished => return Ok(Step::Finished),
            State::Failed => {
                return Err(ArchiveError::Io(io::Error::other(
                    "archive pipeline aborted after an earlier error",
                )));
            }
            State::Ready | State::Content { .. } => {}
        }

        let result = self.step();
        if let Err(e) = &result {
            debug!(error = %e, "aborting archive pipeline");
            self.abandon();
        }
        result
    }

    /// Drives the pipeline to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`ArchiveEncoder::advance`].
    pub fn run(mut self) -> Result<CreationReport> {
        while self.advance()? != Step::Finished {}
        Ok(std::mem::take(&mut self.report))
    }

    /// Returns the report; complete once [`Step::Finished`] was returned.
    #[must_use]
    pub fn report(&self) -> &CreationReport {
        &self.report
    }

    /// Returns `true` once the trailer has been written and flushed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    /// Returns the destination.
    pub fn destination_mut(&mut self) -> &mut W {
        self.builder.get_mut().sink_mut().get_mut()
    }

    fn step(&mut self) -> Result<Step> {
        if self
            .cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Err(ArchiveError::Cancelled);
        }

        // terminal states were handled by `advance`
        match std::mem::replace(&mut self.state, State::Ready) {
            State::Content { path, source } => self.copy_chunk(path, source),
            State::Ready | State::Finished | State::Failed => self.next_record(),
        }
    }

    fn next_record(&mut self) -> Result<Step> {
        let Some(record) = self.records.next() else {
            return self.finish_archive();
        };
        let record = record?;

        self.entries += 1;
        self.progress.on_entry_start(record.path(), self.entries);

        let mut header = header_for(record.metadata());
        if let Err(e) = self
            .builder
            .append_data(&mut header, record.path(), io::empty())
        {
            return Err(self.header_error(record.path(), e));
        }

        match record {
            ArchiveRecord::Directory { path, metadata } => {
                self.report.directories_added += 1;
                debug!(path = %path, mode = %metadata.mode, "added directory");
                self.progress.on_entry_complete(&path);
            }
            ArchiveRecord::File {
                path,
                metadata,
                source,
            } => {
                self.report.files_added += 1;
                if metadata.kind == EntryKind::SymlinkAsFile {
                    self.report.symlinks_followed += 1;
                }
                self.state = State::Content { path, source };
            }
        }
        Ok(Step::Header)
    }

    fn copy_chunk(&mut self, path: String, mut source: FileSource<File>) -> Result<Step> {
        let n = source.fill(&mut self.chunk)?;
        if n == 0 {
            source.finish()?;
            let declared = source.declared_len();
            drop(source);

            let padding = block_padding(declared);
            if padding > 0 {
                self.builder
                    .get_mut()
                    .write_all(&[0u8; BLOCK_SIZE as usize][..padding])
                    .map_err(ArchiveError::Destination)?;
            }
            debug!(path = %path, size = declared, "added file");
            self.progress.on_entry_complete(&path);
            return Ok(Step::EntryEnd);
        }

        self.builder
            .get_mut()
            .write_all(&self.chunk[..n])
            .map_err(ArchiveError::Destination)?;
        self.report.bytes_read += n as u64;
        self.progress.on_bytes_written(n as u64);
        self.state = State::Content { path, source };
        Ok(Step::Content(n))
    }

    fn finish_archive(&mut self) -> Result<Step> {
        self.builder.finish().map_err(ArchiveError::Destination)?;
        self.builder
            .get_mut()
            .try_finish()
            .map_err(ArchiveError::Destination)?;

        self.report.entries_skipped = self.records.skipped();
        self.report.warnings.extend(self.records.take_warnings());
        self.report.bytes_written = self.builder.get_ref().sink().total_bytes();
        self.report.duration = self.started.elapsed();
        self.state = State::Finished;

        info!(
            files = self.report.files_added,
            directories = self.report.directories_added,
            skipped = self.report.entries_skipped,
            bytes = self.report.bytes_written,
            "archive complete"
        );
        self.progress.on_complete(&self.report);
        Ok(Step::Finished)
    }

    fn header_error(&self, path: &str, err: io::Error) -> ArchiveError {
        if self.builder.get_ref().sink().has_failed() {
            ArchiveError::Destination(err)
        } else {
            warn!(path, error = %err, "tar encoder rejected entry path");
            ArchiveError::InvalidArchivePath {
                path: path.to_string(),
                reason: "cannot be encoded in a tar header",
            }
        }
    }

    fn abandon(&mut self) {
        // drops any open content handle
        self.state = State::Failed;
        self.builder.get_mut().sink_mut().seal();
    }
}

impl<W: Write> Drop for ArchiveEncoder<'_, W> {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.builder.get_mut().sink_mut().seal();
        }
    }
}

fn header_for(metadata: &EntryMetadata) -> Header {
    let mut header = Header::new_ustar();
    match metadata.kind {
        EntryKind::Directory => {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
        }
        EntryKind::File | EntryKind::SymlinkAsFile => {
            header.set_entry_type(EntryType::Regular);
            header.set_size(metadata.size.unwrap_or(0));
        }
    }
    header.set_mode(metadata.mode.header_bits());
    header.set_uid(metadata.uid);
    header.set_gid(metadata.gid);
    header.set_mtime(metadata.mtime);
    header
}

/// Zero bytes needed to pad `len` content bytes to a 512-byte block.
fn block_padding(len: u64) -> usize {
    let remainder = len % BLOCK_SIZE;
    if remainder == 0 {
        0
    } else {
        // always < 512
        #[allow(clippy::cast_possible_truncation)]
        let padding = (BLOCK_SIZE - remainder) as usize;
        padding
    }
}
