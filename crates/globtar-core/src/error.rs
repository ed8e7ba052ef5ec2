//! Error types for archive creation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Broad category of an [`ArchiveError`].
///
/// Categories follow the pipeline stage that produced the error, which is
/// what callers usually branch on (retry a racy build, fix a pattern, free
/// disk space).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input detected before any archive bytes were produced.
    Selection,
    /// The matcher could not read a directory while walking the root.
    Traversal,
    /// A matched entry could not be stat'd or opened.
    Resolution,
    /// A file yielded a different number of bytes than its header declared.
    LengthMismatch,
    /// The output sink rejected a write.
    Destination,
    /// The caller cancelled the build.
    Cancelled,
    /// Any other I/O failure.
    Io,
}

/// Errors that can occur while building an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Root directory does not exist.
    #[error("root directory not found: {path}")]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// Root path exists but is not a directory.
    #[error("root path is not a directory: {path}")]
    RootNotDirectory {
        /// The offending root.
        path: PathBuf,
    },

    /// No glob patterns were supplied.
    #[error("no glob patterns provided")]
    NoPatterns,

    /// A glob pattern could not be parsed.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}: expected 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The matcher failed to read a directory below the root.
    #[error("cannot read {path} while matching: {source}")]
    Traversal {
        /// Directory or entry the matcher failed on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A matched entry vanished or could not be opened.
    #[error("cannot resolve {path}: {source}")]
    Resolution {
        /// Filesystem path of the entry.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Content length disagrees with the size recorded in the header.
    ///
    /// `actual` is the number of bytes observed before the mismatch was
    /// detected; for a file that grew it is a lower bound.
    #[error("length mismatch for {path}: header declares {declared} bytes, source yielded {actual}")]
    LengthMismatch {
        /// Archive path of the entry.
        path: String,
        /// Size recorded in the header.
        declared: u64,
        /// Bytes observed.
        actual: u64,
    },

    /// The output sink rejected a write.
    #[error("failed to write archive output: {0}")]
    Destination(#[source] io::Error),

    /// A path cannot be represented as an archive entry name.
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// An archive path produced by a filter is not a safe relative path.
    #[error("invalid archive path '{path}': {reason}")]
    InvalidArchivePath {
        /// The rejected archive path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The build was cancelled through the configured cancellation flag.
    #[error("archive creation cancelled")]
    Cancelled,
}

impl ArchiveError {
    /// Returns the category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use globtar_core::ArchiveError;
    /// use globtar_core::ErrorKind;
    ///
    /// assert_eq!(ArchiveError::NoPatterns.kind(), ErrorKind::Selection);
    /// assert_eq!(ArchiveError::Cancelled.kind(), ErrorKind::Cancelled);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RootNotFound { .. }
            | Self::RootNotDirectory { .. }
            | Self::NoPatterns
            | Self::InvalidPattern { .. }
            | Self::InvalidCompressionLevel { .. } => ErrorKind::Selection,
            Self::Traversal { .. } => ErrorKind::Traversal,
            Self::Resolution { .. } | Self::NonUtf8Path { .. } | Self::InvalidArchivePath { .. } => {
                ErrorKind::Resolution
            }
            Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::Destination(_) => ErrorKind::Destination,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns `true` if the error was raised before any output was produced.
    #[must_use]
    pub const fn is_selection_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Selection)
    }

    /// Wraps the error in an `io::Error` so it can cross a `Read` boundary.
    ///
    /// The original error is recoverable with [`ArchiveError::from_io`].
    #[must_use]
    pub fn into_io(self) -> io::Error {
        let kind = match &self {
            Self::Io(err) | Self::Destination(err) => err.kind(),
            Self::Resolution { source, .. } | Self::Traversal { source, .. } => source.kind(),
            Self::LengthMismatch { .. } => io::ErrorKind::InvalidData,
            Self::Cancelled => io::ErrorKind::Interrupted,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, self)
    }

    /// Recovers an `ArchiveError` previously wrapped by [`ArchiveError::into_io`].
    ///
    /// Plain I/O errors become [`ArchiveError::Io`].
    ///
    /// # Examples
    ///
    /// ```
    /// use globtar_core::ArchiveError;
    ///
    /// let io_err = ArchiveError::Cancelled.into_io();
    /// assert!(matches!(ArchiveError::from_io(io_err), ArchiveError::Cancelled));
    /// ```
    #[must_use]
    pub fn from_io(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<Self>()) {
            match err.into_inner().map(|inner| inner.downcast::<Self>()) {
                Some(Ok(archive_err)) => *archive_err,
                Some(Err(other)) => Self::Io(io::Error::other(other)),
                None => Self::Io(io::Error::other("empty I/O error")),
            }
        } else {
            Self::Io(err)
        }
    }

    pub(crate) fn resolution(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Resolution {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::NoPatterns;
        assert_eq!(err.to_string(), "no glob patterns provided");

        let err = ArchiveError::LengthMismatch {
            path: "dir/a.js".to_string(),
            declared: 10,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch for dir/a.js: header declares 10 bytes, source yielded 4"
        );
    }

    #[test]
    fn test_error_kinds() {
        let err = ArchiveError::RootNotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(err.is_selection_error());

        let err = ArchiveError::resolution("gone.txt", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(!err.is_selection_error());

        let err = ArchiveError::Destination(io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Destination);

        let err = ArchiveError::InvalidCompressionLevel { level: 0 };
        assert_eq!(err.kind(), ErrorKind::Selection);
    }

    #[test]
    fn test_into_io_roundtrip_preserves_variant() {
        let err = ArchiveError::LengthMismatch {
            path: "a".to_string(),
            declared: 3,
            actual: 1,
        };
        let io_err = err.into_io();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

        match ArchiveError::from_io(io_err) {
            ArchiveError::LengthMismatch {
                declared, actual, ..
            } => {
                assert_eq!(declared, 3);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_io_plain_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ArchiveError::from_io(io_err);
        assert!(matches!(err, ArchiveError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_resolution_keeps_source_kind() {
        let err = ArchiveError::resolution("x", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.into_io().kind(), io::ErrorKind::NotFound);
    }
}
