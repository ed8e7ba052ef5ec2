//! Streaming tar and tar.gz archive builder driven by glob patterns.
//!
//! `globtar-core` selects files below a root directory with glob patterns,
//! optionally filters or renames them, and streams them into a tar archive
//! (optionally gzip-compressed) without holding whole files or the full
//! file list in memory.
//!
//! # Examples
//!
//! ```no_run
//! use globtar_core::create_tar;
//! use globtar_core::creation::CreationConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CreationConfig::default().with_root_path("dist").with_gzip(true);
//! let report = create_tar(&["**/*.js", "/assets/*"], "bundle.tar.gz", &config)?;
//! println!("Archived {} files", report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod creation;
pub mod error;
pub mod io;

pub use creation::CreationConfig;
pub use creation::CreationReport;
pub use creation::EntryFilter;
pub use creation::GlobSpec;
pub use creation::NoopProgress;
pub use creation::ProgressCallback;
pub use creation::TarStream;
pub use creation::read_glob_file;
pub use creation::tar::create_tar;
pub use creation::tar::create_tar_stream;
pub use creation::tar::create_tar_stream_with_progress;
pub use creation::tar::create_tar_with_progress;
pub use creation::tar::select_paths;
pub use creation::tar::write_tar;
pub use creation::tar::write_tar_with_progress;
pub use error::ArchiveError;
pub use error::ErrorKind;
pub use error::Result;
