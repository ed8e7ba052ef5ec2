//! Archive creation module.
//!
//! The pipeline runs, leaf to root: glob matching ([`matcher`]), the optional
//! entry filter ([`filters`]), metadata resolution ([`metadata`]), the record
//! transform ([`record`]), the tar encoder with optional gzip
//! ([`encoder`], [`compression`]), and finally one of the two output shapes
//! in [`tar`] and [`stream`].

pub mod archive_path;
pub mod compression;
pub mod config;
pub mod encoder;
pub mod filters;
pub mod matcher;
pub mod metadata;
pub mod progress;
pub mod record;
pub mod report;
pub mod selection;
pub mod stream;
pub mod tar;

// Re-exports for public API
pub use config::CreationConfig;
pub use encoder::ArchiveEncoder;
pub use encoder::Step;
pub use filters::EntryFilter;
pub use matcher::GlobSpec;
pub use matcher::read_glob_file;
pub use metadata::EntryKind;
pub use metadata::EntryMetadata;
pub use metadata::FileIdentity;
pub use metadata::PermissionMode;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use record::ArchiveRecord;
pub use report::CreationReport;
pub use selection::SelectedPath;
pub use selection::SelectedPaths;
pub use stream::TarStream;
