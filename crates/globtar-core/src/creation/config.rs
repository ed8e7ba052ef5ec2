//! Configuration for archive creation operations.

use crate::ArchiveError;
use crate::Result;
use crate::creation::filters::EntryFilter;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Configuration for archive creation operations.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::CreationConfig;
/// use globtar_core::creation::EntryFilter;
///
/// // Plain tar rooted at the current directory
/// let config = CreationConfig::default();
///
/// // Gzip, rooted at `dist`, dropping test files
/// let custom = CreationConfig::default()
///     .with_root_path("dist")
///     .with_gzip(true)
///     .with_compression_level(9)
///     .with_filter(EntryFilter::exclude_suffixes(vec![".test.js".to_string()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationConfig {
    /// Base directory for glob matching and archive-relative paths.
    ///
    /// Default: `None` (the current working directory).
    pub root_path: Option<PathBuf>,

    /// Wrap the tar stream in gzip framing.
    ///
    /// Default: `false`.
    pub gzip: bool,

    /// Gzip compression level (1-9).
    ///
    /// `None` uses the flate2 default. Ignored unless `gzip` is set.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,

    /// Per-path include/rename/exclude function.
    ///
    /// Default: `None` (include everything unchanged).
    pub filter: Option<EntryFilter>,

    /// Sort matched paths by archive path before building the archive.
    ///
    /// Makes the output byte-identical across runs at the cost of holding
    /// the matched path list in memory.
    ///
    /// Default: `false` (matcher order, single pass).
    pub sort_paths: bool,

    /// Caller-owned cancellation flag, checked between pipeline steps.
    ///
    /// Default: `None`.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl CreationConfig {
    /// Creates a new `CreationConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn with_root_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root.into());
        self
    }

    /// Enables or disables gzip compression.
    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 1-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = Some(level);
        self
    }

    /// Sets the entry filter.
    #[must_use]
    pub fn with_filter(mut self, filter: EntryFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets whether matched paths are sorted before archiving.
    #[must_use]
    pub fn with_sort_paths(mut self, sort: bool) -> Self {
        self.sort_paths = sort;
        self
    }

    /// Sets the cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in range 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }
        Ok(())
    }

    /// Returns the configured root, or the current working directory.
    ///
    /// Existence is checked when the glob spec is built, not here.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the current directory
    /// cannot be determined.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root_path {
            Some(root) => Ok(root.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_creation_config_default() {
        let config = CreationConfig::default();
        assert_eq!(config.root_path, None);
        assert!(!config.gzip);
        assert_eq!(config.compression_level, None);
        assert!(config.filter.is_none());
        assert!(!config.sort_paths);
        assert!(config.cancel_flag.is_none());
    }

    #[test]
    fn test_creation_config_builder() {
        let flag = Arc::new(AtomicBool::new(false));
        let config = CreationConfig::new()
            .with_root_path("/base")
            .with_gzip(true)
            .with_compression_level(9)
            .with_filter(EntryFilter::identity())
            .with_sort_paths(true)
            .with_cancel_flag(Arc::clone(&flag));

        assert_eq!(config.root_path.as_deref(), Some(Path::new("/base")));
        assert!(config.gzip);
        assert_eq!(config.compression_level, Some(9));
        assert!(config.filter.is_some());
        assert!(config.sort_paths);
        assert!(config.cancel_flag.is_some());
    }

    #[test]
    fn test_creation_config_validate_valid() {
        assert!(CreationConfig::default().validate().is_ok());
        assert!(
            CreationConfig::default()
                .with_compression_level(1)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_creation_config_validate_invalid() {
        for level in [0, 10] {
            let config = CreationConfig {
                compression_level: Some(level),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ArchiveError::InvalidCompressionLevel { level: l }) if l == level
            ));
        }
    }

    #[test]
    #[should_panic(expected = "compression level must be 1-9")]
    fn test_creation_config_builder_invalid_compression() {
        let _config = CreationConfig::default().with_compression_level(0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_resolve_root_defaults_to_cwd() {
        let config = CreationConfig::default();
        assert_eq!(
            config.resolve_root().unwrap(),
            std::env::current_dir().unwrap()
        );

        let config = CreationConfig::default().with_root_path("some/dir");
        assert_eq!(config.resolve_root().unwrap(), PathBuf::from("some/dir"));
    }
}
