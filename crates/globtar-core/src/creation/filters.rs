//! Entry filtering for archive creation.
//!
//! An [`EntryFilter`] maps a root-relative archive path either to the path
//! that should be recorded in the archive (possibly renamed) or to `None`,
//! which excludes the entry. Filters run before metadata resolution, so an
//! excluded path is never stat'd. Renaming only affects the recorded name;
//! content is always read from the matched source path.

use crate::creation::archive_path::normalize_separators;
use std::fmt;
use std::sync::Arc;

type FilterFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Per-path include/rename/exclude function.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::EntryFilter;
///
/// let filter = EntryFilter::new(|path| {
///     if path.ends_with(".test.js") {
///         None
///     } else {
///         Some(path.to_string())
///     }
/// });
///
/// assert_eq!(filter.apply("dir/a.js").as_deref(), Some("dir/a.js"));
/// assert_eq!(filter.apply("dir/a.test.js"), None);
/// ```
#[derive(Clone)]
pub struct EntryFilter {
    inner: Arc<FilterFn>,
}

impl EntryFilter {
    /// Wraps a filter function.
    ///
    /// Returning `None` (or an empty string) excludes the path.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Filter that passes every path through unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|path| Some(path.to_string()))
    }

    /// Filter that excludes every path ending with one of `suffixes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use globtar_core::creation::EntryFilter;
    ///
    /// let filter = EntryFilter::exclude_suffixes(vec![".test.js".to_string()]);
    /// assert_eq!(filter.apply("a.test.js"), None);
    /// assert_eq!(filter.apply("a.js").as_deref(), Some("a.js"));
    /// ```
    #[must_use]
    pub fn exclude_suffixes(suffixes: Vec<String>) -> Self {
        Self::new(move |path| {
            if suffixes.iter().any(|suffix| path.ends_with(suffix.as_str())) {
                None
            } else {
                Some(path.to_string())
            }
        })
    }

    /// Filter that strips a leading directory prefix from archive paths.
    ///
    /// Paths outside the prefix pass through unchanged. A path equal to the
    /// prefix itself is excluded, since it would have an empty name.
    ///
    /// # Examples
    ///
    /// ```
    /// use globtar_core::creation::EntryFilter;
    ///
    /// let filter = EntryFilter::strip_prefix("dist");
    /// assert_eq!(filter.apply("dist/app.js").as_deref(), Some("app.js"));
    /// assert_eq!(filter.apply("docs/readme.md").as_deref(), Some("docs/readme.md"));
    /// assert_eq!(filter.apply("dist"), None);
    /// ```
    #[must_use]
    pub fn strip_prefix(prefix: impl Into<String>) -> Self {
        let prefix = normalize_separators(&prefix.into())
            .trim_end_matches('/')
            .to_string();
        Self::new(move |path| {
            if path == prefix {
                return None;
            }
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) if rest.starts_with('/') => Some(rest.trim_start_matches('/').to_string()),
                _ => Some(path.to_string()),
            }
        })
    }

    /// Runs `self`, then `next` on whatever `self` kept.
    #[must_use]
    pub fn and_then(self, next: Self) -> Self {
        Self::new(move |path| self.apply(path).and_then(|kept| next.apply(&kept)))
    }

    /// Applies the filter to an archive path.
    ///
    /// The result is normalized to forward slashes; an empty result counts as
    /// an exclusion.
    #[must_use]
    pub fn apply(&self, path: &str) -> Option<String> {
        (self.inner)(path)
            .filter(|renamed| !renamed.is_empty())
            .map(|renamed| normalize_separators(&renamed))
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFilter").finish_non_exhaustive()
    }
}
