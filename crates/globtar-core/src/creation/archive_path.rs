//! Canonical archive paths.
//!
//! Archive entry names are always relative, forward-slash separated strings.
//! They are taken from the matcher (or filter) output as-is, never recomputed
//! against the root afterwards.

use crate::ArchiveError;
use crate::Result;
use std::path::Component;
use std::path::MAIN_SEPARATOR;
use std::path::Path;

/// Converts a root-relative path produced by the matcher into an archive path.
///
/// # Errors
///
/// Returns [`ArchiveError::NonUtf8Path`] if the path is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::archive_path::to_archive_path;
/// use std::path::Path;
///
/// assert_eq!(to_archive_path(Path::new("dir/a.js"))?, "dir/a.js");
/// # Ok::<(), globtar_core::ArchiveError>(())
/// ```
pub fn to_archive_path(relative: &Path) -> Result<String> {
    let raw = relative.to_str().ok_or_else(|| ArchiveError::NonUtf8Path {
        path: relative.to_path_buf(),
    })?;
    Ok(normalize_separators(raw))
}

/// Rewrites host separators to forward slashes on backslash hosts.
///
/// On hosts whose separator is already `/` the path is returned unchanged.
/// There a backslash is an ordinary file name character, so a file named
/// `a\b.js` keeps that name in the archive.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    normalize_with_separator(path, MAIN_SEPARATOR)
}

/// Rewrites `separator` to `/` when the separator is a backslash.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::archive_path::normalize_with_separator;
///
/// assert_eq!(normalize_with_separator(r"dir\sub\a.js", '\\'), "dir/sub/a.js");
/// assert_eq!(normalize_with_separator(r"odd\name", '/'), r"odd\name");
/// ```
#[must_use]
pub fn normalize_with_separator(path: &str, separator: char) -> String {
    if separator == '\\' {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Checks that an archive path is relative and stays inside the archive.
///
/// Matcher output always passes; this guards paths returned by a renaming
/// filter.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidArchivePath`] for empty, absolute, or
/// parent-escaping paths.
pub fn validate_archive_path(path: &str) -> Result<()> {
    let invalid = |reason| ArchiveError::InvalidArchivePath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    for component in Path::new(path).components() {
        match component {
            Component::ParentDir => return Err(invalid("path must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_archive_path_relative() {
        assert_eq!(to_archive_path(Path::new("b.js")).unwrap(), "b.js");
        assert_eq!(
            to_archive_path(&Path::new("dir").join("a.js")).unwrap(),
            "dir/a.js"
        );
    }

    #[test]
    fn test_backslash_host_rewrites_separators() {
        let normalized = normalize_with_separator(r"dir\nested\a.js", '\\');
        assert_eq!(normalized, "dir/nested/a.js");
        assert!(!normalized.contains('\\'));
    }

    #[test]
    fn test_slash_host_keeps_path() {
        assert_eq!(normalize_with_separator("dir/a.js", '/'), "dir/a.js");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\xffname"));
        let err = to_archive_path(path).unwrap_err();
        assert!(matches!(err, ArchiveError::NonUtf8Path { .. }));
    }

    #[test]
    fn test_validate_archive_path() {
        assert!(validate_archive_path("dir/a.js").is_ok());
        assert!(validate_archive_path("./a.js").is_ok());
        assert!(validate_archive_path("").is_err());
        assert!(validate_archive_path("/etc/passwd").is_err());
        assert!(validate_archive_path("../outside").is_err());
        assert!(validate_archive_path("dir/../../outside").is_err());
    }
}
