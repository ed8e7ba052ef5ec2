//! Glob-driven path discovery.
//!
//! [`GlobSpec`] pairs one or more glob patterns with a root directory and
//! produces a lazy, single-pass sequence of root-relative paths. Matching
//! itself is delegated to the `glob` crate. Patterns written as absolute
//! (`/**/*.js`) are rooted at the spec's root, not at the filesystem root.
//! Hidden entries are matched by wildcards.

use crate::ArchiveError;
use crate::Result;
use glob::MatchOptions;
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Glob patterns plus the root they are matched against.
///
/// # Examples
///
/// ```no_run
/// use globtar_core::creation::GlobSpec;
///
/// let spec = GlobSpec::new(&["**/*.js", "/assets/*"], "./dist")?;
/// for path in spec.matches() {
///     println!("{}", path?.display());
/// }
/// # Ok::<(), globtar_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GlobSpec {
    root: PathBuf,
    patterns: Vec<String>,
    rooted_patterns: Vec<String>,
}

impl GlobSpec {
    /// Validates the root and every pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No patterns are given
    /// - The root does not exist or is not a directory
    /// - A pattern is malformed or reaches outside the root with `..`
    /// - The root path is not valid UTF-8
    pub fn new<S: AsRef<str>>(patterns: &[S], root: impl AsRef<Path>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(ArchiveError::NoPatterns);
        }

        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ArchiveError::RootNotFound {
                    path: root.to_path_buf(),
                }
            } else {
                ArchiveError::resolution(root, e)
            }
        })?;
        if !metadata.is_dir() {
            return Err(ArchiveError::RootNotDirectory {
                path: root.to_path_buf(),
            });
        }

        let root = std::path::absolute(root)?;
        let root_str = root.to_str().ok_or_else(|| ArchiveError::NonUtf8Path {
            path: root.clone(),
        })?;
        let escaped_root = Pattern::escape(root_str);
        let escaped_root = escaped_root.trim_end_matches(['/', '\\']);

        let mut owned = Vec::with_capacity(patterns.len());
        let mut rooted_patterns = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let relative = pattern.trim_start_matches(['/', '\\']);
            if relative.is_empty() {
                return Err(ArchiveError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "pattern does not select anything below the root".to_string(),
                });
            }
            if relative.split(['/', '\\']).any(|component| component == "..") {
                return Err(ArchiveError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "pattern must not contain '..' components".to_string(),
                });
            }

            let rooted = format!("{escaped_root}/{relative}");
            Pattern::new(&rooted).map_err(|e| ArchiveError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })?;

            owned.push(pattern.to_string());
            rooted_patterns.push(rooted);
        }

        Ok(Self {
            root,
            patterns: owned,
            rooted_patterns,
        })
    }

    /// Returns the absolute root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the patterns as supplied.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns a lazy iterator over matched root-relative paths.
    ///
    /// A path matched by several patterns is yielded once. With more than
    /// one pattern this keeps every path yielded so far in memory, so the
    /// cost grows with the number of matches; a single pattern keeps
    /// nothing.
    #[must_use]
    pub fn matches(&self) -> MatchedPaths {
        MatchedPaths {
            root: self.root.clone(),
            pending: self.rooted_patterns.clone().into_iter(),
            current: None,
            seen: (self.rooted_patterns.len() > 1).then(HashSet::new),
        }
    }
}

/// Lazy iterator over root-relative matches of a [`GlobSpec`].
pub struct MatchedPaths {
    root: PathBuf,
    pending: std::vec::IntoIter<String>,
    current: Option<glob::Paths>,
    seen: Option<HashSet<PathBuf>>,
}

impl Iterator for MatchedPaths {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let pattern = self.pending.next()?;
                match glob::glob_with(&pattern, match_options()) {
                    Ok(paths) => self.current = Some(paths),
                    Err(e) => {
                        return Some(Err(ArchiveError::InvalidPattern {
                            pattern,
                            reason: e.msg.to_string(),
                        }));
                    }
                }
            }
            let Some(paths) = self.current.as_mut() else {
                continue;
            };

            match paths.next() {
                None => self.current = None,
                Some(Err(e)) => {
                    let path = e.path().to_path_buf();
                    return Some(Err(ArchiveError::Traversal {
                        path,
                        source: e.into_error(),
                    }));
                }
                Some(Ok(full)) => {
                    let Ok(relative) = full.strip_prefix(&self.root) else {
                        return Some(Err(ArchiveError::InvalidArchivePath {
                            path: full.display().to_string(),
                            reason: "match is outside the root directory",
                        }));
                    };
                    if relative.as_os_str().is_empty() {
                        continue;
                    }
                    let relative = relative.to_path_buf();
                    if let Some(seen) = &mut self.seen
                        && !seen.insert(relative.clone())
                    {
                        continue;
                    }
                    debug!(path = %relative.display(), "matched");
                    return Some(Ok(relative));
                }
            }
        }
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Reads glob patterns from a text file, one per non-blank line.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_glob_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)?;
    Ok(parse_glob_list(&data))
}

/// Splits a newline-delimited pattern list, trimming lines and dropping blanks.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::matcher::parse_glob_list;
///
/// let patterns = parse_glob_list("src/*.js\r\n\n  src/*.ts  \n");
/// assert_eq!(patterns, vec!["src/*.js", "src/*.ts"]);
/// ```
#[must_use]
pub fn parse_glob_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
