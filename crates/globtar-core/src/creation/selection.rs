//! Path selection: matcher output after the entry filter.

use crate::Result;
use crate::creation::archive_path::to_archive_path;
use crate::creation::archive_path::validate_archive_path;
use crate::creation::filters::EntryFilter;
use crate::creation::matcher::GlobSpec;
use crate::creation::matcher::MatchedPaths;
use std::path::PathBuf;
use tracing::debug;

/// A matched path that survived the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPath {
    /// Root-relative path used to read the entry.
    pub source: PathBuf,

    /// Canonical (forward-slash, relative) name recorded in the archive.
    pub archive_path: String,
}

/// Lazy sequence of [`SelectedPath`]s.
///
/// In the default mode each item is produced on demand from the matcher, so
/// nothing is buffered. With sorting enabled the full list is collected and
/// sorted by archive path first.
pub struct SelectedPaths {
    inner: Inner,
}

enum Inner {
    Streaming {
        matches: MatchedPaths,
        filter: Option<EntryFilter>,
    },
    Sorted(std::vec::IntoIter<SelectedPath>),
}

impl SelectedPaths {
    /// Builds the selection stage for `spec`.
    ///
    /// # Errors
    ///
    /// With `sort` enabled, any matcher or filter error surfaces here, before
    /// the first path is returned.
    pub fn new(spec: &GlobSpec, filter: Option<EntryFilter>, sort: bool) -> Result<Self> {
        let streaming = Self {
            inner: Inner::Streaming {
                matches: spec.matches(),
                filter,
            },
        };
        if !sort {
            return Ok(streaming);
        }

        let mut all = streaming.collect::<Result<Vec<_>>>()?;
        all.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));
        Ok(Self {
            inner: Inner::Sorted(all.into_iter()),
        })
    }
}

impl Iterator for SelectedPaths {
    type Item = Result<SelectedPath>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Sorted(paths) => paths.next().map(Ok),
            Inner::Streaming { matches, filter } => loop {
                let source = match matches.next()? {
                    Ok(source) => source,
                    Err(e) => return Some(Err(e)),
                };
                let matched = match to_archive_path(&source) {
                    Ok(path) => path,
                    Err(e) => return Some(Err(e)),
                };

                let Some(filter) = filter else {
                    return Some(Ok(SelectedPath {
                        source,
                        archive_path: matched,
                    }));
                };

                match filter.apply(&matched) {
                    Some(archive_path) => {
                        if let Err(e) = validate_archive_path(&archive_path) {
                            return Some(Err(e));
                        }
                        return Some(Ok(SelectedPath {
                            source,
                            archive_path,
                        }));
                    }
                    None => debug!(path = %matched, "excluded by filter"),
                }
            },
        }
    }
}
