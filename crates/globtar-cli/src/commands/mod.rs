//! Command implementations.

pub mod create;
pub mod matches;

use crate::cli::SelectionArgs;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use globtar_core::CreationConfig;
use globtar_core::EntryFilter;
use globtar_core::read_glob_file;
use tracing::debug;

/// Collects patterns from the command line and `--glob-file`.
fn collect_patterns(args: &SelectionArgs) -> Result<Vec<String>> {
    let mut patterns = args.patterns.clone();

    if let Some(glob_file) = &args.glob_file {
        let from_file = read_glob_file(glob_file).with_context(|| {
            format!("Failed to read glob file '{}'", glob_file.display())
        })?;
        debug!(
            file = %glob_file.display(),
            count = from_file.len(),
            "loaded patterns from glob file"
        );
        patterns.extend(from_file);
    }

    if patterns.is_empty() {
        bail!(
            "No glob patterns given\n\
             HINT: Pass PATTERN arguments or --glob-file with one pattern per line."
        );
    }

    Ok(patterns)
}

/// Builds the entry filter from `--exclude-suffix` and `--strip-prefix`.
fn build_filter(args: &SelectionArgs) -> Option<EntryFilter> {
    let exclude = (!args.exclude_suffix.is_empty())
        .then(|| EntryFilter::exclude_suffixes(args.exclude_suffix.clone()));
    let strip = args.strip_prefix.clone().map(EntryFilter::strip_prefix);

    match (exclude, strip) {
        (Some(exclude), Some(strip)) => Some(exclude.and_then(strip)),
        (exclude, strip) => exclude.or(strip),
    }
}

/// Builds the core configuration shared by every command.
fn build_config(args: &SelectionArgs) -> CreationConfig {
    let mut config = CreationConfig::default().with_sort_paths(args.sort);

    if let Some(root) = &args.root {
        config = config.with_root_path(root);
    }
    if let Some(filter) = build_filter(args) {
        config = config.with_filter(filter);
    }

    config
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn selection(patterns: &[&str]) -> SelectionArgs {
        SelectionArgs {
            patterns: patterns.iter().map(ToString::to_string).collect(),
            root: None,
            glob_file: None,
            exclude_suffix: Vec::new(),
            strip_prefix: None,
            sort: false,
        }
    }

    #[test]
    fn test_collect_patterns_requires_one() {
        let err = collect_patterns(&selection(&[])).unwrap_err();
        assert!(err.to_string().contains("HINT"));
    }

    #[test]
    fn test_collect_patterns_appends_glob_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let list = dir.path().join("globs.txt");
        std::fs::write(&list, "/assets/*\n\n  **/*.css\n").unwrap();

        let mut args = selection(&["**/*.js"]);
        args.glob_file = Some(list);

        assert_eq!(
            collect_patterns(&args).unwrap(),
            vec!["**/*.js", "/assets/*", "**/*.css"]
        );
    }

    #[test]
    fn test_build_filter_chains_exclude_then_strip() {
        let mut args = selection(&["*"]);
        args.exclude_suffix = vec![".map".to_string()];
        args.strip_prefix = Some("dist".to_string());

        let filter = build_filter(&args).unwrap();
        assert_eq!(filter.apply("dist/app.js").as_deref(), Some("app.js"));
        assert_eq!(filter.apply("dist/app.js.map"), None);
    }

    #[test]
    fn test_build_filter_none_without_flags() {
        assert!(build_filter(&selection(&["*"])).is_none());
    }

    #[test]
    fn test_build_config_carries_root_and_sort() {
        let mut args = selection(&["*"]);
        args.root = Some(PathBuf::from("dist"));
        args.sort = true;

        let config = build_config(&args);
        assert_eq!(config.root_path, Some(PathBuf::from("dist")));
        assert!(config.sort_paths);
    }
}
