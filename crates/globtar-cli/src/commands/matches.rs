//! Match command implementation: prints the archive paths a `create` run
//! would record, without reading file contents.

use super::build_config;
use super::collect_patterns;
use crate::cli::MatchArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use globtar_core::select_paths;
use tracing::debug;

const TRACE_NAME: &str = "<match>";

pub fn execute(args: &MatchArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let patterns = collect_patterns(&args.selection)?;
    let config = build_config(&args.selection);

    let selected = add_archive_context(select_paths(&patterns, &config), TRACE_NAME)?;
    let paths = selected
        .map(|entry| entry.map(|selected| selected.archive_path))
        .collect::<Result<Vec<_>, _>>();
    let paths = add_archive_context(paths, TRACE_NAME)?;

    debug!(count = paths.len(), "selection complete");
    if paths.is_empty() {
        formatter.format_warning("no paths matched the given patterns");
    }
    formatter.format_matches(&paths)
}
