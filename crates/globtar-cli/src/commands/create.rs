//! Create command implementation.

use super::build_config;
use super::collect_patterns;
use crate::cli::CreateArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use console::Term;
use globtar_core::ArchiveError;
use globtar_core::CreationConfig;
use globtar_core::CreationReport;
use globtar_core::NoopProgress;
use globtar_core::ProgressCallback;
use globtar_core::create_tar_stream_with_progress;
use globtar_core::create_tar_with_progress;
use std::io;
use std::io::Write;
use tracing::debug;
use tracing::info;

const STDOUT_NAME: &str = "<stdout>";

pub fn execute(
    args: &CreateArgs,
    formatter: &dyn OutputFormatter,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let patterns = collect_patterns(&args.selection)?;

    let mut config = build_config(&args.selection).with_gzip(args.wants_gzip());
    if let Some(level) = args.level {
        config = config.with_compression_level(level);
    }

    debug!(
        patterns = ?patterns,
        gzip = config.gzip,
        sort = config.sort_paths,
        "creating archive"
    );

    let show_progress = CliProgress::should_show(quiet, json);

    let (output_name, report) = if args.is_stdout() {
        if Term::stdout().is_term() {
            bail!(
                "Refusing to write archive data to a terminal\n\
                 HINT: Redirect stdout to a file or pipe, or pass an output path instead of '-'."
            );
        }

        let report = if show_progress {
            stream_to_stdout(&patterns, &config, CliProgress::new("Archiving"))
        } else {
            stream_to_stdout(&patterns, &config, NoopProgress)
        };
        (STDOUT_NAME.to_string(), add_archive_context(report, STDOUT_NAME)?)
    } else {
        let output_name = args.output.display().to_string();

        if args.output.exists() && !args.force {
            bail!(
                "Output file already exists: {output_name}\n\
                 HINT: Use --force to overwrite it, or choose a different output path."
            );
        }

        let report = if show_progress {
            let mut progress = CliProgress::new("Archiving");
            create_tar_with_progress(&patterns, &args.output, &config, &mut progress)
        } else {
            create_tar_with_progress(&patterns, &args.output, &config, &mut NoopProgress)
        };
        let report = add_archive_context(report, &output_name)?;
        (output_name, report)
    };

    info!(
        output = %output_name,
        files = report.files_added,
        directories = report.directories_added,
        bytes_written = report.bytes_written,
        "archive created"
    );

    formatter.format_creation_result(&output_name, &report)
}

/// Streams the archive to stdout.
///
/// Failures writing stdout are reported as destination errors; failures
/// producing the archive keep their original kind.
fn stream_to_stdout<P>(
    patterns: &[String],
    config: &CreationConfig,
    progress: P,
) -> Result<CreationReport, ArchiveError>
where
    P: ProgressCallback + 'static,
{
    let mut stream = create_tar_stream_with_progress(patterns, config, progress)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut stream, &mut out).map_err(into_destination)?;
    out.flush().map_err(ArchiveError::Destination)?;

    Ok(stream.report().clone())
}

fn into_destination(err: io::Error) -> ArchiveError {
    match ArchiveError::from_io(err) {
        ArchiveError::Io(io_err) => ArchiveError::Destination(io_err),
        other => other,
    }
}
