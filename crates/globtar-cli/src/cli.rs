//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "globtar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a tar or tar.gz archive from glob patterns
    Create(CreateArgs),
    /// Print the paths an archive would contain, without building it
    Match(MatchArgs),
}

/// Options shared by every command that selects paths.
#[derive(clap::Args)]
pub struct SelectionArgs {
    /// Glob patterns, matched relative to the root
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Root directory for matching (default: current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Read additional patterns from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub glob_file: Option<PathBuf>,

    /// Exclude paths ending with SUFFIX (can be repeated)
    #[arg(long = "exclude-suffix", short = 'x', value_name = "SUFFIX")]
    pub exclude_suffix: Vec<String>,

    /// Strip a leading directory from archive paths
    #[arg(long, value_name = "PREFIX")]
    pub strip_prefix: Option<String>,

    /// Sort paths for reproducible output
    #[arg(long)]
    pub sort: bool,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive path, or `-` for stdout
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Compress with gzip (implied by a .tar.gz or .tgz output name)
    #[arg(short = 'z', long)]
    pub gzip: bool,

    /// Gzip compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl CreateArgs {
    /// Returns `true` when the archive goes to stdout.
    pub fn is_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }

    /// Returns `true` when gzip was requested or implied by the output name.
    pub fn wants_gzip(&self) -> bool {
        if self.gzip {
            return true;
        }
        let name = self.output.to_string_lossy().to_ascii_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }
}

#[derive(clap::Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}
