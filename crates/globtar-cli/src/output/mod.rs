//! Output formatting module.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use console::Term;
use human::HumanFormatter;
use json::JsonFormatter;

/// Creates an output formatter based on CLI flags.
///
/// With `stdout_reserved` (archive streamed to stdout) all reporting goes to
/// stderr instead.
pub fn create_formatter(
    json: bool,
    verbose: bool,
    quiet: bool,
    stdout_reserved: bool,
) -> Box<dyn OutputFormatter> {
    let term = if stdout_reserved {
        Term::stderr()
    } else {
        Term::stdout()
    };

    if json {
        Box::new(JsonFormatter::new(term))
    } else {
        Box::new(HumanFormatter::new(verbose, quiet, term))
    }
}
