//! Error type and exit handling for the CLI.

use colored::Colorize;
use std::process;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;

/// Unified error type for driver operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad file path or unreadable input.
    #[error("cannot read {path}: {source}")]
    UnreadableFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A diagnostic contained to one query or file (reported, not fatal).
    #[error("{0}")]
    Input(String),

    /// Malformed query text.
    #[error(transparent)]
    Query(#[from] triad_sparql::ParseError),

    /// Output or terminal failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for driver operations.
pub type CliResult<T> = Result<T, CliError>;

/// Print a diagnostic line to stderr.
pub fn report(err: &CliError) {
    eprintln!("{} {err}", "error:".red().bold());
}

/// Print a diagnostic and terminate with [`EXIT_ERROR`].
pub fn exit_with_error(err: CliError) -> ! {
    report(&err);
    process::exit(EXIT_ERROR)
}
