//! # Triad CLI
//!
//! The `triad` executable: argument parsing, the interactive and batch
//! driver loops, and result rendering over a [`Session`].

pub mod cli;
pub mod error;
pub mod session;

pub use cli::Cli;
pub use error::{exit_with_error, report, CliError, CliResult, EXIT_ERROR, EXIT_SUCCESS};
pub use session::{Outcome, Session};
