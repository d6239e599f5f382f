//! Command-line argument surface.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "triad",
    about = "In-memory RDF triple store and conjunctive query engine",
    version
)]
pub struct Cli {
    /// Log the selected join plan (pattern shape sequence) before each
    /// evaluation
    #[arg(short = 'L', long = "log-plans")]
    pub log_plans: bool,

    /// Execute queries from the given string; may be repeated
    #[arg(short = 'i', long = "inline", value_name = "QUERY")]
    pub inline: Vec<String>,

    /// Execute queries from the given file; may be repeated
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,
}
