use std::fs::File;
use std::io::{self, BufReader, Cursor};
use std::process;

use clap::error::ErrorKind;
use clap::Parser;

use triad_cli::{
    exit_with_error, Cli, CliError, CliResult, Outcome, Session, EXIT_ERROR, EXIT_SUCCESS,
};

fn init_tracing() {
    // Library crates emit `tracing` events (plans, load and query
    // timings). Without an installed subscriber, `RUST_LOG=...` has no
    // effect. Default to "off" so output only changes when the user
    // opts in.
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into());

    let ansi = std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Remapped so malformed arguments exit 1; clap's default is 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            eprint!("{e}");
            process::exit(EXIT_ERROR);
        }
    };

    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing();

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let stdout = io::stdout().lock();
    let mut session = Session::new(cli.log_plans, stdout);

    // With no query sources, serve stdin until QUIT or EOF.
    if cli.inline.is_empty() && cli.files.is_empty() {
        session.run(io::stdin().lock(), true)?;
        return Ok(());
    }

    for query in &cli.inline {
        if session.run(Cursor::new(query.as_bytes()), false)? == Outcome::Quit {
            return Ok(());
        }
    }

    for path in &cli.files {
        let file = File::open(path).map_err(|source| CliError::UnreadableFile {
            path: path.display().to_string(),
            source,
        })?;
        if session.run(BufReader::new(file), false)? == Outcome::Quit {
            return Ok(());
        }
    }

    Ok(())
}
