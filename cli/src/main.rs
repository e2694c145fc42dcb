//! portpeek CLI - Find the process using a network port
//!
//! Prints the PID, name, executable path, command line and working
//! directory of whatever owns the given port.

mod commands;
mod output;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use portpeek_core::InvalidPort;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portpeek")]
#[command(
    author,
    version,
    about = "Find the process using a port with full details (PID, name, path, command, cwd)"
)]
#[command(disable_version_flag = true)]
#[command(
    help_template = "{usage-heading} {usage}\n\n{name} {version}\n{about-with-newline}\n{all-args}{after-help}"
)]
#[command(after_help = "Exit status: 0 found, 1 invalid port, 3 nothing on the port, 4 lookup failed")]
struct Cli {
    /// Port number to look up (1-65535)
    #[arg(value_name = "PORT", allow_negative_numbers = true)]
    port: String,

    /// Show every process using the port, not only the primary one
    #[arg(short, long)]
    all: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Ignore UDP sockets
    #[arg(long)]
    tcp_only: bool,

    /// Ignore established connections; only report listeners
    #[arg(long)]
    listen_only: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return parse_error(e, argv.get(1..).unwrap_or_default()),
    };

    init_logging(cli.verbose);

    let args = commands::lookup::LookupArgs {
        port: cli.port,
        all: cli.all,
        json: cli.json,
        tcp_only: cli.tcp_only,
        listen_only: cli.listen_only,
        config: cli.config,
    };

    match commands::lookup::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(output::EXIT_QUERY_FAILED)
        }
    }
}

/// Report a command-line error.
fn parse_error(e: clap::Error, args: &[OsString]) -> ExitCode {
    if let Some(reason) = lone_argument_error(&e, args) {
        eprintln!("{}", reason);
        eprintln!("\nFor more information, try '--help'.");
        return ExitCode::from(output::EXIT_INVALID_PORT);
    }

    let _ = e.print();
    ExitCode::from(e.exit_code() as u8)
}

/// A single argument that is not a usable port is a bad port, whatever clap
/// made of it (`--bogus`, or a flag such as `-a` that leaves no port).
///
/// Help goes through clap untouched. With several arguments clap's own
/// message names the culprit better.
fn lone_argument_error(e: &clap::Error, args: &[OsString]) -> Option<InvalidPort> {
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return None;
    }
    match args {
        [arg] => Some(InvalidPort::NotANumber(arg.to_string_lossy().into_owned())),
        _ => None,
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "portpeek={level},portpeek_core={level}"
        )))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
