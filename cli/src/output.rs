//! Rendering of lookup results and their exit codes.

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use portpeek_core::{LookupResult, PortOwner};

pub const EXIT_INVALID_PORT: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 3;
pub const EXIT_QUERY_FAILED: u8 = 4;

/// Print `result` to the appropriate stream and return the exit code.
///
/// Invalid ports are always reported as text on stderr, even with `--json`.
pub fn emit(result: &LookupResult, show_all: bool, json: bool) -> Result<ExitCode> {
    match result {
        LookupResult::InvalidPort { reason } => {
            eprintln!("{}", reason);
            return Ok(exit_code(result));
        }
        _ if json => println!("{}", serde_json::to_string_pretty(result)?),
        LookupResult::Found { .. } => print!("{}", render_found(result, show_all)),
        LookupResult::NotFound { port } => {
            eprintln!("No process found listening on port {}", port)
        }
    }

    Ok(exit_code(result))
}

pub fn exit_code(result: &LookupResult) -> ExitCode {
    ExitCode::from(exit_status(result))
}

fn exit_status(result: &LookupResult) -> u8 {
    match result {
        LookupResult::Found { .. } => 0,
        LookupResult::NotFound { .. } => EXIT_NOT_FOUND,
        LookupResult::InvalidPort { .. } => EXIT_INVALID_PORT,
    }
}

/// Render owners one field per line.
///
/// Without `show_all` only the primary owner is printed, followed by a hint
/// when there are more.
pub fn render_found(result: &LookupResult, show_all: bool) -> String {
    let LookupResult::Found { owners, .. } = result else {
        return String::new();
    };

    let mut out = String::new();
    let shown = if show_all { owners.len() } else { 1 };

    for (i, owner) in owners.iter().take(shown).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_owner(&mut out, owner);
    }

    let hidden = owners.len().saturating_sub(shown);
    if hidden > 0 {
        let _ = writeln!(
            out,
            "\n(+{} more; use --all to show every process)",
            hidden
        );
    }

    out
}

fn render_owner(out: &mut String, owner: &PortOwner) {
    let socket = &owner.socket;
    let process = &owner.process;

    let _ = writeln!(
        out,
        "Port {}/{} ({} on {})",
        socket.port,
        socket.protocol,
        socket.state,
        socket.display_address()
    );
    let _ = writeln!(out, "{:<9}{}", "PID:", process.pid);
    let _ = writeln!(out, "{:<9}{}", "Name:", process.name);
    let _ = writeln!(out, "{:<9}{}", "Path:", display_path(process.path.as_deref()));
    let _ = writeln!(out, "{:<9}{}", "Command:", process.command);
    let _ = writeln!(out, "{:<9}{}", "CWD:", display_path(process.cwd.as_deref()));
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}
