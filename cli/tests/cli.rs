//! End-to-end tests against the built `portpeek` binary.

use std::net::{TcpListener, UdpSocket};
use std::process::{Command, Output};

fn portpeek(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_portpeek"))
        .args(args)
        .output()
        .expect("failed to run portpeek")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_prints_usage() {
    for flag in ["--help", "-h"] {
        let output = portpeek(&[flag]);
        assert_eq!(output.status.code(), Some(0), "{flag}");
        assert!(stdout(&output).starts_with("Usage:"), "{flag}: {}", stdout(&output));
    }
}

#[test]
fn test_version_shown_in_help() {
    let output = portpeek(&["--help"]);
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_out_of_range_port_is_rejected() {
    let output = portpeek(&["99999"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid port"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_invalid_arguments_are_rejected() {
    for arg in [
        "0", "65536", "-1", "abc", "80a", "", "1e3", "--bogus", "-x", "-V", "--version", "-a",
        "--json", "-v", "--tcp-only", "--config",
    ] {
        let output = portpeek(&[arg]);
        assert_eq!(output.status.code(), Some(1), "{arg:?}");
        assert!(stderr(&output).contains("Invalid port"), "{arg:?}: {}", stderr(&output));
    }
}

#[test]
fn test_invalid_port_wins_over_json() {
    let output = portpeek(&["--json", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid port"));
}

#[test]
fn test_unknown_option_next_to_valid_port() {
    let output = portpeek(&["8080", "--bogus"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("--bogus"), "{err}");
    assert!(!err.contains("Invalid port"), "{err}");
}

#[test]
fn test_missing_port_is_usage_error() {
    let output = portpeek(&[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_boundary_ports_are_accepted() {
    for arg in ["1", "65535"] {
        let output = portpeek(&[arg]);
        assert_ne!(output.status.code(), Some(1), "{arg}");
        assert!(!stderr(&output).contains("Invalid port"), "{arg}");
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_finds_listening_test_process() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let output = portpeek(&[&port]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let pid = text
        .lines()
        .find_map(|line| line.strip_prefix("PID:"))
        .map(|v| v.trim().to_string())
        .expect("PID line");
    assert_eq!(pid, std::process::id().to_string());
    for label in ["Name:", "Path:", "Command:", "CWD:"] {
        assert!(text.lines().any(|l| l.starts_with(label)), "missing {label}");
    }

    drop(listener);
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_json_output() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let output = portpeek(&["--json", "--listen-only", &port.to_string()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "found");
    assert_eq!(json["port"], port);
    assert_eq!(json["owners"][0]["process"]["pid"], std::process::id());
    assert_eq!(json["owners"][0]["socket"]["state"], "listen");

    drop(listener);
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_finds_udp_socket() {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();

    let output = portpeek(&[&port.to_string()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.starts_with(&format!("Port {}/udp (BOUND", port)), "{text}");
    assert!(text.contains(&format!("PID:     {}\n", std::process::id())), "{text}");

    drop(socket);
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_all_lists_every_process_sharing_a_listener() {
    use std::os::fd::OwnedFd;
    use std::process::Stdio;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    // The child holds the same listening socket as its stdin.
    let mut child = Command::new("sleep")
        .arg("30")
        .stdin(Stdio::from(OwnedFd::from(listener.try_clone().unwrap())))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let all = portpeek(&["--all", "--listen-only", &port]);
    let primary = portpeek(&["--listen-only", &port]);
    let _ = child.kill();
    let _ = child.wait();

    assert_eq!(all.status.code(), Some(0), "stderr: {}", stderr(&all));
    let text = stdout(&all);
    for pid in [std::process::id(), child.id()] {
        assert!(text.contains(&format!("PID:     {}\n", pid)), "{pid} missing: {text}");
    }

    assert!(stdout(&primary).contains("(+1 more; use --all to show every process)"));

    drop(listener);
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_free_port_is_not_found() {
    let port = {
        let scratch = TcpListener::bind("127.0.0.1:0").unwrap();
        scratch.local_addr().unwrap().port()
    };

    let output = portpeek(&["--tcp-only", &port.to_string()]);
    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("No process found"));
    assert!(!err.contains("Invalid port"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let output = portpeek(&["--config", "/nonexistent/portpeek.json", "8080"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("does not exist"));
}
