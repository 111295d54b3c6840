//! Integration tests for the `liverelay` binary entry point.

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_succeeds() {
    let mut command = cargo_bin_cmd!("liverelay");
    command.arg("--help");
    command.assert().success().stdout(contains("KEY=VALUE"));
}

#[test]
fn missing_action_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("liverelay");
    command.assert().code(2).stderr(contains("ACTION"));
}

#[test]
fn unreachable_relay_exits_with_failure() {
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        listener.local_addr().expect("reserved addr").port()
    };
    let port = port.to_string();
    let mut command = cargo_bin_cmd!("liverelay");
    command.args(["--port", port.as_str(), "--timeout", "1", "ping"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to connect to relay"));
}

#[test]
fn port_comes_from_the_environment_without_a_flag() {
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        listener.local_addr().expect("reserved addr").port()
    };
    let mut command = cargo_bin_cmd!("liverelay");
    command
        .env("LIVERELAY_PORT", port.to_string())
        .args(["--timeout", "1", "ping"]);
    command
        .assert()
        .failure()
        .stderr(contains(format!("127.0.0.1:{port}")));
}
