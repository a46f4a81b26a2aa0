use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;

/// `switchboard-cli --help` exits successfully and prints only to stdout
#[test]
fn test_cli_help_success() {
    let mut cmd = cargo_bin_cmd!("switchboard-cli");

    let assert = cmd.arg("--help").assert().success();

    let out = assert.get_output();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("requests"), "expected subcommands in help, got:\n{}", stdout);
    assert!(
        out.stderr.is_empty(),
        "expected empty stderr for --help, got:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

/// `switchboard --help` documents the configuration flags
#[test]
fn test_server_help_lists_flags() {
    let mut cmd = cargo_bin_cmd!("switchboard");

    let assert = cmd.arg("--help").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for flag in ["--database-url", "--bind-address", "--emergency-keywords"] {
        assert!(stdout.contains(flag), "missing {} in help:\n{}", flag, stdout);
    }
}

/// A CLI call against a server that is not running fails with a readable error
#[test]
fn test_cli_reports_unreachable_server() {
    let mut cmd = cargo_bin_cmd!("switchboard-cli");

    let assert = cmd
        .args(["--server-url", "http://127.0.0.1:9", "health"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.starts_with("Error:"), "unexpected stderr:\n{}", stderr);
}
