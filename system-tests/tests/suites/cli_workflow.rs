// system-tests/tests/suites/cli_workflow.rs
// ============================================================================
// Module: CLI Workflow Tests
// Description: Drives the example-gate binary against a real runtime.
// Purpose: Ensure config, harness, and exit codes compose end to end.
// Dependencies: system-tests helpers, serde_json
// ============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Test suite helpers keep documentation concise."
)]

use std::process::Command;

use helpers::artifacts::TestReporter;
use helpers::artifacts::TestStatus;
use helpers::cli::cli_binary;
use helpers::workspace::StubWorkspace;
use helpers::workspace::probe_runtime;
use serde_json::Value;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const API_KEY_ENV: &str = "EXAMPLE_GATE_SYSTEM_TEST_API_KEY";

#[test]
fn cli_run_validates_every_example() -> TestResult {
    let mut reporter = TestReporter::new("cli_run_validates_every_example")?;
    let runtime = match probe_runtime() {
        Ok(runtime) => runtime,
        Err(reason) => {
            reporter.finish(TestStatus::Skip, &[reason])?;
            return Ok(());
        }
    };
    let workspace = StubWorkspace::new()?;
    let config_path = workspace.write_config(&runtime, API_KEY_ENV)?;
    let binary = cli_binary()?;

    let output = Command::new(&binary)
        .args(["run", "--config"])
        .arg(&config_path)
        .env(API_KEY_ENV, "xyzzy-api-key")
        .output()?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    reporter.write_text("events.jsonl", &stderr)?;
    reporter.write_text("summary_stdout.json", &String::from_utf8_lossy(&output.stdout))?;

    assert!(output.status.success(), "stderr: {stderr}");
    let summary: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["records"], 3);
    assert_eq!(summary["coverage"]["missing"], Value::Array(Vec::new()));
    assert!(!stderr.contains("xyzzy-api-key"));
    assert!(!workspace.credentials_path().exists());

    let listing = Command::new(&binary).args(["list", "--config"]).arg(&config_path).output()?;
    assert!(listing.status.success());
    assert_eq!(
        String::from_utf8_lossy(&listing.stdout),
        "send_message\t/messages:post\t200\nget_own_user\t/users/me:get\t200\n"
    );
    reporter.finish(TestStatus::Pass, &[format!("binary {}", binary.display())])?;
    Ok(())
}

#[test]
fn cli_only_run_fails_strict_coverage() -> TestResult {
    let mut reporter = TestReporter::new("cli_only_run_fails_strict_coverage")?;
    let runtime = match probe_runtime() {
        Ok(runtime) => runtime,
        Err(reason) => {
            reporter.finish(TestStatus::Skip, &[reason])?;
            return Ok(());
        }
    };
    let workspace = StubWorkspace::new()?;
    let config_path = workspace.write_config(&runtime, API_KEY_ENV)?;

    let output = Command::new(cli_binary()?)
        .args(["run", "--quiet", "--only", "get_own_user", "--config"])
        .arg(&config_path)
        .env(API_KEY_ENV, "xyzzy-api-key")
        .output()?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("example never executed: send_message (/messages:post)"));
    let summary: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["records"], 1);
    assert_eq!(summary["exit_status"], 1);
    reporter.finish(TestStatus::Pass, &[])?;
    Ok(())
}
