// crates/example-gate-cli/tests/run_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the run, list, and extract commands.
// Purpose: Ensure exit codes, summaries, and error output match a real run.
// Dependencies: example-gate-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Runs the `example-gate` binary against a temporary workspace. A shell
//! script stands in for the JavaScript runtime: it drains the generated
//! script from stdin and prints canned response records.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const API_KEY_ENV: &str = "EXAMPLE_GATE_CLI_TEST_KEY";

const OPENAPI_YAML: &str = r"
openapi: 3.0.1
info:
  title: Zulip REST API
  version: 1.0.0
paths:
  /messages:
    post:
      responses:
        '200':
          description: Success.
          content:
            application/json:
              schema:
                type: object
                required: [result, msg, id]
                properties:
                  result:
                    type: string
                    enum: [success]
                  id:
                    type: integer
  /users/me:
    get:
      responses:
        '200':
          description: Success.
          content:
            application/json:
              schema:
                type: object
                required: [result]
";

const SUCCESS_RECORDS: &str = r#"{"result":"success","msg":"","id":1}"#;

const GET_OWN_USER_JS: &str = "const zulip = require('zulip-js');\n\
                               // {code_example|start}\n\
                               zulip(config).then((client) => client.users.me.getProfile().then(console.log));\n\
                               // {code_example|end}\n";

fn example_gate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_example-gate"))
}

/// Temporary workspace with an `OpenAPI` document and a fake runtime.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a workspace whose runtime prints each of `records` on its own line.
    fn new(records: &[&str], extra_config: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("zulip.yaml"), OPENAPI_YAML).expect("write openapi");
        let mut runtime = String::from("cat > /dev/null\n");
        for record in records {
            runtime.push_str(&format!("printf '%s\\n' '{record}'\n"));
        }
        let runtime_path = dir.path().join("runtime.sh");
        fs::write(&runtime_path, runtime).expect("write runtime");
        fs::write(dir.path().join("get_own_user.js"), GET_OWN_USER_JS).expect("write script");

        let config = format!(
            "[runtime]\nprogram = \"sh\"\nargs = ['{}']\ntimeout_ms = 20000\n\n\
             [credentials]\npath = \"run/.zuliprc\"\nemail = \"iago@zulip.com\"\n\
             base_url = \"http://localhost:9991/api/\"\napi_key_env = \"{API_KEY_ENV}\"\n\n\
             [openapi]\npath = \"zulip.yaml\"\n\n{extra_config}",
            runtime_path.display()
        );
        fs::write(dir.path().join("example-gate.toml"), config).expect("write config");
        Self {
            dir,
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("example-gate.toml")
    }

    fn credentials_path(&self) -> PathBuf {
        self.dir.path().join("run").join(".zuliprc")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(example_gate_bin());
        command.args(args);
        command.arg("--config").arg(self.config_path());
        command.env(API_KEY_ENV, "xyzzy-api-key");
        command.env_remove("EXAMPLE_GATE_CONFIG");
        command
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn summary_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("summary json")
}

const OWN_USER_EXAMPLE: &str = "[[examples]]\nname = \"get_own_user\"\n\
                                endpoint = \"/users/me:get\"\nscript = \"get_own_user.js\"\n";

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a full run validates every record and prints the summary.
#[test]
fn run_validates_builtin_examples() {
    let workspace = Workspace::new(&[SUCCESS_RECORDS, SUCCESS_RECORDS], "");
    let output = workspace.command(&["run", "--quiet"]).output().expect("run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let summary = summary_of(&output.stdout);
    assert_eq!(summary["records"], 2);
    assert_eq!(summary["exit_status"], 0);
    assert_eq!(summary["coverage_mode"], "strict");
    assert!(stderr_of(&output).is_empty());
    assert!(!workspace.credentials_path().exists());
}

/// Verifies progress events stream to stderr and the summary can go to a file.
#[test]
fn run_writes_events_and_summary_file() {
    let workspace = Workspace::new(&[SUCCESS_RECORDS, SUCCESS_RECORDS], "");
    let summary_path = workspace.dir.path().join("summary.json");
    let output = workspace
        .command(&["run", "--summary-out", summary_path.to_str().expect("utf-8 path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    let events: Vec<Value> =
        stderr.lines().map(|line| serde_json::from_str(line).expect("event json")).collect();
    assert_eq!(events.first().expect("first event")["event"], "run_started");
    assert_eq!(events.last().expect("last event")["event"], "run_finished");
    assert!(!stderr.contains("xyzzy-api-key"));
    let summary = summary_of(&fs::read(summary_path).expect("summary file"));
    assert_eq!(summary["examples"][0]["name"], "send_message");
}

/// Verifies a response that violates the schema fails the run.
#[test]
fn run_fails_on_schema_mismatch() {
    let workspace = Workspace::new(&["{}"], "");
    let output = workspace.command(&["run", "--quiet"]).output().expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("example send_message failed"), "stderr: {stderr}");
    assert!(!workspace.credentials_path().exists());
}

/// Verifies the API key must be present in the environment.
#[test]
fn run_requires_api_key() {
    let workspace = Workspace::new(&[SUCCESS_RECORDS], "");
    let output =
        workspace.command(&["run", "--quiet"]).env_remove(API_KEY_ENV).output().expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains(API_KEY_ENV));
}

/// Verifies a partial run fails strict coverage and passes in report mode.
#[test]
fn run_only_reports_unexecuted_examples() {
    let workspace = Workspace::new(&[SUCCESS_RECORDS], OWN_USER_EXAMPLE);
    let output =
        workspace.command(&["run", "--quiet", "--only", "send_message"]).output().expect("run");

    assert_eq!(output.status.code(), Some(1));
    let summary = summary_of(&output.stdout);
    assert_eq!(summary["exit_status"], 1);
    assert_eq!(summary["coverage"]["missing"][0]["name"], "get_own_user");
    assert!(
        stderr_of(&output).contains("example never executed: get_own_user (/users/me:get)"),
        "stderr: {}",
        stderr_of(&output)
    );

    let output = workspace
        .command(&["run", "--quiet", "--only", "send_message", "--coverage", "report"])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(summary_of(&output.stdout)["exit_status"], 0);
}

/// Verifies `list` prints examples in registration order.
#[test]
fn list_prints_registered_examples() {
    let workspace = Workspace::new(&[], OWN_USER_EXAMPLE);
    let output = workspace.command(&["list"]).output().expect("list");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "send_message\t/messages:post\t200\nget_own_user\t/users/me:get\t200\n"
    );
}

/// Verifies `extract` prints marked blocks and rejects scripts with only empty ones.
#[test]
fn extract_prints_marked_blocks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("get_own_user.js");
    fs::write(&script, GET_OWN_USER_JS).expect("write script");
    let output = extract(&script);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "zulip(config).then((client) => client.users.me.getProfile().then(console.log));\n"
    );

    let bare = dir.path().join("empty_block.js");
    fs::write(&bare, "// {code_example|start}\n\n// {code_example|end}\n").expect("write script");
    let output = extract(&bare);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("no code example blocks"));
}

fn extract(script: &Path) -> Output {
    Command::new(example_gate_bin())
        .args(["extract", "--script"])
        .arg(script)
        .output()
        .expect("extract")
}
