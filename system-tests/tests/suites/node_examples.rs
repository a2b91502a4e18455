// system-tests/tests/suites/node_examples.rs
// ============================================================================
// Module: Node Example Tests
// Description: Runs bundled and script examples through the library harness.
// Purpose: Ensure generated scripts execute and validate under a real runtime.
// Dependencies: system-tests helpers, example-gate-core, tokio
// ============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Test suite helpers keep documentation concise."
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use example_gate_core::ApiCredentials;
use example_gate_core::ExampleFailure;
use example_gate_core::ExampleName;
use example_gate_core::ExampleRegistry;
use example_gate_core::ExampleSelection;
use example_gate_core::ExampleSpec;
use example_gate_core::Harness;
use example_gate_core::HarnessError;
use example_gate_core::OpenApiValidator;
use example_gate_core::ProcessRunner;
use example_gate_core::ScriptTemplate;
use example_gate_core::extract_code_examples;
use example_gate_core::register_builtin_examples;
use helpers::artifacts::TestReporter;
use helpers::artifacts::TestStatus;
use helpers::workspace::GET_OWN_USER_JS;
use helpers::workspace::Runtime;
use helpers::workspace::StubWorkspace;
use helpers::workspace::probe_runtime;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn credentials() -> ApiCredentials {
    ApiCredentials {
        email: "iago@zulip.com".to_string(),
        api_key: "xyzzy-api-key".to_string(),
        base_url: "http://localhost:9991/api/".to_string(),
    }
}

fn harness(
    workspace: &StubWorkspace,
    runtime: &Runtime,
    registry: ExampleRegistry,
) -> Result<Harness, Box<dyn std::error::Error>> {
    let mut env = BTreeMap::new();
    env.insert("NODE_PATH".to_string(), workspace.node_path().to_string_lossy().into_owned());
    let runner = ProcessRunner::new(&runtime.program)
        .with_envs(env)
        .with_working_dir(workspace.root())
        .with_timeout(runtime.timeout);
    let validator = OpenApiValidator::load(&workspace.openapi_path())?;
    Ok(Harness::new(
        registry,
        Arc::new(runner),
        Arc::new(validator),
        ScriptTemplate::new("zulip-js", &workspace.credentials_path()),
    ))
}

fn skip(reporter: &mut TestReporter, reason: String) -> TestResult {
    reporter.finish(TestStatus::Skip, &[reason])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn bundled_and_script_examples_pass_under_node() -> TestResult {
    let mut reporter = TestReporter::new("bundled_and_script_examples_pass_under_node")?;
    let runtime = match probe_runtime() {
        Ok(runtime) => runtime,
        Err(reason) => return skip(&mut reporter, reason),
    };
    let workspace = StubWorkspace::new()?;
    let mut registry = ExampleRegistry::new();
    register_builtin_examples(&mut registry)?;
    registry.register(ExampleSpec::new(
        ExampleName::new("get_own_user")?,
        "/users/me:get".parse()?,
        extract_code_examples(GET_OWN_USER_JS)?,
    ))?;

    let summary =
        harness(&workspace, &runtime, registry)?.run(&credentials(), &ExampleSelection::All).await?;
    reporter.write_text("summary.txt", &format!("{} records", summary.records))?;

    assert_eq!(summary.records, 3);
    assert_eq!(summary.examples.len(), 2);
    assert!(summary.coverage.is_complete());
    assert_eq!(summary.exit_status, 0);
    assert!(!workspace.credentials_path().exists());
    reporter.finish(TestStatus::Pass, &[format!("runtime {}", runtime.program.display())])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_promise_fails_the_run() -> TestResult {
    let mut reporter = TestReporter::new("rejected_promise_fails_the_run")?;
    let runtime = match probe_runtime() {
        Ok(runtime) => runtime,
        Err(reason) => return skip(&mut reporter, reason),
    };
    let workspace = StubWorkspace::new()?;
    let mut registry = ExampleRegistry::new();
    registry.register(ExampleSpec::new(
        ExampleName::new("broken_call")?,
        "/messages:post".parse()?,
        vec!["zulip(config).then((client) => client.streams.retrieve().then(console.log));"
            .to_string()],
    ))?;

    let result =
        harness(&workspace, &runtime, registry)?.run(&credentials(), &ExampleSelection::All).await;
    match result {
        Err(HarnessError::Example {
            name,
            source: ExampleFailure::Runner(err),
        }) => {
            assert_eq!(name.as_str(), "broken_call");
            reporter.write_text("runner_error.txt", &err.to_string())?;
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(summary) => panic!("expected a runtime failure, got {} records", summary.records),
    }
    assert!(!workspace.credentials_path().exists());
    reporter.finish(TestStatus::Pass, &[])?;
    Ok(())
}
