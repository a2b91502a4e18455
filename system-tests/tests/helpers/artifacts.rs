// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, serde, serde_jcs
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Outcome recorded for a system test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Assertions ran and held.
    Pass,
    /// Prerequisites were missing; nothing was asserted.
    Skip,
    /// The test panicked before finishing.
    Panic,
}

#[derive(Debug, Serialize)]
struct TestSummary<'a> {
    test_name: &'a str,
    status: TestStatus,
    started_at_ms: u128,
    duration_ms: u128,
    notes: &'a [String],
    artifacts: &'a [String],
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Writes artifacts for one test and a summary when it ends.
pub struct TestReporter {
    root: PathBuf,
    test_name: String,
    started_at_ms: u128,
    artifacts: Vec<String>,
    finished: bool,
}

impl TestReporter {
    /// Creates the artifact root for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let started_at_ms = now_millis();
        let root = config
            .run_root
            .unwrap_or_else(|| PathBuf::from("target/system-tests").join(format!("run_{started_at_ms}")))
            .join(test_name);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            test_name: test_name.to_string(),
            started_at_ms,
            artifacts: Vec::new(),
            finished: false,
        })
    }

    /// Returns the artifact directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a text artifact and lists it in the summary.
    pub fn write_text(&mut self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents)?;
        self.artifacts.push(name.to_string());
        Ok(path)
    }

    /// Writes the summary with the given status and notes.
    pub fn finish(&mut self, status: TestStatus, notes: &[String]) -> io::Result<()> {
        let summary = TestSummary {
            test_name: &self.test_name,
            status,
            started_at_ms: self.started_at_ms,
            duration_ms: now_millis().saturating_sub(self.started_at_ms),
            notes,
            artifacts: &self.artifacts,
        };
        let bytes = serde_jcs::to_vec(&summary).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(self.root.join("summary.json"), bytes)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let note = if std::thread::panicking() {
            "test panicked before writing a summary"
        } else {
            "test ended without an explicit summary"
        };
        let _ = self.finish(TestStatus::Panic, &[note.to_string()]);
    }
}
