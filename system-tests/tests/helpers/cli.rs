// system-tests/tests/helpers/cli.rs
// ============================================================================
// Module: CLI Helpers
// Description: Shared helpers for locating the example-gate CLI.
// Purpose: Provide consistent CLI binary resolution across system-test suites.
// Dependencies: std::process, std::path
// ============================================================================

//! Helpers for invoking the example-gate CLI in system-tests.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

/// Locates the example-gate binary, building it if necessary.
pub fn cli_binary() -> Result<PathBuf, String> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_example-gate") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    static BUILT: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    BUILT.get_or_init(build_cli_binary).clone()
}

fn build_cli_binary() -> Result<PathBuf, String> {
    let target_dir = target_dir_from_current_exe()
        .ok_or_else(|| "unable to resolve target dir from current exe".to_string())?;
    let output = Command::new("cargo")
        .args(["build", "-p", "example-gate-cli", "--bin", "example-gate", "--target-dir"])
        .arg(&target_dir)
        .output()
        .map_err(|err| format!("spawn cargo build failed: {err}"))?;
    if !output.status.success() {
        return Err(format!(
            "cargo build example-gate-cli failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    let candidate = target_dir.join("debug").join(format!("example-gate{}", exe_suffix()));
    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(format!("{} not found after build", candidate.display()))
    }
}

fn target_dir_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.parent()?.parent().map(Path::to_path_buf)
}

const fn exe_suffix() -> &'static str {
    if cfg!(windows) { ".exe" } else { "" }
}
