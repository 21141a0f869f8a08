//! Probing a candidate executable for its `--version` string.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// Run `exe --version` and return the trimmed version string it prints.
///
/// Returns `None` on any failure (spawn error, nonzero exit, empty output)
/// since every one of those means "this candidate is not an acceptable
/// analyzer". Stderr is inherited so a broken candidate's
/// diagnostics stay visible.
pub async fn probe_version(exe: &Path) -> Option<String> {
    let output = match Command::new(exe)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            debug!(exe = %exe.display(), error = %e, "version probe failed to run");
            return None;
        }
    };

    if !output.status.success() {
        debug!(exe = %exe.display(), status = %output.status, "version probe exited nonzero");
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        return None;
    }
    Some(version)
}
