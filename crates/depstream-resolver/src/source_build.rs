//! Last-resort provisioning: building the analyzer from a source checkout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::info;

/// Run `cargo build --release` in `source_dir` and return the path to the
/// built `binary_name`.
///
/// Stdout/stderr are inherited so build progress and compiler errors reach
/// the user directly.
pub async fn build_from_source(source_dir: &Path, binary_name: &str) -> Result<PathBuf> {
    info!(source_dir = %source_dir.display(), "building analyzer from source");

    let status = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(source_dir)
        .status()
        .await
        .with_context(|| format!("failed to run cargo build in {}", source_dir.display()))?;

    if !status.success() {
        bail!(
            "cargo build --release failed in {} ({status})",
            source_dir.display()
        );
    }

    let built = source_dir.join("target").join("release").join(binary_name);
    if !built.is_file() {
        bail!("build succeeded but {} is missing", built.display());
    }
    Ok(built)
}
