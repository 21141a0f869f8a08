//! Fetching a prebuilt analyzer release artifact over HTTP.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Download `url` to `dest` and mark it executable.
///
/// Release hosts serve artifacts behind redirects, so the client follows up
/// to 10 of them.
pub async fn download_artifact(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(300))
        .build()
        .context("failed to build HTTP client")?;

    info!(url, dest = %dest.display(), "downloading analyzer artifact");

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request for {url} failed"))?;

    if !response.status().is_success() {
        bail!("download of {url} failed with status {}", response.status());
    }

    let bytes = response
        .bytes()
        .await
        .context("failed to read download body")?;

    tokio::fs::write(dest, &bytes)
        .await
        .with_context(|| format!("failed to write {}", dest.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))
            .await
            .with_context(|| format!("failed to chmod {}", dest.display()))?;
    }

    Ok(())
}
