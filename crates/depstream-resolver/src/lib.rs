//! Artifact resolver for the `depgraph` analyzer executable.
//!
//! Locates or provisions an executable whose `--version` output matches the
//! expected version, trying in order:
//!
//! 1. the existing install path (reused if the version matches, removed if
//!    stale);
//! 2. a matching binary already on `$PATH` (linked into place);
//! 3. a prebuilt release artifact downloaded over HTTP;
//! 4. a `cargo build --release` in a configured source checkout.
//!
//! The driver in `depstream-core` never calls this crate; callers feed the
//! resolved path into `Analyzer::new` themselves, which keeps the core
//! testable without filesystem or network access.

mod download;
mod locate;
mod source_build;
mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

pub use download::download_artifact;
pub use locate::find_on_path;
pub use source_build::build_from_source;
pub use version::probe_version;

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Analyzer binary name as it appears on `$PATH` and in release
    /// artifact names.
    pub binary_name: String,
    /// The exact version string the executable must report.
    pub expected_version: String,
    /// Where the resolved executable should end up.
    pub install_path: PathBuf,
    /// Base URL of the release downloads, without the trailing
    /// `/v{version}/{artifact}` part.
    pub release_base_url: String,
    /// Source checkout for the build-from-source fallback.
    pub source_dir: Option<PathBuf>,
    /// Skip the network step entirely (also set via the
    /// `DEPSTREAM_SKIP_DOWNLOAD` environment variable).
    pub skip_download: bool,
}

impl ResolverConfig {
    /// Default release download location.
    pub const DEFAULT_RELEASE_BASE_URL: &str =
        "https://github.com/abihf/depgraph/releases/download";

    /// Config for the stock `depgraph` analyzer at a given version and
    /// install path. `DEPSTREAM_SKIP_DOWNLOAD` in the environment disables
    /// the download step.
    pub fn new(expected_version: impl Into<String>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_name: "depgraph".to_string(),
            expected_version: expected_version.into(),
            install_path: install_path.into(),
            release_base_url: Self::DEFAULT_RELEASE_BASE_URL.to_string(),
            source_dir: None,
            skip_download: std::env::var_os("DEPSTREAM_SKIP_DOWNLOAD").is_some(),
        }
    }

    /// Override the binary name.
    pub fn with_binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = name.into();
        self
    }

    /// Override the release download base URL.
    pub fn with_release_base_url(mut self, url: impl Into<String>) -> Self {
        self.release_base_url = url.into();
        self
    }

    /// Enable the build-from-source fallback using this checkout.
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Release artifact URL for the current platform.
    fn artifact_url(&self) -> Result<String> {
        let artifact = artifact_name(
            &self.binary_name,
            std::env::consts::OS,
            std::env::consts::ARCH,
        )?;
        Ok(format!(
            "{}/v{}/{}",
            self.release_base_url, self.expected_version, artifact
        ))
    }
}

/// Map `(os, arch)` to the published artifact name for `binary_name`.
fn artifact_name(binary_name: &str, os: &str, arch: &str) -> Result<String> {
    let triple = match (os, arch) {
        ("linux", "x86_64") => "x86_64-unknown-linux-gnu",
        ("macos", "x86_64") => "x86_64-apple-darwin",
        ("macos", "aarch64") => "aarch64-apple-darwin",
        _ => bail!("no prebuilt analyzer for platform {os} arch {arch}"),
    };
    Ok(format!("{binary_name}-{triple}"))
}

/// Resolve an executable implementing the analyzer protocol, returning its
/// path.
///
/// The result is always `config.install_path`; the steps differ only in how
/// that path gets populated.
pub async fn resolve(config: &ResolverConfig) -> Result<PathBuf> {
    // 1. Reuse a previous install if it still reports the right version.
    // symlink_metadata rather than exists(): a dangling symlink (target
    // deleted out from under a previous install) must count as stale.
    if std::fs::symlink_metadata(&config.install_path).is_ok() {
        if probe_version(&config.install_path).await.as_deref()
            == Some(config.expected_version.as_str())
        {
            info!(path = %config.install_path.display(), "reusing installed analyzer");
            return Ok(config.install_path.clone());
        }
        info!(path = %config.install_path.display(), "removing stale analyzer install");
        tokio::fs::remove_file(&config.install_path)
            .await
            .with_context(|| {
                format!("failed to remove stale {}", config.install_path.display())
            })?;
    }

    // 2. Borrow a matching binary already on PATH.
    if let Some(found) = find_on_path(&config.binary_name, &config.expected_version).await {
        link_into_place(&found, &config.install_path)?;
        info!(from = %found.display(), to = %config.install_path.display(), "linked analyzer from PATH");
        return Ok(config.install_path.clone());
    }

    // 3. Download the release artifact.
    if !config.skip_download {
        match try_download(config).await {
            Ok(()) => return Ok(config.install_path.clone()),
            Err(e) => warn!(error = %format!("{e:#}"), "download failed, falling back"),
        }
    }

    // 4. Build from source.
    if let Some(source_dir) = &config.source_dir {
        let built = build_from_source(source_dir, &config.binary_name).await?;
        link_into_place(&built, &config.install_path)?;
        return Ok(config.install_path.clone());
    }

    bail!(
        "could not provision analyzer {} v{}: not installed, not on PATH, \
         and no download or source fallback succeeded",
        config.binary_name,
        config.expected_version
    )
}

async fn try_download(config: &ResolverConfig) -> Result<()> {
    let url = config.artifact_url()?;
    download_artifact(&url, &config.install_path).await?;

    // A downloaded artifact that reports the wrong version is as useless as
    // a stale one.
    let probed = probe_version(&config.install_path).await;
    if probed.as_deref() != Some(config.expected_version.as_str()) {
        tokio::fs::remove_file(&config.install_path).await.ok();
        bail!(
            "downloaded analyzer reports version {:?}, expected {}",
            probed,
            config.expected_version
        );
    }
    Ok(())
}

/// Make `dest` refer to the executable at `src`: a symlink on unix, a copy
/// elsewhere. Any existing `dest` is replaced.
fn link_into_place(src: &Path, dest: &Path) -> Result<()> {
    // Catches dangling symlinks too, which exists() reports as absent.
    if std::fs::symlink_metadata(dest).is_ok() {
        std::fs::remove_file(dest)
            .with_context(|| format!("failed to remove existing {}", dest.display()))?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(src, dest).with_context(|| {
        format!("failed to link {} -> {}", dest.display(), src.display())
    })?;

    #[cfg(not(unix))]
    std::fs::copy(src, dest).with_context(|| {
        format!("failed to copy {} -> {}", src.display(), dest.display())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depstream_test_utils::write_script;

    fn test_config(version: &str, install_path: PathBuf) -> ResolverConfig {
        let mut config = ResolverConfig::new(version, install_path);
        // Tests never touch the network.
        config.skip_download = true;
        config
    }

    #[test]
    fn artifact_names_cover_published_platforms() {
        assert_eq!(
            artifact_name("depgraph", "linux", "x86_64").unwrap(),
            "depgraph-x86_64-unknown-linux-gnu"
        );
        assert_eq!(
            artifact_name("depgraph", "macos", "x86_64").unwrap(),
            "depgraph-x86_64-apple-darwin"
        );
        assert_eq!(
            artifact_name("depgraph", "macos", "aarch64").unwrap(),
            "depgraph-aarch64-apple-darwin"
        );
    }

    #[test]
    fn unsupported_platform_is_an_error() {
        let err = artifact_name("depgraph", "freebsd", "riscv64").unwrap_err();
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn artifact_url_joins_base_version_and_name() {
        let mut config = test_config("0.2.0", PathBuf::from("/tmp/depgraph"));
        config.release_base_url = "https://releases.example.com/depgraph".to_string();
        if let Ok(url) = config.artifact_url() {
            assert!(url.starts_with("https://releases.example.com/depgraph/v0.2.0/depgraph-"));
        }
    }

    #[tokio::test]
    async fn reuses_matching_install() {
        let tmp = tempfile::tempdir().unwrap();
        let install = write_script(tmp.path(), "depgraph", "echo '0.2.0'\n");

        let config = test_config("0.2.0", install.clone());
        assert_eq!(resolve(&config).await.unwrap(), install);
    }

    #[tokio::test]
    async fn replaces_stale_install_from_path() {
        let install_dir = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();

        let install = write_script(install_dir.path(), "depgraph", "echo '0.1.0'\n");
        let on_path = write_script(path_dir.path(), "depgraph", "echo '0.2.0'\n");

        // Point the PATH scan at our fixture dir by scanning it directly:
        // resolve() consults the real $PATH, so emulate its steps here with
        // the testable inner pieces.
        let stale = probe_version(&install).await;
        assert_eq!(stale.as_deref(), Some("0.1.0"));
        std::fs::remove_file(&install).unwrap();

        let path_var = std::env::join_paths([path_dir.path()]).unwrap();
        let found = locate::find_in(&path_var, "depgraph", "0.2.0").await.unwrap();
        assert_eq!(found, on_path);

        link_into_place(&found, &install).unwrap();
        assert_eq!(probe_version(&install).await.as_deref(), Some("0.2.0"));
    }

    #[tokio::test]
    async fn resolve_fails_when_nothing_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let install = tmp.path().join("depgraph");

        // Unique name so no real PATH entry can accidentally satisfy it.
        let config = test_config("0.0.0-test", install)
            .with_binary_name("depstream-test-binary-that-does-not-exist");
        let err = resolve(&config).await.unwrap_err();
        assert!(err.to_string().contains("could not provision"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn link_into_place_replaces_dangling_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let old = write_script(tmp.path(), "old", "echo '1.0.0'\n");
        let dest = tmp.path().join("depgraph");
        std::os::unix::fs::symlink(&old, &dest).unwrap();
        std::fs::remove_file(&old).unwrap();

        let replacement = write_script(tmp.path(), "new", "echo '2.0.0'\n");
        link_into_place(&replacement, &dest).unwrap();
        assert_eq!(probe_version(&dest).await.as_deref(), Some("2.0.0"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resolve_removes_dangling_install_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let install = tmp.path().join("depgraph");
        std::os::unix::fs::symlink(tmp.path().join("deleted-target"), &install).unwrap();

        let config = test_config("0.0.0-test", install.clone())
            .with_binary_name("depstream-test-binary-that-does-not-exist");
        let err = resolve(&config).await.unwrap_err();

        // The dangling link is treated as a stale install and removed, and
        // resolution then fails for want of a replacement rather than
        // tripping over the leftover link.
        assert!(err.to_string().contains("could not provision"));
        assert!(std::fs::symlink_metadata(&install).is_err());
    }

    #[tokio::test]
    async fn link_into_place_replaces_existing_dest() {
        let tmp = tempfile::tempdir().unwrap();
        let first = write_script(tmp.path(), "first", "echo '1.0.0'\n");
        let second = write_script(tmp.path(), "second", "echo '2.0.0'\n");
        let dest = tmp.path().join("depgraph");

        link_into_place(&first, &dest).unwrap();
        assert_eq!(probe_version(&dest).await.as_deref(), Some("1.0.0"));

        link_into_place(&second, &dest).unwrap();
        assert_eq!(probe_version(&dest).await.as_deref(), Some("2.0.0"));
    }
}
