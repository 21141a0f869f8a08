//! Reusing an acceptable analyzer already present on `$PATH`.

use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

use crate::version::probe_version;

/// Scan `$PATH` for a binary named `binary_name` whose `--version` output
/// matches `expected_version`.
pub async fn find_on_path(binary_name: &str, expected_version: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in(&path_var, binary_name, expected_version).await
}

/// PATH-scan over an explicit search string, so tests can supply their own
/// directories without touching the process environment.
pub(crate) async fn find_in(
    path_var: &OsStr,
    binary_name: &str,
    expected_version: &str,
) -> Option<PathBuf> {
    for dir in std::env::split_paths(path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(binary_name);
        if !candidate.is_file() {
            continue;
        }
        if probe_version(&candidate).await.as_deref() == Some(expected_version) {
            debug!(candidate = %candidate.display(), "found matching analyzer on PATH");
            return Some(candidate);
        }
        debug!(candidate = %candidate.display(), "PATH candidate has wrong version");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use depstream_test_utils::write_script;

    #[tokio::test]
    async fn finds_matching_candidate_and_skips_wrong_versions() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        write_script(old.path(), "depgraph", "echo '0.1.0'\n");
        let wanted = write_script(new.path(), "depgraph", "echo '0.2.0'\n");

        let path_var =
            std::env::join_paths([old.path(), new.path()]).unwrap();
        let found = find_in(&path_var, "depgraph", "0.2.0").await;
        assert_eq!(found, Some(wanted));
    }

    #[tokio::test]
    async fn returns_none_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "depgraph", "echo '0.1.0'\n");

        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in(&path_var, "depgraph", "0.2.0").await, None);
    }

    #[tokio::test]
    async fn ignores_directories_without_the_binary() {
        let empty = tempfile::tempdir().unwrap();
        let with_bin = tempfile::tempdir().unwrap();
        let wanted = write_script(with_bin.path(), "depgraph", "echo '0.2.0'\n");

        let path_var =
            std::env::join_paths([empty.path(), with_bin.path()]).unwrap();
        let found = find_in(&path_var, "depgraph", "0.2.0").await;
        assert_eq!(found, Some(wanted));
    }
}
