//! Shared test fixtures for depstream integration tests.
//!
//! Fake analyzers are small `#!/bin/sh` scripts written into a temp dir and
//! made executable, standing in for the real binary behind the same
//! stdin/stdout/exit-code contract.

use std::path::{Path, PathBuf};

/// Write an executable shell script named `name` into `dir` and return its
/// path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\n{body}");
    std::fs::write(&path, script).expect("failed to write fixture script");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fixture script");
    }

    path
}

/// A fake analyzer that emits one `["<name>", []]` line per stdin line,
/// as soon as it arrives, and exits 0 at stdin EOF.
pub fn echo_analyzer(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "echo_analyzer.sh",
        "while IFS= read -r f; do\n  printf '[\"%s\",[]]\\n' \"$f\"\ndone\n",
    )
}

/// A fake analyzer that ignores its input content, emits the given output
/// lines verbatim, drains stdin to EOF, and exits with `exit_code`.
///
/// Draining stdin keeps the feeder's writes from hitting a closed pipe in
/// tests that are not about write failures.
pub fn scripted_analyzer(dir: &Path, lines: &[&str], exit_code: i32) -> PathBuf {
    let mut body = String::new();
    for line in lines {
        // Single-quote for the shell; the fixture lines never contain '.
        body.push_str(&format!("printf '%s\\n' '{line}'\n"));
    }
    body.push_str("cat > /dev/null\n");
    body.push_str(&format!("exit {exit_code}\n"));
    write_script(dir, "scripted_analyzer.sh", &body)
}
