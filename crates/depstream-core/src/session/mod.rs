//! Launching the analyzer process for one driver invocation.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::error::DriverError;

/// The live analyzer process together with its piped stdin and stdout.
///
/// Owned by exactly one invocation of [`crate::Analyzer::analyze`] and never
/// reused: the feeder is the sole writer of stdin, the reader the sole
/// consumer of stdout. Stderr is inherited so the analyzer's diagnostics
/// reach the end user without being parsed.
///
/// The child is configured with `kill_on_drop`, so abandoning a session (or
/// the result stream holding it) terminates the process rather than leaking
/// it.
#[derive(Debug)]
pub struct ProcessSession {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl ProcessSession {
    /// Spawn the analyzer executable at `exe`.
    ///
    /// Failure to start (missing file, not executable, permission denied)
    /// is fatal; there is no retry.
    pub fn spawn(exe: &Path) -> Result<Self, DriverError> {
        let mut cmd = Command::new(exe);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let spawn_err = |source| DriverError::Spawn {
            path: exe.to_path_buf(),
            source,
        };

        let mut child = cmd.spawn().map_err(spawn_err)?;
        debug!(pid = child.id(), exe = %exe.display(), "spawned analyzer");

        // Both pipes were requested above, so take() only fails if the
        // handles were already consumed, which cannot happen here.
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_err(io::Error::other("analyzer stdin was not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_err(io::Error::other("analyzer stdout was not captured")))?;

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// Split the session into its channels and the child handle, for the
    /// feeder, reader, and coordinator respectively.
    pub fn into_parts(self) -> (ChildStdin, ChildStdout, Child) {
        (self.stdin, self.stdout, self.child)
    }
}
