//! Error taxonomy for one driver invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`crate::Analyzer::analyze`].
///
/// Per-file analysis failures are *not* represented here: the analyzer
/// reports them in-band as an [`crate::AnalysisOutcome::Failure`] item and
/// the caller decides how to treat them.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The analyzer executable could not be started (missing, not
    /// executable, permission denied). Surfaced before any item is yielded.
    #[error("failed to spawn analyzer at {}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stdout line was not a valid `[file, outcome]` JSON array. Items
    /// yielded before this line remain valid; nothing after it is read.
    #[error("malformed analyzer output line: {line:?}")]
    Protocol {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stdin pipe broke before every file name was written (typically
    /// the analyzer died mid-stream). Observed when the coordinator joins
    /// the feeder after stdout closes.
    #[error("failed to feed file names to analyzer stdin")]
    Write(#[source] io::Error),

    /// I/O failure while reading analyzer stdout.
    #[error("failed to read analyzer stdout")]
    Read(#[source] io::Error),

    /// Failure waiting for the analyzer process to exit.
    #[error("failed to wait for analyzer exit")]
    Wait(#[source] io::Error),

    /// The analyzer exited with a nonzero code. Raised after stdout closes
    /// even when every line decoded cleanly: a nonzero exit invalidates
    /// trust in the completeness of the stream.
    #[error("analyzer exited with code {code}")]
    Exit { code: i32 },

    /// The analyzer was terminated by a signal and has no exit code.
    #[error("analyzer terminated by signal")]
    Killed,
}
