//! The driver: feeds file names to the analyzer and streams back results.
//!
//! One invocation runs three cooperating pieces over a single
//! [`ProcessSession`]:
//!
//! 1. the **feeder** task writes `name + "\n"` per input file to the
//!    analyzer's stdin, honoring pipe backpressure, then half-closes it;
//! 2. the **reader** decodes stdout line by line into [`Item`]s and yields
//!    them lazily, in arrival order;
//! 3. after stdout closes, the **coordinator** joins the feeder, waits for
//!    process exit, and turns a nonzero status into an error.
//!
//! Feeding and reading are concurrent by construction. Sequencing them as
//! "feed everything, then read" would deadlock once either pipe buffer
//! fills: the analyzer may emit results faster than its output buffer
//! drains, and the input side may stall behind a slow async producer.

mod feeder;

use std::io;
use std::path::PathBuf;
use std::pin::Pin;

use futures::Stream;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStdin;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::DriverError;
use crate::protocol::{self, FileName, Item};
use crate::session::ProcessSession;

/// Handle on the feeder task. Dropping it without joining aborts the task,
/// so a caller abandoning the result stream mid-way does not leave a writer
/// parked on a dead pipe.
struct FeederHandle {
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl FeederHandle {
    fn spawn<S>(stdin: ChildStdin, files: S) -> Self
    where
        S: Stream<Item = FileName> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(feeder::feed(stdin, files))),
        }
    }

    /// Wait for the feeder to finish and surface any write-side failure.
    async fn join(mut self) -> Result<(), DriverError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DriverError::Write(source)),
            Err(join_err) => Err(DriverError::Write(io::Error::other(join_err))),
        }
    }
}

impl Drop for FeederHandle {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Map the analyzer's exit status to the invocation's verdict. Exit-code
/// inspection is mandatory even when every line decoded cleanly: a nonzero
/// exit invalidates trust in the completeness of the stream.
fn check_exit(status: std::process::ExitStatus) -> Result<(), DriverError> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(DriverError::Exit { code }),
        None => Err(DriverError::Killed),
    }
}

/// Driver for one analyzer executable.
///
/// Holds the resolved executable path as an explicit dependency (injected
/// by the caller, typically from `depstream-resolver`) rather than any
/// process-wide state, so the core stays testable without filesystem or
/// network access beyond the executable itself.
#[derive(Debug, Clone)]
pub struct Analyzer {
    exe: PathBuf,
}

impl Analyzer {
    /// Create a driver for the analyzer executable at `exe`.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Analyze the given files, yielding one [`Item`] per analyzer output
    /// line as it arrives.
    ///
    /// The returned stream is finite, single-pass, and not restartable;
    /// each call spawns its own analyzer process. Items arrive in stdout
    /// order, which is not necessarily submission order since the analyzer
    /// may parallelize internally.
    ///
    /// Errors are pull-based: a spawn failure surfaces on the first poll, a
    /// malformed line ([`DriverError::Protocol`]) at the poll that reads
    /// it, and write-side or exit failures ([`DriverError::Write`],
    /// [`DriverError::Exit`]) after stdout closes. A per-file analysis
    /// failure is a normal item, not an error.
    ///
    /// Dropping the stream before it completes kills the analyzer process
    /// and aborts the feeder task.
    pub fn analyze<S>(
        &self,
        files: S,
    ) -> Pin<Box<dyn Stream<Item = Result<Item, DriverError>> + Send>>
    where
        S: Stream<Item = FileName> + Send + 'static,
    {
        let exe = self.exe.clone();

        let stream = async_stream::try_stream! {
            let session = ProcessSession::spawn(&exe)?;
            let (stdin, stdout, mut child) = session.into_parts();

            // Started before the first read and joined only after stdout
            // closes, so submitted files produce results even while later
            // input is still being generated.
            let feeder = FeederHandle::spawn(stdin, files);

            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await.map_err(DriverError::Read)? {
                let item = protocol::decode_line(&line)?;
                yield item;
            }

            // Drain phase: the feeder may still be flushing its last
            // writes; its failure takes precedence over the exit status.
            feeder.join().await?;

            let status = child.wait().await.map_err(DriverError::Wait)?;
            debug!(%status, "analyzer exited");
            check_exit(status)?;
        };

        Box::pin(stream)
    }

    /// Convenience for already-materialized inputs: adapt any iterator of
    /// path-like strings into the stream form [`Self::analyze`] consumes.
    pub fn analyze_paths<I>(
        &self,
        files: I,
    ) -> Pin<Box<dyn Stream<Item = Result<Item, DriverError>> + Send>>
    where
        I: IntoIterator,
        I::Item: Into<FileName> + 'static,
        I::IntoIter: Send + 'static,
    {
        self.analyze(futures::stream::iter(files.into_iter().map(Into::into)))
    }
}
