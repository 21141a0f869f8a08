//! Streaming driver for the external `depgraph` dependency analyzer.
//!
//! The analyzer is an opaque, independently-versioned executable speaking a
//! line-delimited protocol: one file name per stdin line in, one JSON-encoded
//! `[file, outcome]` array per stdout line out, exit code `0` on clean
//! termination. This crate owns the host side of that protocol:
//!
//! - [`session::ProcessSession`] launches the executable with piped
//!   stdin/stdout and inherited stderr.
//! - [`Analyzer::analyze`] feeds file names and yields decoded results as a
//!   lazy stream, with the feed and read sides running concurrently so
//!   neither direction can deadlock on a full pipe buffer.
//!
//! Locating or provisioning the executable is the `depstream-resolver`
//! crate's job; this crate only ever receives a resolved path.

pub mod driver;
pub mod error;
pub mod protocol;
pub mod session;

pub use driver::Analyzer;
pub use error::DriverError;
pub use protocol::{AnalysisOutcome, Dependency, FileName, Item};
