//! The input feeder: file names in, newline-terminated stdin writes out.

use std::io;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Write each file name from `files` to `sink` as `name + "\n"`, then
/// half-close the sink to signal end of input.
///
/// Backpressure is inherent: `write_all` suspends while the sink's buffer
/// is saturated, so memory use is bounded by the sink's capacity no matter
/// how large or slow the input sequence is. The input may itself be lazy
/// (an async directory walk, say); a slow producer here never blocks the
/// result reader, which runs as its own task.
pub(crate) async fn feed<W, S>(mut sink: W, files: S) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = String>,
{
    tokio::pin!(files);

    let mut line = String::new();
    while let Some(file) = files.next().await {
        line.clear();
        line.push_str(&file);
        line.push('\n');
        sink.write_all(line.as_bytes()).await?;
    }

    sink.shutdown().await?;
    Ok(())
}
