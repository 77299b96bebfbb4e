//! Line relay for a single command output stream.
//!
//! Imports only from `crate::application::ports` and tokio's I/O traits.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::application::ports::OutputSink;

/// Drain `stream` line by line into `sink`, returning the number of lines
/// forwarded.
///
/// Lines are split on `\n` with a trailing `\r` stripped, and forwarded in
/// arrival order. A final segment without a newline is forwarded once the
/// writer side closes. Read errors end the relay like end-of-data does.
pub async fn relay<R>(stream: R, sink: &impl OutputSink) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut forwarded = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                sink.output(&String::from_utf8_lossy(trim_line_ending(&buf)));
                forwarded += 1;
            }
            Err(e) => {
                tracing::debug!(error = %e, "output stream closed with error");
                break;
            }
        }
    }

    forwarded
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
