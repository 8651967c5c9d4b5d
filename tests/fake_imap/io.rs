//! Shared I/O helpers for the fake IMAP server.
//!
//! Every response line is flushed immediately so the client never
//! waits on data sitting in a buffer.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Write a CRLF-terminated response line and flush.
pub async fn write_line<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut BufReader<S>,
    line: &str,
) -> std::io::Result<()> {
    let inner = stream.get_mut();
    inner.write_all(line.as_bytes()).await?;
    inner.flush().await
}
