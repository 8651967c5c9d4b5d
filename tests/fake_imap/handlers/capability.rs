//! CAPABILITY command handler.
//!
//! Returns the list of capabilities supported by the fake server.
//! `QUOTA` (RFC 2087) is only announced when the directory enables it.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the CAPABILITY command.
pub async fn handle_capability<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    quota: bool,
    stream: &mut BufReader<S>,
) {
    let line = if quota {
        "* CAPABILITY IMAP4rev1 STARTTLS IDLE QUOTA\r\n"
    } else {
        "* CAPABILITY IMAP4rev1 STARTTLS IDLE\r\n"
    };
    let _ = write_line(stream, line).await;
    let resp = format!("{tag} OK CAPABILITY completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn run(tag: &str, quota: bool) -> String {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        handle_capability(tag, quota, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn announces_quota_when_enabled() {
        let output = run("A1", true).await;
        assert!(output.contains("* CAPABILITY IMAP4rev1 STARTTLS IDLE QUOTA\r\n"));
        assert!(output.contains("A1 OK CAPABILITY completed"));
    }

    #[tokio::test]
    async fn omits_quota_when_disabled() {
        let output = run("A1", false).await;
        assert!(!output.contains("QUOTA"));
        assert!(output.contains("A1 OK CAPABILITY completed"));
    }
}
