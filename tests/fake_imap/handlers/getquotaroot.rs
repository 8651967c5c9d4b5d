//! GETQUOTAROOT command handler (RFC 2087).
//!
//! Users with a quota get a single root named `""`:
//!
//! ```text
//!   * QUOTAROOT "INBOX" ""
//!   * QUOTA "" (STORAGE 100 1000)
//!   A0003 OK GETQUOTAROOT completed
//! ```
//!
//! Users without one only get the QUOTAROOT line, with no roots.

use crate::fake_imap::directory::TestUser;
use crate::fake_imap::io::write_line;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the GETQUOTAROOT command for the logged-in `user`.
pub async fn handle_getquotaroot<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    mailbox: &str,
    user: Option<&TestUser>,
    delay: Duration,
    stream: &mut BufReader<S>,
) {
    let Some(user) = user else {
        let resp = format!("{tag} NO Not authenticated\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut lines = Vec::new();
    match user.quota {
        Some((usage, limit)) => {
            lines.push(format!("* QUOTAROOT \"{mailbox}\" \"\"\r\n"));
            lines.push(format!("* QUOTA \"\" (STORAGE {usage} {limit})\r\n"));
        }
        None => lines.push(format!("* QUOTAROOT \"{mailbox}\"\r\n")),
    }
    lines.push(format!("{tag} OK GETQUOTAROOT completed\r\n"));

    for line in lines {
        if write_line(stream, &line).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn run(tag: &str, user: Option<&TestUser>) -> String {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        handle_getquotaroot(tag, "INBOX", user, Duration::ZERO, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn user(quota: Option<(u64, u64)>) -> TestUser {
        TestUser {
            username: "alice".to_string(),
            password: "secret".to_string(),
            quota,
        }
    }

    #[tokio::test]
    async fn reports_quota() {
        let output = run("A3", Some(&user(Some((100, 1000))))).await;
        assert_eq!(
            output,
            "* QUOTAROOT \"INBOX\" \"\"\r\n\
             * QUOTA \"\" (STORAGE 100 1000)\r\n\
             A3 OK GETQUOTAROOT completed\r\n"
        );
    }

    #[tokio::test]
    async fn user_without_quota_has_no_root() {
        let output = run("A3", Some(&user(None))).await;
        assert!(output.starts_with("* QUOTAROOT \"INBOX\"\r\n"));
        assert!(!output.contains("* QUOTA "));
        assert!(output.ends_with("A3 OK GETQUOTAROOT completed\r\n"));
    }

    #[tokio::test]
    async fn requires_login() {
        let output = run("A3", None).await;
        assert_eq!(output, "A3 NO Not authenticated\r\n");
    }
}
