//! IMAP server configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 1143;
const DEFAULT_QUOTA_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings shared by every user session.
///
/// Credentials are not part of the configuration: each user brings
/// their own at authentication time.
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    /// Domain appended to bare usernames to form the primary address.
    /// Falls back to `host` when unset.
    pub domain: Option<String>,
    /// Upper bound on the `GETQUOTAROOT` round trip.
    pub quota_timeout: Duration,
}

impl ImapConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            domain: None,
            quota_timeout: DEFAULT_QUOTA_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_quota_timeout(mut self, timeout: Duration) -> Self {
        self.quota_timeout = timeout;
        self
    }

    /// Load IMAP configuration from environment variables
    ///
    /// Reads from `.env` file if present. All variables are optional:
    /// - `IMAP_HOST` (default: `127.0.0.1`)
    /// - `IMAP_PORT` (default: `1143`)
    /// - `IMAP_DOMAIN` (default: the host)
    /// - `IMAP_QUOTA_TIMEOUT_SECS` (default: `10`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("IMAP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?,
            None => DEFAULT_PORT,
        };
        let quota_timeout = match lookup("IMAP_QUOTA_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map(Duration::from_secs).map_err(|e| {
                Error::Config(format!("Invalid IMAP_QUOTA_TIMEOUT_SECS: {e}"))
            })?,
            None => DEFAULT_QUOTA_TIMEOUT,
        };

        Ok(Self {
            host: lookup("IMAP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            domain: lookup("IMAP_DOMAIN").filter(|d| !d.is_empty()),
            quota_timeout,
        })
    }

    /// The address a user is known by once logged in.
    ///
    /// Usernames that already look like an address are used as-is.
    #[must_use]
    pub fn primary_address(&self, username: &str) -> String {
        if username.contains('@') {
            username.to_string()
        } else {
            let domain = self.domain.as_deref().unwrap_or(&self.host);
            format!("{username}@{domain}")
        }
    }
}
