//! Error types for imap-account-backend

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No such user: {0}")]
    NotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error comes from the network or the IMAP protocol
    /// rather than from the caller's input.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Imap(_) | Self::Io(_) | Self::Tls(_) | Self::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
