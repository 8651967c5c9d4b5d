//! IMAP-backed mail account backend
//!
//! Implements a generic user backend (lookup, login, quota) on top of
//! a remote IMAP server. Each user that logs in gets one long-lived
//! IMAP session; later logins with the same password reuse it, and
//! access to a session is always exclusive.
//!
//! Quota is read with `GETQUOTAROOT` when the server announces
//! `QUOTA`, and is only ever an enrichment: a failing or slow quota
//! query never fails a login.
//!
//! Sessions are never evicted; they live as long as the process.

mod account;
mod auth;
mod cache;
mod capability;
mod config;
mod connection;
mod directory;
mod error;
mod quota;

pub use account::{Account, AccountUpdate, Address, AddressStatus, AddressType};
pub use auth::{AuthGate, soft_dependency};
pub use cache::SessionCache;
pub use capability::Capabilities;
pub use config::ImapConfig;
pub use connection::{Connector, ImapConnection, ImapConnector, ImapSession, ProtocolSession};
pub use directory::{ImapUsers, UsersBackend};
pub use error::{Error, Result};
pub use quota::{
    PRIMARY_MAILBOX, QuotaEntry, QuotaObservation, QuotaResolver, QuotaResource,
    QuotaRootResponse,
};
