//! Fake IMAP server for integration testing
//!
//! This module provides an in-process IMAP server that speaks enough
//! of the protocol to test the account backend end-to-end:
//!
//! TCP -> greeting -> STARTTLS -> TLS handshake -> LOGIN -> CAPABILITY -> GETQUOTAROOT
//!
//! ## Module layout
//!
//! - `server` -- TCP listener, TLS setup, and connection dispatch
//! - `handlers/` -- one file per IMAP command (LOGIN, GETQUOTAROOT, etc.)
//! - `directory` -- test data model (users, quotas, builder)
//! - `io` -- shared write helpers

#![allow(dead_code)]

mod io;

pub use directory::DirectoryBuilder;
pub use server::FakeImapServer;
