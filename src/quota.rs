//! Quota reporting (RFC 2087)
//!
//! `GETQUOTAROOT` answers with a loose mix of untagged lines:
//!
//! ```text
//! * QUOTAROOT INBOX ""
//! * QUOTA "" (STORAGE 100 1000)
//! ```
//!
//! async-imap decodes them; [`QuotaRootResponse`] keeps them as labelled
//! entries in arrival order, and [`QuotaResolver`] copies the first
//! usable tuple onto an [`Account`]. Only one quota root is supported:
//! when the server reports several, every root after the first is
//! ignored.

use crate::account::Account;
use crate::connection::{Connector, ProtocolSession};
use crate::error::{Error, Result};
use async_imap::types::{Quota, QuotaResourceName, QuotaRoot};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The mailbox whose quota root is queried.
pub const PRIMARY_MAILBOX: &str = "INBOX";

/// A usage/limit pair as reported by the server, in kibibytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaObservation {
    pub usage_kb: u64,
    pub limit_kb: u64,
}

impl QuotaObservation {
    #[must_use]
    pub const fn used_bytes(self) -> u64 {
        self.usage_kb.saturating_mul(1024)
    }

    #[must_use]
    pub const fn limit_bytes(self) -> u64 {
        self.limit_kb.saturating_mul(1024)
    }
}

/// One `resource usage limit` triple of a `QUOTA` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaResource {
    /// Upper-cased resource name, e.g. `STORAGE`.
    pub name: String,
    pub usage: u64,
    pub limit: u64,
}

impl From<&async_imap::types::QuotaResource> for QuotaResource {
    fn from(resource: &async_imap::types::QuotaResource) -> Self {
        let name = match &resource.name {
            QuotaResourceName::Storage => "STORAGE".to_string(),
            QuotaResourceName::Message => "MESSAGE".to_string(),
            QuotaResourceName::Atom(atom) => atom.to_ascii_uppercase(),
        };
        Self {
            name,
            usage: resource.usage,
            limit: resource.limit,
        }
    }
}

/// A single untagged line of a `GETQUOTAROOT` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaEntry {
    /// `* QUOTAROOT <mailbox> <root>...`
    Root { mailbox: String, roots: Vec<String> },
    /// `* QUOTA <root> (<resource> <usage> <limit>...)`
    Quota {
        root: String,
        resources: Vec<QuotaResource>,
    },
}

impl From<&QuotaRoot> for QuotaEntry {
    fn from(root: &QuotaRoot) -> Self {
        Self::Root {
            mailbox: root.mailbox_name.clone(),
            roots: root.quota_root_names.clone(),
        }
    }
}

impl From<&Quota> for QuotaEntry {
    fn from(quota: &Quota) -> Self {
        Self::Quota {
            root: quota.root_name.clone(),
            resources: quota.resources.iter().map(QuotaResource::from).collect(),
        }
    }
}

/// Decoded `GETQUOTAROOT` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaRootResponse {
    pub entries: Vec<QuotaEntry>,
}

impl From<(Vec<QuotaRoot>, Vec<Quota>)> for QuotaRootResponse {
    /// `QUOTAROOT` entries first, then `QUOTA` entries, each in the order
    /// the server sent them.
    fn from((roots, quotas): (Vec<QuotaRoot>, Vec<Quota>)) -> Self {
        let entries = roots
            .iter()
            .map(QuotaEntry::from)
            .chain(quotas.iter().map(QuotaEntry::from))
            .collect();
        Self { entries }
    }
}

impl QuotaRootResponse {
    /// The first tuple of the first `QUOTA` entry that carries one.
    #[must_use]
    pub fn first_observation(&self) -> Option<QuotaObservation> {
        self.entries.iter().find_map(|entry| match entry {
            QuotaEntry::Quota { resources, .. } => {
                resources.first().map(|resource| QuotaObservation {
                    usage_kb: resource.usage,
                    limit_kb: resource.limit,
                })
            }
            QuotaEntry::Root { .. } => None,
        })
    }
}

/// Refreshes an account's quota counters from its live session.
#[derive(Debug, Clone, Copy)]
pub struct QuotaResolver {
    timeout: Duration,
}

impl QuotaResolver {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Query the quota root of [`PRIMARY_MAILBOX`] and store the result
    /// on `account`.
    ///
    /// The session stays locked for the whole exchange. A server
    /// without `QUOTA`, or a response without any tuple, leaves the
    /// account untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, the query fails, or
    /// the server does not answer within the configured timeout.
    pub async fn resolve<C>(&self, connector: &C, account: &mut Account) -> Result<()>
    where
        C: Connector + ?Sized,
    {
        let mut session = connector.session(&account.id).await?;

        if !session.capabilities().quota {
            debug!("Server has no QUOTA support for {}", account.id);
            return Ok(());
        }

        let response = tokio::time::timeout(self.timeout, session.get_quota_root(PRIMARY_MAILBOX))
            .await
            .map_err(|_| {
                warn!(
                    "GETQUOTAROOT for {} timed out, its answer is left unread on the session",
                    account.id
                );
                Error::Timeout(format!(
                    "GETQUOTAROOT for {} after {:?}",
                    account.id, self.timeout
                ))
            })??;
        drop(session);

        let Some(quota) = response.first_observation() else {
            debug!("No quota reported for {}", account.id);
            return Ok(());
        };

        account.apply_quota(quota);
        info!(
            "Quota for {}: {} of {} bytes",
            account.id, account.used_space, account.max_space
        );
        Ok(())
    }
}
