//! The user backend contract and its IMAP implementation
//!
//! The remote server is the only source of truth about who exists, and
//! it is only asked at login. Everything that would create or modify
//! users on the server is therefore a no-op or unsupported here.

use crate::account::{Account, AccountUpdate};
use crate::auth::AuthGate;
use crate::cache::SessionCache;
use crate::config::ImapConfig;
use crate::connection::{Connector, ImapConnector};
use crate::error::{Error, Result};
use crate::quota::QuotaResolver;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a mail server front end needs from its user store.
#[async_trait]
pub trait UsersBackend: Send + Sync {
    /// Get a user that has already logged in.
    async fn get_user(&self, id: &str) -> Result<Arc<Account>>;

    /// Check credentials and return the user.
    async fn auth(&self, username: &str, password: &str) -> Result<Arc<Account>>;

    async fn is_username_available(&self, username: &str) -> Result<bool>;

    /// Create a user.
    async fn insert_user(&self, account: &Account, password: &str) -> Result<Arc<Account>>;

    async fn update_user(&self, update: &AccountUpdate) -> Result<()>;

    async fn update_user_password(&self, id: &str, current: &str, new: &str) -> Result<()>;
}

/// [`UsersBackend`] backed by a remote IMAP server.
pub struct ImapUsers<C> {
    gate: AuthGate<C>,
}

impl ImapUsers<ImapConnector> {
    /// Users of the IMAP server described by `config`.
    #[must_use]
    pub fn from_config(config: ImapConfig) -> Self {
        let quota = QuotaResolver::new(config.quota_timeout);
        Self::new(ImapConnector::new(config), quota)
    }
}

impl<C: Connector> ImapUsers<C> {
    #[must_use]
    pub fn new(connector: C, quota: QuotaResolver) -> Self {
        Self {
            gate: AuthGate::new(Arc::new(connector), Arc::new(SessionCache::new()), quota),
        }
    }

    #[must_use]
    pub const fn connector(&self) -> &Arc<C> {
        self.gate.connector()
    }
}

#[async_trait]
impl<C: Connector> UsersBackend for ImapUsers<C> {
    async fn get_user(&self, id: &str) -> Result<Arc<Account>> {
        self.gate
            .cache()
            .lookup(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn auth(&self, username: &str, password: &str) -> Result<Arc<Account>> {
        self.gate.authenticate(username, password).await
    }

    /// Always `true`: whether a name is taken is only known once
    /// someone logs in with it.
    async fn is_username_available(&self, _username: &str) -> Result<bool> {
        Ok(true)
    }

    /// Verifies that the user already exists on the server.
    async fn insert_user(&self, account: &Account, password: &str) -> Result<Arc<Account>> {
        self.auth(&account.name, password).await
    }

    async fn update_user(&self, _update: &AccountUpdate) -> Result<()> {
        Ok(())
    }

    async fn update_user_password(&self, _id: &str, _current: &str, _new: &str) -> Result<()> {
        Err(Error::Unsupported(
            "Cannot update user password with IMAP backend",
        ))
    }
}
