//! Login and session reuse
//!
//! The first successful login of a username opens an IMAP session and
//! caches the resulting [`Account`]. Later logins with the same
//! password reuse it without touching the server; a different password
//! is rejected outright.

use crate::account::Account;
use crate::cache::SessionCache;
use crate::connection::Connector;
use crate::error::Result;
use crate::quota::QuotaResolver;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a step the caller does not depend on.
///
/// Failures are logged and swallowed; returns whether the step
/// succeeded.
pub fn soft_dependency(step: &str, id: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("{} failed for {}, continuing: {}", step, id, e);
            false
        }
    }
}

/// Decides between cached sessions and fresh logins.
pub struct AuthGate<C> {
    connector: Arc<C>,
    cache: Arc<SessionCache>,
    quota: QuotaResolver,
}

impl<C: Connector> AuthGate<C> {
    #[must_use]
    pub const fn new(connector: Arc<C>, cache: Arc<SessionCache>, quota: QuotaResolver) -> Self {
        Self {
            connector,
            cache,
            quota,
        }
    }

    #[must_use]
    pub const fn connector(&self) -> &Arc<C> {
        &self.connector
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Authenticate `username`, reusing its session when one exists.
    ///
    /// Concurrent first logins of the same username are serialized so
    /// only one of them reaches the server. Quota is refreshed on a
    /// best-effort basis and never fails the login.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`](crate::Error::InvalidCredentials)
    /// if the password does not match the cached one or the server
    /// rejects it, and a connection error if the server cannot be
    /// reached.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Arc<Account>> {
        if let Some(cached) = self.cache.verify(username, password) {
            debug!("Reusing session for {}", username);
            return cached;
        }

        let lock = self.cache.login_lock(username);
        let result = {
            let _login = Arc::clone(&lock).lock_owned().await;
            self.login(username, password).await
        };
        self.cache.release_login_lock(username, lock);
        result
    }

    /// Fresh login, with the login lock of `username` held.
    async fn login(&self, username: &str, password: &str) -> Result<Arc<Account>> {
        // Another caller may have finished logging in while we waited.
        if let Some(cached) = self.cache.verify(username, password) {
            debug!("Reusing session for {}", username);
            return cached;
        }

        let email = self.connector.connect(username, password).await?;
        let mut account = Account::from_login(username, &email);

        soft_dependency(
            "Quota refresh",
            username,
            self.quota.resolve(self.connector.as_ref(), &mut account).await,
        );

        info!("New session for {} <{}>", username, email);
        Ok(self.cache.insert(username, password, account))
    }
}
