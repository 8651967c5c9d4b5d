//! Accounts of users who have logged in
//!
//! Entries are created on the first successful login and kept for the
//! lifetime of the process; nothing evicts them.

use crate::account::Account;
use crate::error::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

struct SessionEntry {
    /// Only compared against on reuse, never sent anywhere.
    password: String,
    account: Arc<Account>,
}

/// Process-wide map from identity to logged-in account.
#[derive(Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, SessionEntry>>,
    login_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<Arc<Account>> {
        self.entries
            .read()
            .get(id)
            .map(|entry| Arc::clone(&entry.account))
    }

    /// Whether `password` is the one `id` logged in with. `false` when
    /// `id` is not cached.
    #[must_use]
    pub fn credential_matches(&self, id: &str, password: &str) -> bool {
        matches!(self.verify(id, password), Some(Ok(_)))
    }

    /// Look up `id` and check `password` under a single read lock.
    ///
    /// `None` means the identity has not logged in yet.
    #[must_use]
    pub fn verify(&self, id: &str, password: &str) -> Option<Result<Arc<Account>>> {
        let entries = self.entries.read();
        let entry = entries.get(id)?;
        if entry.password == password {
            Some(Ok(Arc::clone(&entry.account)))
        } else {
            Some(Err(Error::InvalidCredentials))
        }
    }

    /// Store `account` under `id`, replacing any previous entry.
    pub fn insert(&self, id: &str, password: &str, account: Account) -> Arc<Account> {
        let account = Arc::new(account);
        self.entries.write().insert(
            id.to_string(),
            SessionEntry {
                password: password.to_string(),
                account: Arc::clone(&account),
            },
        );
        account
    }

    /// Lock serializing first logins of `id`.
    ///
    /// Different identities get different locks. Hand the lock back with
    /// [`release_login_lock`](Self::release_login_lock) once the login
    /// attempt is over.
    #[must_use]
    pub fn login_lock(&self, id: &str) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.login_locks.lock().entry(id.to_string()).or_default())
    }

    /// Give back a lock obtained from [`login_lock`](Self::login_lock).
    ///
    /// The entry for `id` is dropped once no other caller holds it, so
    /// usernames that never log in successfully do not pile up.
    pub fn release_login_lock(&self, id: &str, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self.login_locks.lock();
        drop(lock);
        if locks.get(id).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(id);
        }
    }

    /// Identities with a login lock currently handed out.
    #[must_use]
    pub fn pending_logins(&self) -> usize {
        self.login_locks.lock().len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
