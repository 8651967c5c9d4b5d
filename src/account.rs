//! Account and address types
//!
//! An [`Account`] is built once, on the first successful login of a
//! username, and then shared read-only out of the session cache.

use crate::quota::QuotaObservation;
use serde::{Deserialize, Serialize};

/// A user known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identity. Equal to the login username.
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub addresses: Vec<Address>,
    /// Bytes in use, `0` when unknown.
    pub used_space: u64,
    /// Storage limit in bytes, `0` when unknown.
    pub max_space: u64,
}

impl Account {
    /// Build the account for a user who just logged in.
    ///
    /// The account gets exactly one address, the primary address
    /// reported at connect time, enabled for sending and receiving.
    #[must_use]
    pub fn from_login(username: &str, primary_address: &str) -> Self {
        Self {
            id: username.to_string(),
            name: username.to_string(),
            display_name: username.to_string(),
            addresses: vec![Address {
                id: username.to_string(),
                email: primary_address.to_string(),
                send: true,
                receive: true,
                status: AddressStatus::Enabled,
                kind: AddressType::Original,
            }],
            used_space: 0,
            max_space: 0,
        }
    }

    /// The address created at login.
    #[must_use]
    pub fn primary_address(&self) -> Option<&Address> {
        self.addresses.first()
    }

    /// Overwrite both quota counters from a single observation.
    pub const fn apply_quota(&mut self, quota: QuotaObservation) {
        self.used_space = quota.used_bytes();
        self.max_space = quota.limit_bytes();
    }
}

/// A mailbox identity bound to an [`Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub email: String,
    pub send: bool,
    pub receive: bool,
    pub status: AddressStatus,
    #[serde(rename = "type")]
    pub kind: AddressType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressStatus {
    Disabled,
    Enabled,
}

/// Where an address comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    /// The address the account was created with.
    Original,
    /// An additional address delivering to the same mailbox.
    Alias,
    /// An address on a user-managed domain.
    Custom,
}

/// Profile changes requested by a client.
///
/// The remote server owns these fields, so the IMAP backend accepts
/// and discards updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub id: String,
    pub display_name: Option<String>,
    pub signature: Option<String>,
}
