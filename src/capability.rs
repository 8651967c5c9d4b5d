//! Server capabilities
//!
//! Capabilities are read once, right after login, and kept as typed
//! flags next to the session instead of being looked up by name on
//! every use.

use async_imap::types::Capability;
use serde::Serialize;

/// The extensions this backend cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// `QUOTA` (RFC 2087)
    pub quota: bool,
    /// `IDLE` (RFC 2177)
    pub idle: bool,
    /// `STARTTLS`
    pub starttls: bool,
    /// `NAMESPACE` (RFC 2342)
    pub namespace: bool,
}

impl Capabilities {
    /// Build the flag set from capability names as sent by the server.
    ///
    /// Names are matched case-insensitively; unknown ones are ignored.
    #[must_use]
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut caps = Self::default();
        for name in names {
            match name.to_ascii_uppercase().as_str() {
                "QUOTA" => caps.quota = true,
                "IDLE" => caps.idle = true,
                "STARTTLS" => caps.starttls = true,
                "NAMESPACE" => caps.namespace = true,
                _ => {}
            }
        }
        caps
    }
}

impl From<&async_imap::types::Capabilities> for Capabilities {
    fn from(caps: &async_imap::types::Capabilities) -> Self {
        Self::from_names(caps.iter().filter_map(extension_name))
    }
}

/// Name of an extension atom; `None` for the protocol revision and
/// `AUTH=` mechanisms, which never name an extension we track.
fn extension_name(capability: &Capability) -> Option<&str> {
    match capability {
        Capability::Atom(name) => Some(name.as_str()),
        Capability::Imap4rev1 | Capability::Auth(_) => None,
    }
}
