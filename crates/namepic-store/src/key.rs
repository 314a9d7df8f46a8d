//! Two-tier storage key layout.
//!
//! The rendered layout is part of the wire contract and must stay
//! bit-exact: `"<network>/registered/<name>"` for the canonical slot,
//! `"<network>/unregistered/<name>/<uploader>"` for speculative slots
//! with the uploader in EIP-55 form.

use std::fmt;

use namepic_ethereum::Address;

/// Key for one stored avatar blob.
///
/// Per (network, name) there is at most one canonical slot and zero or
/// more speculative slots, at most one per uploader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    /// The authoritative blob for a registered name.
    Canonical {
        /// Lowercase network name.
        network: String,
        /// The ENS name.
        name: String,
    },
    /// A tentative per-uploader blob for a not-yet-registered name.
    Speculative {
        /// Lowercase network name.
        network: String,
        /// The ENS name.
        name: String,
        /// The address that uploaded the blob.
        uploader: Address,
    },
}

impl ObjectKey {
    /// Creates a canonical key.
    pub fn canonical(network: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Canonical {
            network: network.into(),
            name: name.into(),
        }
    }

    /// Creates a speculative key for one uploader.
    pub fn speculative(
        network: impl Into<String>,
        name: impl Into<String>,
        uploader: Address,
    ) -> Self {
        Self::Speculative {
            network: network.into(),
            name: name.into(),
            uploader,
        }
    }

    /// Returns the listing prefix covering every speculative slot of a
    /// name.
    pub fn speculative_prefix(network: &str, name: &str) -> String {
        format!("{network}/unregistered/{name}/")
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical { network, name } => {
                write!(f, "{network}/registered/{name}")
            }
            Self::Speculative {
                network,
                name,
                uploader,
            } => {
                write!(f, "{network}/unregistered/{name}/{uploader}")
            }
        }
    }
}
