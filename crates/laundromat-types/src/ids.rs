//! Type-safe identifier wrappers around server-issued strings.
//!
//! The simulation server hands out plain string identifiers (`"p1"`,
//! `"vendor_bulk"`, `"msg_42"`). Wrapping them keeps agent, vendor and
//! message ids from being mixed up at compile time while serializing
//! transparently as the bare string.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a laundromat owner (the player or an AI competitor).
    AgentId
);

define_id!(
    /// Identifier of a supply vendor in the market.
    VendorId
);

define_id!(
    /// Identifier of an in-game message.
    MessageId
);

define_id!(
    /// Identifier of a calendar entry.
    ScheduledActionId
);
