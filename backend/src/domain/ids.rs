//! Strongly typed identifiers for users, roads, and proposal requests.
//!
//! All identifiers are UUIDs on the wire. Parsing rejects surrounding
//! whitespace so identifiers copied from URLs or headers round-trip exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The input was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind, for messages.
        kind: &'static str,
    },
    /// The input was not a canonical UUID.
    #[error("{kind} must be a valid UUID")]
    Invalid {
        /// Identifier kind, for messages.
        kind: &'static str,
    },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { kind: $kind })
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id! {
    /// Stable user identifier shared by drivers and passengers.
    UserId => "user id"
}

define_id! {
    /// Identifier of a driver's road.
    RoadId => "road id"
}

define_id! {
    /// Identifier of one staged proposal instance.
    ///
    /// A restage issues a fresh request id; the superseded id no longer
    /// resolves.
    RequestId => "request id"
}
