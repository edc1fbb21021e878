//! # Identifiers
//!
//! Every identity in the crate is a random UUID v4 wrapped in a newtype, so a
//! [`SubscriptionId`] can never be passed where a [`ListenerId`] is expected.
//!
//! - [`ProgressBarId`] assigned once per publisher, stable for its lifetime
//! - [`SubscriptionId`] one callback registration on a publisher
//! - [`ListenerId`] one listener queue on a handler

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identity of one progress bar (publisher), tagged onto every update it emits.
    ProgressBarId
);

uuid_id!(
    /// Handle returned by `subscribe`, used to `unsubscribe` later.
    SubscriptionId
);

uuid_id!(
    /// Identity of one listener queue registered on a handler.
    ListenerId
);
