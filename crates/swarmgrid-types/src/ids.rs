//! Type-safe identifier wrappers around arena indices.
//!
//! Agents live in a dense arena and are addressed by their slot index, so
//! identifiers are plain integers rather than UUIDs. Cells hold sets of
//! [`AgentId`] values instead of references, and transactions are numbered
//! by their position in the global log.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around an unsigned index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub $inner);

        impl $name {
            /// Create an identifier from its raw index.
            pub const fn new(index: $inner) -> Self {
                Self(index)
            }

            /// Return the raw index value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }

            /// Return the identifier as a slot index into a `Vec`.
            ///
            /// Saturates to `usize::MAX` on targets where the index does not
            /// fit, which never resolves to a live slot.
            pub fn slot(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(index: $inner) -> Self {
                Self(index)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable index of an agent in the agent arena.
    AgentId(u32)
}

define_id! {
    /// Sequential identifier of a transaction in the global log.
    TransactionId(u64)
}
