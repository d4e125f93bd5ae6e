//! Type-safe numeric identifier wrappers.
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. Entity ids are
//! allocated sequentially by the owning simulation context so they stay
//! stable for the entity's lifetime and reproducible for a given seed.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }

            /// Return the identifier following this one, or `None` on overflow.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(value) => Some(Self(value)),
                    None => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a bug (ant, doodlebug, ...) in the simulation.
    EntityId
}

define_id! {
    /// Unique identifier for a cell grid instance.
    ///
    /// Cells remember the grid they belong to so that a cell detached by
    /// `destroy_cell` can be told apart from a live one.
    GridId
}
