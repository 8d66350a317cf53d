//! Strongly typed, zero-cost identifier wrappers.
//!
//! Two id spaces exist:
//!
//! - [`RoadId`] is the caller-chosen, persistent identifier of a road.  Any
//!   `i64` is valid, so there is no sentinel.
//! - [`RoadIx`] is a dense index assigned when the topology is snapshotted
//!   for graph search.  It is only meaningful for the snapshot that issued
//!   it and is used for direct `Vec` indexing on the Dijkstra hot path.
//!
//! Both are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }

        impl From<$name> for $inner {
            #[inline(always)]
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

typed_id! {
    /// Persistent identifier of a road (a directed graph edge with geometry).
    pub struct RoadId(i64);
}

typed_id! {
    /// Dense position of a road inside a topology snapshot.
    pub struct RoadIx(u32);
}

impl RoadIx {
    /// Sentinel meaning "no valid index", equal to `u32::MAX`.
    pub const INVALID: RoadIx = RoadIx(u32::MAX);

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for RoadIx {
    /// Returns the `INVALID` sentinel so uninitialized indices are visibly invalid.
    #[inline(always)]
    fn default() -> Self {
        Self::INVALID
    }
}

impl TryFrom<usize> for RoadIx {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<RoadIx, Self::Error> {
        u32::try_from(n).map(RoadIx)
    }
}
