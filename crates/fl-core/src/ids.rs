//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every entity in the world lives in an arena `Vec` and is addressed by one
//! of these handles.  All IDs are `Copy + Ord + Hash` so they work as map
//! keys and in sorted collections; `.index()` converts to a `Vec` index.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a robot (and of its paired allocation agent).
    pub struct RobotId(u32);
}

typed_id! {
    /// Index of a storage tote.
    pub struct ToteId(u32);
}

typed_id! {
    /// Index of a waypoint-graph node.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Index of a directed waypoint-graph edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index of a letter (supply) station.
    pub struct LetterStationId(u32);
}

typed_id! {
    /// Index of a word (consumption) station.
    pub struct WordStationId(u32);
}

typed_id! {
    /// Index of a word in the world's word store.
    pub struct WordId(u32);
}

typed_id! {
    /// Identity of one physical letter tile.  Tiles are minted for the whole
    /// run, so the counter is 64-bit.
    pub struct TileId(u64);
}
