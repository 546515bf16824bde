//! Letters, tiles, and the tile mint.
//!
//! A [`Letter`] is a *value* (character plus color); two letters match when
//! both parts are equal.  A [`Tile`] is a physical instance of a letter with
//! its own [`TileId`], so the same value can exist many times in the
//! warehouse while each copy is still tracked individually.

use std::fmt;

use fl_core::TileId;

/// A colored character.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter {
    pub ch: char,
    pub color: u8,
}

impl Letter {
    pub const fn new(ch: char, color: u8) -> Self {
        Self { ch, color }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.ch, self.color)
    }
}

/// One physical letter tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub letter: Letter,
}

/// Hands out tiles with unique ids.
#[derive(Debug, Default)]
pub struct TileMint {
    next: u64,
}

impl TileMint {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn mint(&mut self, letter: Letter) -> Tile {
        let id = TileId(self.next);
        self.next += 1;
        Tile { id, letter }
    }

    /// `size` identical-valued tiles.  The first tile stands for the bundle
    /// in transfer requests.
    pub fn mint_bundle(&mut self, letter: Letter, size: usize) -> Vec<Tile> {
        (0..size).map(|_| self.mint(letter)).collect()
    }

    /// Number of tiles minted so far.
    pub fn minted(&self) -> u64 {
        self.next
    }
}
