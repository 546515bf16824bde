//! Totes and the tote arena.

use fl_core::{RobotId, TileId, ToteId, WaypointId};

use crate::letter::{Letter, Tile};
use crate::{StockError, StockResult};

/// Who holds a tote right now.  Exactly one variant applies at any instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToteOwner {
    /// Resting on a storage slot.
    Slot(WaypointId),
    /// Carried by a robot.
    Robot(RobotId),
    /// Inside a pickup or setdown block by this robot.
    Transit(RobotId),
}

#[derive(Clone, Debug)]
pub struct Tote {
    pub id: ToteId,
    pub capacity: usize,
    pub owner: ToteOwner,
    tiles: Vec<Tile>,
}

impl Tote {
    pub fn new(id: ToteId, capacity: usize, slot: WaypointId) -> Self {
        Self { id, capacity, owner: ToteOwner::Slot(slot), tiles: Vec::with_capacity(capacity) }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// `true` if `n` more tiles fit.
    #[inline]
    pub fn has_room_for(&self, n: usize) -> bool {
        self.tiles.len() + n <= self.capacity
    }

    /// Identity check: is this exact tile inside?
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.iter().any(|t| t.id == tile)
    }

    /// Value check: the first tile whose letter matches.
    pub fn find_matching(&self, letter: Letter) -> Option<TileId> {
        self.tiles.iter().find(|t| t.letter == letter).map(|t| t.id)
    }

    /// Add a whole bundle, or nothing if it would overflow.
    pub fn add_tiles(&mut self, tiles: Vec<Tile>) -> StockResult<()> {
        if !self.has_room_for(tiles.len()) {
            return Err(StockError::ToteFull(self.id));
        }
        self.tiles.extend(tiles);
        Ok(())
    }

    pub fn remove(&mut self, tile: TileId) -> Option<Tile> {
        let pos = self.tiles.iter().position(|t| t.id == tile)?;
        Some(self.tiles.remove(pos))
    }
}

/// Every tote in the run, indexed by `ToteId`.
#[derive(Debug, Default)]
pub struct ToteStore {
    pub totes: Vec<Tote>,
}

impl ToteStore {
    pub fn new() -> Self {
        Self { totes: Vec::new() }
    }

    /// Append a tote; its id must equal the current length.
    pub fn push(&mut self, tote: Tote) -> StockResult<ToteId> {
        if tote.id.index() != self.totes.len() {
            return Err(StockError::OutOfOrder(tote.id));
        }
        let id = tote.id;
        self.totes.push(tote);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.totes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ToteId) -> Option<&Tote> {
        self.totes.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: ToteId) -> Option<&mut Tote> {
        self.totes.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tote> {
        self.totes.iter()
    }

    pub fn contains_tile(&self, tote: ToteId, tile: TileId) -> bool {
        self.get(tote).is_some_and(|t| t.contains(tile))
    }

    /// Total tiles over total capacity.
    pub fn utilization(&self) -> f64 {
        let cap: usize = self.totes.iter().map(|t| t.capacity).sum();
        if cap == 0 {
            return 0.0;
        }
        let held: usize = self.totes.iter().map(Tote::len).sum();
        held as f64 / cap as f64
    }
}
