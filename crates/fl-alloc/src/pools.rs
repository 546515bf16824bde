//! Shared allocation resources.
//!
//! Every tote is in exactly one of `unreserved` / `reserved`, and every
//! storage slot in exactly one of `free` / `occupied`.  Every request is
//! either queued here or held by exactly one agent.  All moves between pools
//! go through the methods below so the partition can't drift.
//!
//! Iteration order is insertion order (`IndexSet` / `IndexMap`), which keeps
//! candidate scoring deterministic for a fixed seed.

use indexmap::{IndexMap, IndexSet};

use fl_core::{LetterStationId, SimRng, TileId, ToteId, WaypointId, WordId, WordStationId};
use fl_graph::WaypointGraph;
use fl_stock::{Letter, ToteStore};

use crate::{AllocError, AllocResult};

/// A bundle waiting at a letter station.  `tile` is the bundle's head.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PickupRequest {
    pub letter: Letter,
    pub tile: TileId,
    pub station: LetterStationId,
}

/// A letter a word station needs for `word`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub letter: Letter,
    pub word: WordId,
    pub station: WordStationId,
}

#[derive(Clone, Debug, Default)]
pub struct ResourcePools {
    unreserved: IndexSet<ToteId>,
    reserved: IndexSet<ToteId>,
    free: IndexSet<WaypointId>,
    /// Slot → the tote resting on it or bound for it.
    occupied: IndexMap<WaypointId, ToteId>,
    pickups: Vec<PickupRequest>,
    deliveries: Vec<DeliveryRequest>,
}

impl ResourcePools {
    /// Pools matching the graph's current residency: every tote unreserved,
    /// every slot with a resident occupied, the rest free.
    pub fn from_graph(graph: &WaypointGraph, totes: &ToteStore) -> AllocResult<Self> {
        let mut pools = Self::default();
        for slot in graph.storage_slots() {
            match graph.resident_tote(slot) {
                Some(tote) => {
                    pools.occupied.insert(slot, tote);
                }
                None => {
                    pools.free.insert(slot);
                }
            }
        }
        if pools.free.is_empty() && pools.occupied.is_empty() {
            return Err(AllocError::NoStorage);
        }
        for tote in totes.iter() {
            if graph.tote_waypoint(tote.id).is_none() {
                return Err(AllocError::UnplacedTote(tote.id));
            }
            pools.unreserved.insert(tote.id);
        }
        Ok(pools)
    }

    // ── Sizes ─────────────────────────────────────────────────────────────

    pub fn unreserved_totes(&self) -> usize {
        self.unreserved.len()
    }

    pub fn reserved_totes(&self) -> usize {
        self.reserved.len()
    }

    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_slots(&self) -> usize {
        self.occupied.len()
    }

    pub fn pickup_requests(&self) -> &[PickupRequest] {
        &self.pickups
    }

    pub fn delivery_requests(&self) -> &[DeliveryRequest] {
        &self.deliveries
    }

    // ── Totes ─────────────────────────────────────────────────────────────

    pub fn unreserved(&self) -> impl Iterator<Item = ToteId> + '_ {
        self.unreserved.iter().copied()
    }

    pub fn is_reserved(&self, tote: ToteId) -> bool {
        self.reserved.contains(&tote)
    }

    /// Move `tote` to the reserved pool.  `false` if it was not unreserved.
    pub fn reserve_tote(&mut self, tote: ToteId) -> bool {
        if !self.unreserved.shift_remove(&tote) {
            return false;
        }
        self.reserved.insert(tote);
        true
    }

    /// Return `tote` to the unreserved pool.  `false` if it was not reserved.
    pub fn release_tote(&mut self, tote: ToteId) -> bool {
        if !self.reserved.shift_remove(&tote) {
            return false;
        }
        self.unreserved.insert(tote);
        true
    }

    // ── Slots ─────────────────────────────────────────────────────────────

    pub fn free(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.free.iter().copied()
    }

    pub fn occupant(&self, slot: WaypointId) -> Option<ToteId> {
        self.occupied.get(&slot).copied()
    }

    /// Bind a free `slot` to `tote`.  `false` if the slot was not free.
    pub fn reserve_slot(&mut self, slot: WaypointId, tote: ToteId) -> bool {
        if !self.free.shift_remove(&slot) {
            return false;
        }
        self.occupied.insert(slot, tote);
        true
    }

    /// Free an occupied `slot`, returning the tote it was bound to.
    pub fn release_slot(&mut self, slot: WaypointId) -> Option<ToteId> {
        let tote = self.occupied.shift_remove(&slot)?;
        self.free.insert(slot);
        Some(tote)
    }

    /// Record that `tote` now rests on `slot`, whatever its pool.
    pub fn mark_occupied(&mut self, slot: WaypointId, tote: ToteId) {
        self.free.shift_remove(&slot);
        self.occupied.insert(slot, tote);
    }

    // ── Request queues ────────────────────────────────────────────────────

    /// Queue a fresh pickup at a random position.
    pub fn add_pickup(&mut self, req: PickupRequest, rng: &mut SimRng) {
        let at = rng.insert_index(self.pickups.len());
        self.pickups.insert(at, req);
    }

    /// Queue a fresh delivery at a random position.
    pub fn add_delivery(&mut self, req: DeliveryRequest, rng: &mut SimRng) {
        let at = rng.insert_index(self.deliveries.len());
        self.deliveries.insert(at, req);
    }

    /// Put a cancelled pickup back, behind every fresh one.
    pub fn requeue_pickup(&mut self, req: PickupRequest) {
        self.pickups.push(req);
    }

    pub fn requeue_delivery(&mut self, req: DeliveryRequest) {
        self.deliveries.push(req);
    }

    pub(crate) fn take_pickup(&mut self, index: usize) -> Option<PickupRequest> {
        (index < self.pickups.len()).then(|| self.pickups.remove(index))
    }

    pub(crate) fn take_delivery(&mut self, index: usize) -> Option<DeliveryRequest> {
        (index < self.deliveries.len()).then(|| self.deliveries.remove(index))
    }
}
