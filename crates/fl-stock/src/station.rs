//! Letter and word stations.
//!
//! Both kinds serve a FIFO of transfer requests, one transfer per step at
//! most, and block themselves and the requesting robot for a fixed time
//! while the transfer happens.  A request that cannot be served when it
//! reaches the front of the queue is dropped; the requesting robot notices
//! through [`LetterStation::is_pending`] / [`WordStation::is_pending`] and
//! gives up its task instead of waiting forever.
//!
//! Stations see robots only through the [`Fleet`] trait.

use std::collections::VecDeque;

use fl_core::{Circle, LetterStationId, RobotId, SimTime, StationConfig, TileId, ToteId, Vec2, WordId, WordStationId};

use crate::letter::Tile;
use crate::tote::ToteStore;
use crate::word::Word;

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// The station-side view of the robot fleet.
pub trait Fleet {
    /// The tote `robot` is carrying, if any.
    fn carried_tote(&self, robot: RobotId) -> Option<ToteId>;

    fn position(&self, robot: RobotId) -> Option<Vec2>;

    /// Keep `robot` from acting before `until`.
    fn block_until(&mut self, robot: RobotId, until: SimTime);
}

/// Per-station counters, cleared at the end of warm-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationStats {
    pub letters_requested: u64,
    pub letters_transferred: u64,
    pub idle_time: f64,
}

fn next_event(blocked_until: SimTime, now: SimTime) -> SimTime {
    if now >= blocked_until { SimTime::NEVER } else { blocked_until }
}

// ── LetterStation ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LetterRequest {
    pub robot: RobotId,
    /// First tile of the requested bundle.
    pub tile: TileId,
}

/// A completed bundle transfer into a tote.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LetterTransfer {
    pub robot: RobotId,
    pub tote: ToteId,
    pub tile: TileId,
}

/// Dispenses bundles of identical letters into totes.
#[derive(Debug)]
pub struct LetterStation {
    pub id: LetterStationId,
    pub body: Circle,
    capacity: usize,
    bundle_size: usize,
    transfer_time: f64,
    bundles: Vec<Vec<Tile>>,
    queue: VecDeque<LetterRequest>,
    blocked_until: SimTime,
    pub stats: StationStats,
}

impl LetterStation {
    pub fn new(id: LetterStationId, body: Circle, cfg: &StationConfig) -> Self {
        Self {
            id,
            body,
            capacity: cfg.letter_station_capacity,
            bundle_size: cfg.bundle_size,
            transfer_time: cfg.letter_to_tote_time,
            bundles: Vec::with_capacity(cfg.letter_station_capacity),
            queue: VecDeque::new(),
            blocked_until: SimTime::ZERO,
            stats: StationStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bundle_size(&self) -> usize {
        self.bundle_size
    }

    pub fn has_room(&self) -> bool {
        self.bundles.len() < self.capacity
    }

    /// Accept a bundle if below capacity.
    pub fn add_bundle(&mut self, bundle: Vec<Tile>) -> bool {
        if bundle.is_empty() || !self.has_room() {
            return false;
        }
        self.bundles.push(bundle);
        true
    }

    pub fn bundles(&self) -> &[Vec<Tile>] {
        &self.bundles
    }

    fn bundle_index(&self, tile: TileId) -> Option<usize> {
        self.bundles.iter().position(|b| b.first().is_some_and(|t| t.id == tile))
    }

    /// Queue a transfer of the bundle headed by `tile` into the tote `robot`
    /// carries.  Repeating a pending request does nothing; a robot without a
    /// tote is counted but not queued.
    pub fn request(&mut self, robot: RobotId, tile: TileId, carried: Option<ToteId>) {
        if self.is_pending(robot, tile) {
            return;
        }
        self.stats.letters_requested += 1;
        if carried.is_some() {
            self.queue.push_back(LetterRequest { robot, tile });
        }
    }

    pub fn is_pending(&self, robot: RobotId, tile: TileId) -> bool {
        self.queue.iter().any(|r| r.robot == robot && r.tile == tile)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn blocked_until(&self) -> SimTime {
        self.blocked_until
    }

    pub fn next_event_time(&self, now: SimTime) -> SimTime {
        next_event(self.blocked_until, now)
    }

    /// Serve the queue up to the first request that can be fulfilled.
    pub fn advance(
        &mut self,
        last: SimTime,
        now: SimTime,
        totes: &mut ToteStore,
        fleet: &mut dyn Fleet,
    ) -> Option<LetterTransfer> {
        if now < self.blocked_until {
            return None;
        }
        self.stats.idle_time += now - last;

        while let Some(req) = self.queue.pop_front() {
            let Some(tote_id) = fleet.carried_tote(req.robot) else { continue };
            let Some(pos) = fleet.position(req.robot) else { continue };
            let Some(tote) = totes.get_mut(tote_id) else { continue };
            if !tote.has_room_for(self.bundle_size) || self.body.center.distance(pos) > self.body.radius {
                continue;
            }
            let Some(idx) = self.bundle_index(req.tile) else { continue };
            if !tote.has_room_for(self.bundles[idx].len()) {
                continue;
            }
            let bundle = self.bundles.remove(idx);
            let n = bundle.len() as u64;
            if tote.add_tiles(bundle).is_err() {
                continue;
            }
            self.stats.letters_transferred += n;
            self.blocked_until = now + self.transfer_time;
            fleet.block_until(req.robot, self.blocked_until);
            return Some(LetterTransfer { robot: req.robot, tote: tote_id, tile: req.tile });
        }
        None
    }

    pub fn reset_statistics(&mut self) {
        self.stats = StationStats::default();
    }
}

// ── WordStation ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WordRequest {
    pub robot: RobotId,
    pub tile: TileId,
    /// Target word, or `None` for the first word that accepts the letter.
    pub word: Option<WordId>,
}

#[derive(Clone, Debug)]
pub enum WordStationEvent {
    /// A tile moved from a tote into a word.
    Delivered { robot: RobotId, tote: ToteId, tile: TileId, word: WordId },
    /// A finished word left the station.
    Completed(Word),
}

/// Assembles words from tiles taken out of totes.
#[derive(Debug)]
pub struct WordStation {
    pub id: WordStationId,
    pub body: Circle,
    capacity: usize,
    transfer_time: f64,
    completion_time: f64,
    words: Vec<Word>,
    queue: VecDeque<WordRequest>,
    blocked_until: SimTime,
    pub stats: StationStats,
}

impl WordStation {
    pub fn new(id: WordStationId, body: Circle, cfg: &StationConfig) -> Self {
        Self {
            id,
            body,
            capacity: cfg.word_station_capacity,
            transfer_time: cfg.tote_to_letter_time,
            completion_time: cfg.word_completion_time,
            words: Vec::with_capacity(cfg.word_station_capacity),
            queue: VecDeque::new(),
            blocked_until: SimTime::ZERO,
            stats: StationStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn has_room(&self) -> bool {
        self.words.len() < self.capacity
    }

    pub fn assign_word(&mut self, word: Word) -> bool {
        if !self.has_room() {
            return false;
        }
        self.words.push(word);
        true
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word(&self, id: WordId) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn request(&mut self, robot: RobotId, tile: TileId, word: Option<WordId>, carried: Option<ToteId>) {
        if self.is_pending(robot, tile) {
            return;
        }
        self.stats.letters_requested += 1;
        if carried.is_some() {
            self.queue.push_back(WordRequest { robot, tile, word });
        }
    }

    pub fn is_pending(&self, robot: RobotId, tile: TileId) -> bool {
        self.queue.iter().any(|r| r.robot == robot && r.tile == tile)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn blocked_until(&self) -> SimTime {
        self.blocked_until
    }

    pub fn next_event_time(&self, now: SimTime) -> SimTime {
        next_event(self.blocked_until, now)
    }

    /// Release one completed word if any; otherwise serve the queue up to
    /// the first tile that fits a word.
    pub fn advance(
        &mut self,
        last: SimTime,
        now: SimTime,
        totes: &mut ToteStore,
        fleet: &mut dyn Fleet,
    ) -> Option<WordStationEvent> {
        if now < self.blocked_until {
            return None;
        }
        self.stats.idle_time += now - last;

        if let Some(i) = self.words.iter().rposition(Word::is_completed) {
            let done = self.words.remove(i);
            self.blocked_until = now + self.completion_time;
            return Some(WordStationEvent::Completed(done));
        }

        while let Some(req) = self.queue.pop_front() {
            let Some(tote_id) = fleet.carried_tote(req.robot) else { continue };
            let Some(pos) = fleet.position(req.robot) else { continue };
            let Some(tote) = totes.get_mut(tote_id) else { continue };
            let Some(letter) = tote.tiles().iter().find(|t| t.id == req.tile).map(|t| t.letter) else {
                continue;
            };
            if self.body.center.distance(pos) >= self.body.radius {
                continue;
            }
            let target = match req.word {
                None => self.words.iter_mut().find(|w| w.accepts(letter)),
                Some(id) => self.words.iter_mut().find(|w| w.id == id && w.accepts(letter)),
            };
            let Some(word) = target else { continue };
            word.add_letter(letter);
            let word_id = word.id;
            tote.remove(req.tile);
            self.stats.letters_transferred += 1;
            self.blocked_until = now + self.transfer_time;
            fleet.block_until(req.robot, self.blocked_until);
            return Some(WordStationEvent::Delivered {
                robot: req.robot,
                tote: tote_id,
                tile: req.tile,
                word: word_id,
            });
        }
        None
    }

    pub fn reset_statistics(&mut self) {
        self.stats = StationStats::default();
    }
}
