//! Order flow: words into word stations, bundles into letter stations.
//!
//! Each word assigned to a word station queues one delivery request per
//! letter and tells [`LetterSupply`] which letters the warehouse must now
//! produce.  Letter stations are refilled from that list, one bundle per
//! station per step, and every new bundle queues a pickup request.
//!
//! A bundle brings `bundle_size` copies of a letter but a word needs only
//! one, so the extra copies are booked as *surplus* and cover the next
//! requirements for the same letter before a new bundle is ordered.

use std::collections::VecDeque;

use fl_alloc::{DeliveryRequest, PickupRequest, ResourcePools};
use fl_core::{SimRng, SimTime, WordId};
use fl_stock::{Letter, LetterStation, TileMint, Word, WordStation};

use crate::content::ContentSource;

// ── WordOrders ────────────────────────────────────────────────────────────────

/// Counters for the measured period.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrderStats {
    pub words_assigned: u64,
    pub words_completed: u64,
    pub letters_delivered: u64,
}

/// Keeps a buffer of upcoming words and hands them to word stations.
#[derive(Debug)]
pub struct WordOrders {
    available: VecDeque<Word>,
    buffer: usize,
    next_id: u32,
    completed: Vec<Word>,
    pub stats: OrderStats,
}

impl WordOrders {
    /// `buffer` words are kept ready for assignment (at least one).
    pub fn new(buffer: usize) -> Self {
        Self {
            available: VecDeque::new(),
            buffer: buffer.max(1),
            next_id: 0,
            completed: Vec::new(),
            stats: OrderStats::default(),
        }
    }

    pub fn next_event_time(&self, _now: SimTime) -> SimTime {
        SimTime::NEVER
    }

    pub fn available(&self) -> impl Iterator<Item = &Word> {
        self.available.iter()
    }

    /// Words finished since the last statistics reset, oldest first.
    pub fn completed(&self) -> &[Word] {
        &self.completed
    }

    /// Top up the buffer, then give one word to every station with room.
    pub fn advance(
        &mut self,
        stations: &mut [WordStation],
        supply: &mut LetterSupply,
        pools: &mut ResourcePools,
        content: &mut dyn ContentSource,
        rng: &mut SimRng,
    ) {
        while self.available.len() < self.buffer {
            let id = WordId(self.next_id);
            self.next_id += 1;
            self.available.push_back(Word::new(id, content.next_word(rng)));
        }

        for station in stations.iter_mut().filter(|s| s.has_room()) {
            let Some(word) = self.available.pop_front() else { return };
            let (id, letters) = (word.id, word.letters().to_vec());
            if !station.assign_word(word) {
                continue;
            }
            for letter in letters {
                pools.add_delivery(DeliveryRequest { letter, word: id, station: station.id }, rng);
                supply.require(letter);
            }
            self.stats.words_assigned += 1;
            log::debug!("word {id} assigned to {}", station.id);
        }
    }

    pub fn letter_delivered(&mut self) {
        self.stats.letters_delivered += 1;
    }

    pub fn word_completed(&mut self, word: Word) {
        log::debug!("word {} \"{word}\" completed", word.id);
        self.stats.words_completed += 1;
        self.completed.push(word);
    }

    pub fn reset_statistics(&mut self) {
        self.stats = OrderStats::default();
        self.completed.clear();
    }
}

// ── LetterSupply ──────────────────────────────────────────────────────────────

/// Turns required letters into bundles at letter stations.
#[derive(Debug)]
pub struct LetterSupply {
    required: VecDeque<Letter>,
    surplus: Vec<Letter>,
    bundle_size: usize,
    pub bundles_issued: u64,
}

impl LetterSupply {
    pub fn new(bundle_size: usize) -> Self {
        Self { required: VecDeque::new(), surplus: Vec::new(), bundle_size: bundle_size.max(1), bundles_issued: 0 }
    }

    pub fn next_event_time(&self, _now: SimTime) -> SimTime {
        SimTime::NEVER
    }

    /// Letters still waiting for a bundle, oldest first.
    pub fn required(&self) -> impl Iterator<Item = Letter> + '_ {
        self.required.iter().copied()
    }

    /// Copies already in circulation that no word has claimed yet.
    pub fn surplus(&self) -> &[Letter] {
        &self.surplus
    }

    /// Record that one more `letter` is needed.  An unclaimed surplus copy
    /// covers it; otherwise a bundle is ordered and its extra copies become
    /// surplus.
    pub fn require(&mut self, letter: Letter) {
        if let Some(i) = self.surplus.iter().position(|l| *l == letter) {
            self.surplus.remove(i);
            return;
        }
        self.required.push_back(letter);
        self.surplus.extend(std::iter::repeat_n(letter, self.bundle_size - 1));
    }

    /// Give one bundle to every letter station with room.
    pub fn advance(
        &mut self,
        stations: &mut [LetterStation],
        mint: &mut TileMint,
        pools: &mut ResourcePools,
        rng: &mut SimRng,
    ) {
        for station in stations.iter_mut().filter(|s| s.has_room()) {
            let Some(letter) = self.required.pop_front() else { return };
            let bundle = mint.mint_bundle(letter, self.bundle_size);
            let Some(head) = bundle.first().map(|t| t.id) else { continue };
            if !station.add_bundle(bundle) {
                self.required.push_front(letter);
                continue;
            }
            pools.add_pickup(PickupRequest { letter, tile: head, station: station.id }, rng);
            self.bundles_issued += 1;
        }
    }
}
