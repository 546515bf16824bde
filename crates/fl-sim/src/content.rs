//! Word and letter content.
//!
//! A [`ContentSource`] decides which words are ordered and which letters
//! fill the initial inventory.  Sources are picked by name from
//! [`ContentConfig::source`] through [`from_config`]; applications can also
//! hand their own source to [`SimBuilder::content`][crate::SimBuilder::content].
//!
//! | Name           | Words                                  | Random letters                 |
//! |----------------|----------------------------------------|--------------------------------|
//! | `"dictionary"` | drawn uniformly from the word list     | letter frequency of that list  |
//! | `"alphabet"`   | `word_length` uniform lowercase letters | uniform lowercase              |
//!
//! Both sources color every letter by the configured color weights.

use fl_core::{ContentConfig, SimRng};
use fl_stock::Letter;

use crate::{SimError, SimResult};

/// Strategy for generating ordered words and stock letters.
pub trait ContentSource {
    /// Registry name of this source.
    fn name(&self) -> &str;

    /// Letters of the next word to order.  Never empty.
    fn next_word(&mut self, rng: &mut SimRng) -> Vec<Letter>;

    /// One letter drawn from this source's letter distribution.
    fn random_letter(&mut self, rng: &mut SimRng) -> Letter;
}

/// Build the source named by `cfg.source`.
pub fn from_config(cfg: &ContentConfig) -> SimResult<Box<dyn ContentSource>> {
    let palette = Palette::new(&cfg.color_weights)?;
    match cfg.source.as_str() {
        "dictionary" => Ok(Box::new(DictionarySource::new(&cfg.words, palette)?)),
        "alphabet" => Ok(Box::new(AlphabetSource::new(cfg.word_length, palette)?)),
        other => Err(SimError::Content(format!("unknown content source `{other}`"))),
    }
}

// ── Palette ───────────────────────────────────────────────────────────────────

/// Color distribution shared by the built-in sources.
#[derive(Clone, Debug)]
pub struct Palette {
    weights: Vec<f32>,
}

impl Palette {
    pub fn new(weights: &[f32]) -> SimResult<Self> {
        if weights.is_empty() || weights.len() > usize::from(u8::MAX) + 1 {
            return Err(SimError::Content(format!("{} letter colors configured", weights.len())));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SimError::Content("color weights must be finite and non-negative".into()));
        }
        Ok(Self { weights: weights.to_vec() })
    }

    pub fn colors(&self) -> usize {
        self.weights.len()
    }

    pub fn color(&self, rng: &mut SimRng) -> u8 {
        rng.weighted_index(&self.weights).map_or(0, |i| i as u8)
    }
}

// ── Dictionary ────────────────────────────────────────────────────────────────

/// Orders words from a fixed list.
#[derive(Clone, Debug)]
pub struct DictionarySource {
    words: Vec<Vec<char>>,
    /// Every character of every word, for frequency-weighted letters.
    pool: Vec<char>,
    palette: Palette,
}

impl DictionarySource {
    pub fn new(words: &[String], palette: Palette) -> SimResult<Self> {
        let words: Vec<Vec<char>> = words.iter().map(|w| w.trim().chars().collect()).collect();
        if words.is_empty() {
            return Err(SimError::Content("the dictionary is empty".into()));
        }
        if words.iter().any(Vec::is_empty) {
            return Err(SimError::Content("the dictionary contains an empty word".into()));
        }
        let pool = words.iter().flatten().copied().collect();
        Ok(Self { words, pool, palette })
    }
}

impl ContentSource for DictionarySource {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn next_word(&mut self, rng: &mut SimRng) -> Vec<Letter> {
        let chars = rng.choose(&self.words).cloned().unwrap_or_default();
        chars.into_iter().map(|ch| Letter::new(ch, self.palette.color(rng))).collect()
    }

    fn random_letter(&mut self, rng: &mut SimRng) -> Letter {
        let ch = rng.choose(&self.pool).copied().unwrap_or('a');
        Letter::new(ch, self.palette.color(rng))
    }
}

// ── Alphabet ──────────────────────────────────────────────────────────────────

/// Orders random strings of lowercase letters.
#[derive(Clone, Debug)]
pub struct AlphabetSource {
    word_length: usize,
    palette: Palette,
}

impl AlphabetSource {
    pub fn new(word_length: usize, palette: Palette) -> SimResult<Self> {
        if word_length == 0 {
            return Err(SimError::Content("alphabet word length must be non-zero".into()));
        }
        Ok(Self { word_length, palette })
    }
}

impl ContentSource for AlphabetSource {
    fn name(&self) -> &str {
        "alphabet"
    }

    fn next_word(&mut self, rng: &mut SimRng) -> Vec<Letter> {
        (0..self.word_length).map(|_| self.random_letter(rng)).collect()
    }

    fn random_letter(&mut self, rng: &mut SimRng) -> Letter {
        let ch = rng.gen_range('a'..='z');
        Letter::new(ch, self.palette.color(rng))
    }
}
