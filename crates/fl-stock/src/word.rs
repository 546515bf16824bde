//! Words awaiting assembly at word stations.

use std::fmt;

use fl_core::WordId;

use crate::letter::Letter;

#[derive(Clone, Debug)]
pub struct Word {
    pub id: WordId,
    letters: Vec<Letter>,
    filled: Vec<bool>,
}

impl Word {
    pub fn new(id: WordId, letters: Vec<Letter>) -> Self {
        let filled = vec![false; letters.len()];
        Self { id, letters, filled }
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Fill the first unfilled position matching `letter`.  `false` when no
    /// such position is left.
    pub fn add_letter(&mut self, letter: Letter) -> bool {
        for (l, done) in self.letters.iter().zip(self.filled.iter_mut()) {
            if !*done && *l == letter {
                *done = true;
                return true;
            }
        }
        false
    }

    /// `true` if an unfilled position would accept `letter`.
    pub fn accepts(&self, letter: Letter) -> bool {
        self.letters.iter().zip(&self.filled).any(|(l, done)| !done && *l == letter)
    }

    pub fn is_completed(&self) -> bool {
        self.filled.iter().all(|f| *f)
    }

    /// Letters still missing, in word order.
    pub fn needed(&self) -> impl Iterator<Item = Letter> + '_ {
        self.letters.iter().zip(&self.filled).filter(|(_, f)| !**f).map(|(l, _)| *l)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in &self.letters {
            write!(f, "{}", l.ch)?;
        }
        Ok(())
    }
}
