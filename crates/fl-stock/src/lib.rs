//! `fl-stock` — what the robots move around: tiles, totes, words, and the
//! stations that fill and empty totes.
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`letter`]  | `Letter` (value), `Tile` (instance), `TileMint`            |
//! | [`tote`]    | `Tote`, `ToteOwner`, `ToteStore`                           |
//! | [`word`]    | `Word`                                                     |
//! | [`station`] | `LetterStation`, `WordStation`, the `Fleet` trait          |
//! | [`error`]   | `StockError`, `StockResult<T>`                             |

pub mod error;
pub mod letter;
pub mod station;
pub mod tote;
pub mod word;


pub use error::{StockError, StockResult};
pub use letter::{Letter, Tile, TileMint};
pub use station::{
    Fleet, LetterRequest, LetterStation, LetterTransfer, StationStats, WordRequest, WordStation,
    WordStationEvent,
};
pub use tote::{Tote, ToteOwner, ToteStore};
pub use word::Word;
