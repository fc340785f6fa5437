//! Fuzzy text matching for transcript realignment.
//!
//! - [`similarity`]: Ratcliff/Obershelp ratio over normalized text
//! - [`align_words`]: best contiguous word span for a target fragment

mod aligner;
mod similarity;

pub use aligner::{align_words, WordMatch};
pub use similarity::{normalize, similarity, STRIPPED_PUNCTUATION};
