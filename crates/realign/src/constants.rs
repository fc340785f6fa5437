/// Segments with fewer trimmed characters than this are never probed.
pub const MIN_TEXT_CHARS: usize = 2;

/// Smallest shift tried by the sliding-window search (seconds).
pub const MIN_SHIFT_SECS: f64 = 0.5;

/// Maximum number of adjacent probe sub-segments combined into one candidate.
pub const MAX_COMBINED_SEGMENTS: usize = 5;

/// Stop growing a candidate once its text exceeds this multiple of the target length.
pub const MAX_LENGTH_RATIO: f64 = 1.5;

/// A candidate this similar is taken without scoring the rest.
pub const NEAR_CERTAIN_SIMILARITY: f64 = 0.9;

/// Stop trying further start positions once the best candidate reaches this.
pub const GOOD_ENOUGH_SIMILARITY: f64 = 0.85;

/// Below this, sub-segment matching gives way to word-level matching.
pub const SEGMENT_MATCH_FLOOR: f64 = 0.6;

/// Minimum average similarity for a word-based split between two neighbors.
pub const MIN_SPLIT_SCORE: f64 = 0.5;

/// Gaps within this distance of `min_gap` count as conforming.
pub const GAP_TOLERANCE: f64 = 1e-6;

/// Shortest duration a segment may be squeezed to while resolving a conflict.
pub const MIN_SEGMENT_SECS: f64 = 0.01;
