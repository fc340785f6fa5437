//! Intermediate match results and per-segment outcomes.

use jimaku_transcript::{SearchWindow, Segment, WordToken};
use serde::Serialize;

/// Result of one probe + score cycle that a realigner may accept.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Matched probe text.
    pub text: String,
    /// Aligned word tokens; their span is the only source of final timing.
    pub words: Vec<WordToken>,
    pub similarity: f64,
    /// Window that was probed to produce this candidate.
    pub window: SearchWindow,
}

impl MatchCandidate {
    /// `(first.start, last.end)` of the aligned tokens.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let first = self.words.first()?;
        let last = self.words.last()?;
        (first.start < last.end).then_some((first.start, last.end))
    }
}

/// Where a segment ended up after its realigner ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOutcome {
    /// Text too short to probe.
    Skipped,
    /// Original timing confirmed or change too small to apply.
    Verified,
    /// Timing replaced by a better match.
    Adjusted,
    /// No acceptable match; original timing kept.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SegmentReport {
    pub outcome: SegmentOutcome,
    pub probe_failures: usize,
}

impl SegmentReport {
    pub fn new(outcome: SegmentOutcome, probe_failures: usize) -> Self {
        Self {
            outcome,
            probe_failures,
        }
    }
}

pub(crate) fn is_probeable(segment: &Segment) -> bool {
    segment.text.trim().chars().count() >= crate::MIN_TEXT_CHARS
}
