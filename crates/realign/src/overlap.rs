//! Overlap resolution: the final pass that restores ordering and `min_gap`
//! spacing between adjacent segments.

use jimaku_matching::similarity;
use jimaku_transcript::{format_timestamp, join_words, Segment};
use serde::Serialize;

use crate::error::ProbeError;
use crate::probe::Probe;
use crate::{GAP_TOLERANCE, MIN_SEGMENT_SECS, MIN_SPLIT_SCORE};

/// Counters for one overlap pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    /// Adjacent pairs that overlapped or sat closer than `min_gap`.
    pub conflicts: usize,
    /// Conflicts split at a word boundary found by probing.
    pub boundary_fixes: usize,
    /// Conflicts split arithmetically around the midpoint.
    pub midpoint_fallbacks: usize,
    /// Conflicts where the next segment had to be moved whole.
    pub pushes: usize,
    pub probe_failures: usize,
}

/// Fix every adjacent pair closer than `min_gap`, left to right.
///
/// Only the end of the earlier segment and the start of the later one move,
/// except for the last-resort push which shifts the later segment whole.
/// A list that already conforms is left untouched and nothing is probed.
pub fn resolve_overlaps(segments: &mut [Segment], probe: &dyn Probe, min_gap: f64) -> OverlapReport {
    let mut report = OverlapReport::default();
    // never tolerate actual overlap
    let tolerance = GAP_TOLERANCE.min(min_gap.max(0.0));

    for i in 1..segments.len() {
        let (head, tail) = segments.split_at_mut(i);
        let prev = &mut head[i - 1];
        let next = &mut tail[0];

        if prev.gap_to(next) >= min_gap - tolerance {
            continue;
        }
        report.conflicts += 1;

        let original = (prev.end, next.start);
        let boundary = match find_boundary(prev, next, probe) {
            Ok(center) => center,
            Err(e) => {
                tracing::warn!(pair = i, error = %e, "Boundary probe failed, splitting at midpoint");
                report.probe_failures += 1;
                None
            }
        };

        if boundary.is_some_and(|center| apply_split(prev, next, center, min_gap)) {
            report.boundary_fixes += 1;
        } else if split_at_midpoint(prev, next, min_gap) {
            report.midpoint_fallbacks += 1;
        } else {
            push_right(prev, next, min_gap);
            report.pushes += 1;
            tracing::warn!(
                pair = i,
                start = %format_timestamp(next.start),
                "Segment pushed right to clear overlap"
            );
        }

        tracing::debug!(
            pair = i,
            from = %format!("{} | {}", format_timestamp(original.0), format_timestamp(original.1)),
            to = %format!("{} | {}", format_timestamp(prev.end), format_timestamp(next.start)),
            "overlap_resolved"
        );
    }

    report
}

/// Probe the union of both segments and find the token boundary that best
/// partitions the words between them.
///
/// Returns the middle of the gap between the last word of `prev` and the first
/// word of `next`, or `None` when no partition averages [`MIN_SPLIT_SCORE`].
fn find_boundary(prev: &Segment, next: &Segment, probe: &dyn Probe) -> Result<Option<f64>, ProbeError> {
    let result = probe.probe(prev.window().union(&next.window()))?;
    let words = result.words();
    if words.len() < 2 {
        return Ok(None);
    }

    let mut best: Option<(usize, f64)> = None;
    for k in 1..words.len() {
        let left = similarity(&prev.text, &join_words(&words[..k]));
        let right = similarity(&next.text, &join_words(&words[k..]));
        let score = (left + right) / 2.0;
        tracing::trace!(split = k, score = score, "overlap_split_candidate");
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((k, score));
        }
    }

    Ok(best
        .filter(|(_, score)| *score >= MIN_SPLIT_SCORE)
        .map(|(k, _)| (words[k - 1].end + words[k].start) / 2.0))
}

/// Place both boundaries `gap / 2` around `center`. Refuses if either
/// segment would invert.
fn apply_split(prev: &mut Segment, next: &mut Segment, center: f64, gap: f64) -> bool {
    let end = center - gap / 2.0;
    let start = center + gap / 2.0;
    if end <= prev.start || start >= next.end {
        return false;
    }

    prev.end = end;
    next.start = start;
    prev.words.retain(|w| w.end <= end);
    next.words.retain(|w| w.start >= start);
    true
}

/// Split at the midpoint of the conflict, or as close to it as both segments
/// allow.
fn split_at_midpoint(prev: &mut Segment, next: &mut Segment, gap: f64) -> bool {
    let midpoint = (prev.end + next.start) / 2.0;
    if apply_split(prev, next, midpoint, gap) {
        return true;
    }

    let lo = prev.start + gap / 2.0 + MIN_SEGMENT_SECS;
    let hi = next.end - gap / 2.0 - MIN_SEGMENT_SECS;
    lo <= hi && apply_split(prev, next, midpoint.clamp(lo, hi), gap)
}

fn push_right(prev: &Segment, next: &mut Segment, gap: f64) {
    let duration = next.duration().max(MIN_SEGMENT_SECS);
    next.start = prev.end + gap;
    next.end = next.start + duration;
    next.words.clear();
}
