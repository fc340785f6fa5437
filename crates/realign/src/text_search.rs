//! Text-search realignment: look for the segment text inside widening windows
//! around its recorded position.
//!
//! Runs strictly in order on one thread. Each accepted boundary is clamped
//! against the previous segment's already-committed end and the next
//! segment's start.

use jimaku_matching::{align_words, normalize, similarity};
use jimaku_transcript::{format_timestamp, SearchWindow, Segment, WordToken};

use crate::candidate::{is_probeable, MatchCandidate, SegmentOutcome, SegmentReport};
use crate::config::TextSearchConfig;
use crate::offsets::expansion_offsets;
use crate::probe::{Probe, ProbeResult};
use crate::{
    GOOD_ENOUGH_SIMILARITY, MAX_COMBINED_SEGMENTS, MAX_LENGTH_RATIO, NEAR_CERTAIN_SIMILARITY,
    SEGMENT_MATCH_FLOOR,
};

/// Run the text-search pass over `segments` in order.
pub fn realign_text_search(
    segments: &mut [Segment],
    probe: &dyn Probe,
    config: &TextSearchConfig,
    min_gap: f64,
) -> Vec<SegmentOutcome> {
    run_sequential(segments, probe, config, min_gap)
        .into_iter()
        .map(|r| r.outcome)
        .collect()
}

pub(crate) fn run_sequential(
    segments: &mut [Segment],
    probe: &dyn Probe,
    config: &TextSearchConfig,
    min_gap: f64,
) -> Vec<SegmentReport> {
    (0..segments.len())
        .map(|index| realign_segment(index, segments, probe, config, min_gap))
        .collect()
}

fn realign_segment(
    index: usize,
    segments: &mut [Segment],
    probe: &dyn Probe,
    config: &TextSearchConfig,
    min_gap: f64,
) -> SegmentReport {
    let segment = &segments[index];
    if !is_probeable(segment) {
        return SegmentReport::new(SegmentOutcome::Skipped, 0);
    }

    let mut probe_failures = 0;
    let mut best: Option<MatchCandidate> = None;

    for padding in expansion_offsets(config.padding, config.expansion, config.expansion_attempts) {
        if best
            .as_ref()
            .is_some_and(|c| c.similarity >= config.similarity)
        {
            break;
        }

        let window = segment.window().padded(padding);
        let result = match probe.probe(window) {
            Ok(result) => result,
            Err(e) => {
                if probe_failures == 0 {
                    tracing::warn!(segment = index + 1, error = %e, "Re-transcription failed");
                }
                probe_failures += 1;
                continue;
            }
        };

        if let Some(candidate) = find_text(&segment.text, &result, window) {
            tracing::trace!(
                segment = index + 1,
                padding = padding,
                similarity = candidate.similarity,
                "text_search_candidate"
            );
            if candidate.similarity > best.as_ref().map_or(0.0, |c| c.similarity) {
                best = Some(candidate);
            }
        }
    }

    let Some(candidate) = best.filter(|c| c.similarity >= config.similarity) else {
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    };
    let Some((mut start, mut end)) = candidate.bounds() else {
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    };

    if (start - segment.start).abs() < config.adjustment_threshold
        && (end - segment.end).abs() < config.adjustment_threshold
    {
        return SegmentReport::new(SegmentOutcome::Verified, probe_failures);
    }

    if index > 0 {
        start = start.max(segments[index - 1].end + min_gap);
    }
    if let Some(next) = segments.get(index + 1) {
        end = end.min(next.start - min_gap);
    }
    if end <= start {
        tracing::debug!(
            segment = index + 1,
            "Match collides with neighbors, keeping original timing"
        );
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    }

    let segment = &mut segments[index];
    tracing::debug!(
        segment = index + 1,
        from = %format!("{} --> {}", format_timestamp(segment.start), format_timestamp(segment.end)),
        to = %format!("{} --> {}", format_timestamp(start), format_timestamp(end)),
        similarity = candidate.similarity,
        "segment_realigned"
    );

    segment.start = start;
    segment.end = end;
    segment.words = candidate
        .words
        .into_iter()
        .filter(|w| w.start >= start && w.end <= end)
        .collect();
    if config.replace_text && !candidate.text.is_empty() {
        segment.text = candidate.text;
    }

    SegmentReport::new(SegmentOutcome::Adjusted, probe_failures)
}

/// Locate `target` inside one probe result.
///
/// Candidates are runs of up to [`MAX_COMBINED_SEGMENTS`] adjacent
/// sub-segments. When no run reaches [`SEGMENT_MATCH_FLOOR`] the search falls
/// back to word-level alignment over every probed word. Either way the
/// candidate is scored by its aligned word span, since that span is what
/// sets the timing.
pub(crate) fn find_text(
    target: &str,
    result: &ProbeResult,
    window: SearchWindow,
) -> Option<MatchCandidate> {
    let target_len = normalize(target).chars().count();
    if target_len == 0 || result.segments.is_empty() {
        return None;
    }
    let max_len = target_len as f64 * MAX_LENGTH_RATIO;
    let segments = &result.segments;

    let mut best: Option<(usize, usize, f64)> = None;
    let best_score = |best: &Option<(usize, usize, f64)>| best.map_or(0.0, |(_, _, s)| s);

    'outer: for first in 0..segments.len() {
        let mut combined = String::new();
        let end_limit = (first + MAX_COMBINED_SEGMENTS).min(segments.len());

        for last in first..end_limit {
            combined.push_str(segments[last].text.trim());
            let score = similarity(target, &combined);

            if score > best_score(&best) {
                best = Some((first, last, score));
            }
            if score >= NEAR_CERTAIN_SIMILARITY {
                break 'outer;
            }
            if normalize(&combined).chars().count() as f64 > max_len {
                break;
            }
        }

        if best_score(&best) >= GOOD_ENOUGH_SIMILARITY {
            break;
        }
    }

    if let Some((first, last, score)) = best.filter(|b| b.2 >= SEGMENT_MATCH_FLOOR) {
        let words: Vec<WordToken> = segments[first..=last]
            .iter()
            .flat_map(|s| s.words.iter().cloned())
            .collect();
        if let Some(matched) = align_words(target, &words) {
            return Some(MatchCandidate {
                text: matched.text.clone(),
                words: matched.tokens(&words).to_vec(),
                similarity: matched.similarity,
                window,
            });
        }
    }

    let words = result.words();
    let matched = align_words(target, &words)?;
    if matched.similarity < SEGMENT_MATCH_FLOOR {
        return None;
    }
    Some(MatchCandidate {
        text: matched.text.clone(),
        words: matched.tokens(&words).to_vec(),
        similarity: matched.similarity,
        window,
    })
}
