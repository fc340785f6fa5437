//! Time-based realignment: verify each segment in place, then slide a
//! same-sized window backward and forward until the text is found.
//!
//! Segments are independent, so each batch runs on scoped worker threads that
//! own disjoint `&mut Segment` slots.

use std::thread;

use jimaku_matching::{align_words, similarity};
use jimaku_transcript::{format_timestamp, SearchWindow, Segment};

use crate::candidate::{is_probeable, MatchCandidate, SegmentOutcome, SegmentReport};
use crate::config::TimeBasedConfig;
use crate::offsets::expansion_offsets;
use crate::probe::{Probe, ProbeResult};
use crate::MIN_SHIFT_SECS;

/// Run the time-based pass over `segments` in batches of `batch_size`.
///
/// Every batch is joined before the next starts, so at most `batch_size`
/// probes are in flight and the list is fully updated when this returns.
pub fn realign_time_based(
    segments: &mut [Segment],
    probe: &dyn Probe,
    config: &TimeBasedConfig,
    batch_size: usize,
) -> Vec<SegmentOutcome> {
    run_batches(segments, probe, config, batch_size)
        .into_iter()
        .map(|r| r.outcome)
        .collect()
}

pub(crate) fn run_batches(
    segments: &mut [Segment],
    probe: &dyn Probe,
    config: &TimeBasedConfig,
    batch_size: usize,
) -> Vec<SegmentReport> {
    let batch_size = batch_size.max(1);
    let total = segments.len();
    let total_batches = total.div_ceil(batch_size);
    let mut reports = Vec::with_capacity(total);

    for (batch_idx, batch) in segments.chunks_mut(batch_size).enumerate() {
        let first_index = batch_idx * batch_size;
        tracing::debug!(
            batch = batch_idx + 1,
            total_batches = total_batches,
            first_segment = first_index + 1,
            size = batch.len(),
            "time_based_batch"
        );

        let batch_reports: Vec<SegmentReport> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter_mut()
                .enumerate()
                .map(|(offset, segment)| {
                    let index = first_index + offset;
                    scope.spawn(move || verify_segment(index, segment, probe, config))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        tracing::error!("Realignment worker panicked, keeping original timing");
                        SegmentReport::new(SegmentOutcome::Rejected, 1)
                    })
                })
                .collect()
        });

        reports.extend(batch_reports);
    }

    reports
}

/// Verify one segment and move it if a better-matching window is found.
///
/// The in-place similarity `s0` is the baseline: a candidate is accepted only
/// if it beats `s0`, even when it stays below the threshold. Without a
/// baseline there is nothing to beat, so a failed in-place probe keeps the
/// original timing.
pub(crate) fn verify_segment(
    index: usize,
    segment: &mut Segment,
    probe: &dyn Probe,
    config: &TimeBasedConfig,
) -> SegmentReport {
    if !is_probeable(segment) {
        return SegmentReport::new(SegmentOutcome::Skipped, 0);
    }

    let mut probe_failures = 0;
    let original = segment.window();

    let initial_similarity = match probe.probe(original) {
        Ok(result) => similarity(&segment.text, &result.text),
        Err(e) => {
            tracing::warn!(
                segment = index + 1,
                error = %e,
                "In-place probe failed, keeping original timing"
            );
            return SegmentReport::new(SegmentOutcome::Rejected, 1);
        }
    };

    if initial_similarity >= config.similarity {
        return SegmentReport::new(SegmentOutcome::Verified, probe_failures);
    }

    let mut best_similarity = initial_similarity;
    let mut best: Option<(SearchWindow, ProbeResult)> = None;
    let offsets = expansion_offsets(MIN_SHIFT_SECS, config.expansion, config.expansion_attempts);

    'search: for offset in offsets {
        // Backward first (segment recorded too late), then forward.
        for window in [original.shifted(-offset), original.shifted(offset)] {
            match probe.probe(window) {
                Ok(result) => {
                    let score = similarity(&segment.text, &result.text);
                    tracing::trace!(
                        segment = index + 1,
                        offset = offset,
                        window_start = window.start,
                        similarity = score,
                        "time_based_candidate"
                    );
                    if score > best_similarity {
                        best_similarity = score;
                        best = Some((window, result));
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        segment = index + 1,
                        offset = offset,
                        error = %e,
                        "Probe failed"
                    );
                    probe_failures += 1;
                }
            }

            if best_similarity >= config.similarity {
                break 'search;
            }
        }
    }

    let Some((window, result)) = best else {
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    };

    let words = result.words();
    let Some(matched) = align_words(&segment.text, &words) else {
        tracing::debug!(segment = index + 1, "Best window has no usable word timestamps");
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    };
    let candidate = MatchCandidate {
        text: matched.text.clone(),
        words: matched.tokens(&words).to_vec(),
        similarity: best_similarity,
        window,
    };
    let Some((start, end)) = candidate.bounds() else {
        return SegmentReport::new(SegmentOutcome::Rejected, probe_failures);
    };

    if start == segment.start && end == segment.end {
        return SegmentReport::new(SegmentOutcome::Verified, probe_failures);
    }

    tracing::debug!(
        segment = index + 1,
        from = %format!("{} --> {}", format_timestamp(segment.start), format_timestamp(segment.end)),
        to = %format!("{} --> {}", format_timestamp(start), format_timestamp(end)),
        initial_similarity = initial_similarity,
        similarity = candidate.similarity,
        "segment_realigned"
    );

    segment.start = start;
    segment.end = end;
    segment.words = candidate.words;

    SegmentReport::new(SegmentOutcome::Adjusted, probe_failures)
}
