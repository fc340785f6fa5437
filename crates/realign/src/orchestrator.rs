//! Realignment entry point: run the configured pass, then resolve overlaps.

use jimaku_transcript::Segment;
use serde::Serialize;

use crate::candidate::{SegmentOutcome, SegmentReport};
use crate::config::{RealignConfig, RealignMethod};
use crate::error::ConfigError;
use crate::overlap::resolve_overlaps;
use crate::probe::Probe;
use crate::{text_search, time_based};

/// Summary of one realignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RealignReport {
    /// `None` when realignment is disabled.
    pub method: Option<RealignMethod>,
    pub total: usize,
    pub adjusted: usize,
    pub verified: usize,
    pub rejected: usize,
    pub skipped: usize,
    /// Probe calls that raised, across both passes.
    pub probe_failures: usize,
    pub overlaps_fixed: usize,
    pub boundary_fixes: usize,
    pub midpoint_fallbacks: usize,
}

impl RealignReport {
    fn tally(&mut self, reports: &[SegmentReport]) {
        for report in reports {
            match report.outcome {
                SegmentOutcome::Adjusted => self.adjusted += 1,
                SegmentOutcome::Verified => self.verified += 1,
                SegmentOutcome::Rejected => self.rejected += 1,
                SegmentOutcome::Skipped => self.skipped += 1,
            }
            self.probe_failures += report.probe_failures;
        }
    }
}

/// Holds a validated configuration and runs realignment passes with it.
#[derive(Debug, Clone)]
pub struct Realigner {
    config: RealignConfig,
}

impl Realigner {
    pub fn new(config: RealignConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Realign `segments` in place.
    ///
    /// Never fails: probe errors are absorbed per segment or per conflict and
    /// show up only in the report. The overlap pass always runs last, on the
    /// fully corrected list.
    pub fn run(&self, segments: &mut [Segment], probe: &dyn Probe) -> RealignReport {
        let config = &self.config;
        if !config.enable {
            tracing::debug!("Timing realignment disabled");
            return RealignReport::default();
        }

        let mut report = RealignReport {
            method: Some(config.method),
            total: segments.len(),
            ..Default::default()
        };

        tracing::info!(
            segments = segments.len(),
            method = %config.method,
            min_gap = config.min_gap,
            "Starting timing realignment"
        );

        let outcomes = match config.method {
            RealignMethod::TextSearch => {
                text_search::run_sequential(segments, probe, &config.text_search, config.min_gap)
            }
            RealignMethod::TimeBased => {
                time_based::run_batches(segments, probe, &config.time_based, config.batch_size)
            }
        };
        report.tally(&outcomes);

        let overlaps = resolve_overlaps(segments, probe, config.min_gap);
        report.overlaps_fixed = overlaps.conflicts;
        report.boundary_fixes = overlaps.boundary_fixes;
        report.midpoint_fallbacks = overlaps.midpoint_fallbacks;
        report.probe_failures += overlaps.probe_failures;

        tracing::info!(
            total = report.total,
            adjusted = report.adjusted,
            verified = report.verified,
            rejected = report.rejected,
            skipped = report.skipped,
            overlaps_fixed = report.overlaps_fixed,
            probe_failures = report.probe_failures,
            "Timing realignment complete"
        );

        report
    }
}
