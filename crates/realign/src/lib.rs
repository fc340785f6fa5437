//! Timing realignment for machine-generated transcript segments.
//!
//! Corrects drift between a segment's recorded timestamps and where its speech
//! actually occurs by re-probing short audio windows with the speech engine and
//! fuzzy-matching the results against the segment text. Two strategies exist:
//!
//! - text search: sequential, neighbor-aware, widening windows around the segment
//! - time based: per-segment sliding windows, run in parallel batches
//!
//! Either pass is followed by an overlap resolution pass so the returned list is
//! ordered, non-overlapping and spaced by at least `min_gap`.
//!
//! # Example
//!
//! ```ignore
//! use jimaku_realign::{EngineProbe, RealignConfig, Realigner};
//!
//! let config = RealignConfig::load(Path::new("config.json"))?;
//! let probe = EngineProbe::new(engine, Arc::new(AudioSource::from_wav(&media)?));
//! let report = Realigner::new(config)?.run(&mut segments, &probe);
//! ```

mod candidate;
mod config;
mod constants;
mod error;
mod offsets;
mod orchestrator;
mod overlap;
mod probe;
mod text_search;
mod time_based;

#[cfg(test)]
mod test_support;

pub use candidate::{MatchCandidate, SegmentOutcome};
pub use config::{RealignConfig, RealignMethod, TextSearchConfig, TimeBasedConfig};
pub use constants::*;
pub use error::{ConfigError, ProbeError};
pub use offsets::expansion_offsets;
pub use orchestrator::{RealignReport, Realigner};
pub use overlap::{resolve_overlaps, OverlapReport};
pub use probe::{EngineProbe, Probe, ProbeResult, ProbeSegment};
pub use text_search::realign_text_search;
pub use time_based::realign_time_based;
