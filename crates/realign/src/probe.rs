//! Transcription probe: re-run the speech engine over one bounded audio window.

use std::sync::Arc;

use jimaku_stt::{AudioSource, SttEngine, MIN_WINDOW_SECS};
use jimaku_transcript::{SearchWindow, WordToken};

use crate::error::ProbeError;

/// One sub-segment of a probe result, in absolute seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub words: Vec<WordToken>,
}

/// Fresh transcription of a window. Empty for silence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeResult {
    pub text: String,
    pub segments: Vec<ProbeSegment>,
}

impl ProbeResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.text.trim().is_empty()
    }

    /// All word tokens in time order.
    pub fn words(&self) -> Vec<WordToken> {
        self.segments
            .iter()
            .flat_map(|s| s.words.iter().cloned())
            .collect()
    }
}

/// Re-transcribes arbitrary windows of the source audio.
///
/// Windows may extend past either end of the audio; implementations clamp
/// them. Must be `Sync` so the time-based realigner can probe from workers.
pub trait Probe: Send + Sync {
    fn probe(&self, window: SearchWindow) -> Result<ProbeResult, ProbeError>;
}

/// Probe backed by an [`SttEngine`] over in-memory audio.
pub struct EngineProbe {
    engine: Arc<dyn SttEngine>,
    audio: Arc<AudioSource>,
}

impl EngineProbe {
    pub fn new(engine: Arc<dyn SttEngine>, audio: Arc<AudioSource>) -> Self {
        Self { engine, audio }
    }
}

impl Probe for EngineProbe {
    fn probe(&self, window: SearchWindow) -> Result<ProbeResult, ProbeError> {
        let Some((start, end)) = self.audio.clamp_window(window.start, window.end) else {
            return Ok(ProbeResult::empty());
        };
        if end - start < MIN_WINDOW_SECS {
            return Ok(ProbeResult::empty());
        }

        let samples = self.audio.window(start, end);
        tracing::trace!(
            start = start,
            end = end,
            samples = samples.len(),
            model = %self.engine.model_name(),
            "probe_window"
        );

        let segments = self.engine.transcribe(samples)?;

        let to_abs = |ms: u64| start + ms as f64 / 1000.0;
        let segments: Vec<ProbeSegment> = segments
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| ProbeSegment {
                text: s.text.trim().to_string(),
                start: to_abs(s.start_ms),
                end: to_abs(s.end_ms),
                words: s
                    .words
                    .iter()
                    .map(|w| WordToken::new(w.text.clone(), to_abs(w.start_ms), to_abs(w.end_ms)))
                    .collect(),
            })
            .collect();

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ProbeResult { text, segments })
    }
}
