use std::path::Path;

use crate::AudioSource;

/// A word as reported by the engine, relative to the start of the transcribed audio.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub confidence: f32,
}

/// An engine-level segment, relative to the start of the transcribed audio.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub words: Vec<Word>,
}

/// Standard sample rate for STT processing.
pub const STT_SAMPLE_RATE: u32 = 16000;

/// Speech recognition engine used for re-probing short audio windows.
///
/// Implementations must return an empty list (not an error) for silence.
pub trait SttEngine: Send + Sync {
    /// Transcribe audio samples (expected at 16kHz mono) with word timestamps.
    fn transcribe(&self, audio: &[f32]) -> crate::Result<Vec<Segment>>;

    /// Transcribe an audio file directly.
    ///
    /// Default implementation loads the WAV file and calls `transcribe()`.
    fn transcribe_file(&self, path: &Path) -> crate::Result<Vec<Segment>> {
        let audio = AudioSource::from_wav(path)?;
        self.transcribe(audio.samples())
    }

    fn model_name(&self) -> &str;
}
