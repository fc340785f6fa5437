mod audio;
mod engine;

pub use audio::{AudioSource, MIN_WINDOW_SECS};
pub use engine::{Segment, SttEngine, Word, STT_SAMPLE_RATE};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SttError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("invalid audio format: {0}")]
    InvalidAudioFormat(String),
    #[error("failed to read audio '{path}': {source}")]
    AudioRead {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

pub type Result<T> = std::result::Result<T, SttError>;
