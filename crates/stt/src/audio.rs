//! Decoded audio held in memory for windowed re-transcription.

use std::borrow::Cow;
use std::path::Path;

use crate::{SttError, STT_SAMPLE_RATE};

/// Windows shorter than this (after clamping) are not worth transcribing.
pub const MIN_WINDOW_SECS: f64 = 0.1;

/// Mono 16kHz audio with second-based windowing.
#[derive(Debug, Clone)]
pub struct AudioSource {
    samples: Vec<f32>,
}

impl AudioSource {
    /// Wrap samples recorded at `sample_rate`, resampling to 16kHz if needed.
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> crate::Result<Self> {
        if sample_rate == 0 {
            return Err(SttError::InvalidAudioFormat("sample rate is zero".to_string()));
        }
        Ok(Self {
            samples: resample_linear(samples, sample_rate, STT_SAMPLE_RATE).into_owned(),
        })
    }

    /// Read a WAV file and mix it down to mono 16kHz.
    pub fn from_wav(path: &Path) -> crate::Result<Self> {
        let mut reader = hound::WavReader::open(path).map_err(|source| SttError::AudioRead {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|source| SttError::AudioRead {
                    path: path.to_path_buf(),
                    source,
                })?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(SttError::InvalidAudioFormat(format!(
                        "{} bits per sample",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|source| SttError::AudioRead {
                        path: path.to_path_buf(),
                        source,
                    })?
            }
        };

        let mut mono = Vec::with_capacity(raw.len() / channels);
        for frame in raw.chunks(channels) {
            let sum: f32 = frame.iter().sum();
            mono.push(sum / channels as f32);
        }

        tracing::debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels = channels,
            frames = mono.len(),
            "audio_loaded"
        );

        Self::from_samples(&mono, spec.sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / STT_SAMPLE_RATE as f64
    }

    /// Clamp a window to the valid audio range. Returns `None` when nothing is left.
    pub fn clamp_window(&self, start: f64, end: f64) -> Option<(f64, f64)> {
        let duration = self.duration_secs();
        let start = start.max(0.0).min(duration);
        let end = end.max(0.0).min(duration);
        (end > start).then_some((start, end))
    }

    /// Samples between `start` and `end` seconds, clamped to the audio range.
    pub fn window(&self, start: f64, end: f64) -> &[f32] {
        match self.clamp_window(start, end) {
            Some((start, end)) => {
                let rate = STT_SAMPLE_RATE as f64;
                let from = (start * rate) as usize;
                let to = ((end * rate) as usize).min(self.samples.len());
                &self.samples[from.min(to)..to]
            }
            None => &[],
        }
    }
}

/// Resample audio using linear interpolation.
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Cow<'_, [f32]> {
    if from_rate == to_rate {
        return Cow::Borrowed(samples);
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_idx = i as f64 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = src_idx.fract() as f32;
        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };
        output.push(sample);
    }
    Cow::Owned(output)
}
