//! End-to-end realignment over synthetic audio.
//!
//! Speech is encoded directly in the samples: every word is a run of one
//! marker amplitude, and `MarkerEngine` recognizes each complete run. Audio
//! goes through a real WAV file so the whole probe path is exercised.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jimaku_realign::{
    EngineProbe, Probe, ProbeError, ProbeResult, RealignConfig, RealignMethod, Realigner,
};
use jimaku_stt::{AudioSource, Segment as EngineSegment, SttEngine, Word, STT_SAMPLE_RATE};
use jimaku_transcript::{SearchWindow, Segment};

const MARKER_SCALE: f32 = 1000.0;

struct MarkerEngine {
    /// Word text and its full length in samples, indexed by marker - 1.
    lexicon: Vec<(String, usize)>,
    calls: AtomicUsize,
}

impl SttEngine for MarkerEngine {
    fn transcribe(&self, audio: &[f32]) -> jimaku_stt::Result<Vec<EngineSegment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ms = |sample: usize| sample as u64 * 1000 / STT_SAMPLE_RATE as u64;
        let marker = |sample: f32| (sample * MARKER_SCALE).round() as usize;

        let mut words = Vec::new();
        let mut i = 0;
        while i < audio.len() {
            let current = marker(audio[i]);
            let mut j = i + 1;
            while j < audio.len() && marker(audio[j]) == current {
                j += 1;
            }
            if let Some((text, len)) = current.checked_sub(1).and_then(|id| self.lexicon.get(id)) {
                // half-heard words are dropped
                if j - i >= *len {
                    words.push(Word {
                        text: text.clone(),
                        start_ms: ms(i),
                        end_ms: ms(j),
                        confidence: 1.0,
                    });
                }
            }
            i = j;
        }

        let (Some(start_ms), Some(end_ms)) = (
            words.first().map(|w| w.start_ms),
            words.last().map(|w| w.end_ms),
        ) else {
            return Ok(Vec::new());
        };
        Ok(vec![EngineSegment {
            text: words.iter().map(|w| w.text.as_str()).collect(),
            start_ms,
            end_ms,
            words,
        }])
    }

    fn model_name(&self) -> &str {
        "marker"
    }
}

struct Fixture {
    probe: EngineProbe,
    engine: Arc<MarkerEngine>,
}

/// Render `speech` as `(text, start, end)` words into `duration` seconds of
/// audio and load it back from a WAV file.
fn fixture(speech: &[(&str, f64, f64)], duration: f64) -> Fixture {
    let rate = STT_SAMPLE_RATE as f64;
    let mut samples = vec![0.0f32; (duration * rate) as usize];
    let mut lexicon = Vec::new();

    for (id, (text, start, end)) in speech.iter().enumerate() {
        let from = (start * rate) as usize;
        let to = (end * rate) as usize;
        let amplitude = (id + 1) as f32 / MARKER_SCALE;
        samples[from..to].iter_mut().for_each(|s| *s = amplitude);
        lexicon.push((text.to_string(), to - from));
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");
    write_wav(&path, &samples);
    let audio = AudioSource::from_wav(&path).unwrap();

    let engine = Arc::new(MarkerEngine {
        lexicon,
        calls: AtomicUsize::new(0),
    });
    Fixture {
        probe: EngineProbe::new(engine.clone(), Arc::new(audio)),
        engine,
    }
}

fn write_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: STT_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn assert_output_invariants(segments: &[Segment], min_gap: f64) {
    for segment in segments {
        assert!(segment.start < segment.end, "{segment:?}");
    }
    for pair in segments.windows(2) {
        assert!(pair[0].end <= pair[1].start, "{pair:?}");
        assert!(pair[0].gap_to(&pair[1]) >= min_gap - 1e-9, "{pair:?}");
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

fn config(method: RealignMethod) -> RealignConfig {
    RealignConfig {
        method,
        ..Default::default()
    }
}

/// A probe that hears nothing anywhere.
struct Silence;

impl Probe for Silence {
    fn probe(&self, _window: SearchWindow) -> Result<ProbeResult, ProbeError> {
        Ok(ProbeResult::empty())
    }
}

// =============================================================================
// Time-based
// =============================================================================

mod time_based {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ten_second_drift_from_pipeline_config() {
        let fx = fixture(
            &[
                ("これは", 30.0, 31.0),
                ("時間", 31.0, 32.0),
                ("の", 32.0, 33.0),
                ("テスト", 33.0, 34.0),
                ("です", 34.0, 35.0),
            ],
            40.0,
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "output_format": "vtt",
                "timing_realignment": {{
                    "method": "time_based",
                    "time_based": {{ "max_expansion": 20.0, "expansion_attempts": 5 }}
                }}
            }}"#
        )
        .unwrap();
        let config = RealignConfig::load(file.path()).unwrap();

        let mut segments = vec![Segment::new(20.0, 25.0, "これは時間のテストです")];
        let report = Realigner::new(config).unwrap().run(&mut segments, &fx.probe);

        assert_eq!(report.adjusted, 1);
        assert!(fx.engine.calls.load(Ordering::SeqCst) <= 1 + 2 * 5);
        // Only [28, 33] reaches the speech; its words set the boundary.
        assert_close(segments[0].start, 30.0);
        assert_close(segments[0].end, 33.0);
        assert_eq!(segments[0].words.len(), 3);
    }

    #[test]
    fn test_overlap_split_at_word_boundary() {
        let fx = fixture(
            &[
                ("前の", 5.0, 7.0),
                ("文です", 7.0, 10.0),
                ("次の", 10.5, 12.0),
                ("文です", 12.0, 14.0),
            ],
            16.0,
        );
        let mut segments = vec![
            Segment::new(5.0, 10.3, "前の文です"),
            Segment::new(10.1, 14.0, "次の文です"),
        ];

        let report = Realigner::new(config(RealignMethod::TimeBased))
            .unwrap()
            .run(&mut segments, &fx.probe);

        assert_eq!(report.verified, 2);
        assert_eq!(report.overlaps_fixed, 1);
        assert_eq!(report.boundary_fixes, 1);
        assert_output_invariants(&segments, 0.1);
        // split stays inside the original conflict zone
        assert!(segments[0].end >= 10.1 - 1e-9);
        assert!(segments[1].start <= 10.3 + 1e-9);
    }
}

// =============================================================================
// Text search
// =============================================================================

mod text_search {
    use super::*;

    #[test]
    fn test_sequential_drift_correction() {
        let fx = fixture(
            &[
                ("おはよう", 1.0, 1.75),
                ("ございます", 1.75, 2.5),
                ("今日は", 5.0, 5.75),
                ("いい", 5.75, 6.25),
                ("天気", 6.25, 7.0),
                ("です", 7.0, 7.5),
                ("散歩に", 9.0, 9.75),
                ("行きましょう", 9.75, 10.75),
            ],
            12.0,
        );
        let mut segments = vec![
            Segment::new(0.5, 2.0, "おはようございます"),
            Segment::new(3.8, 6.0, "今日はいい天気です"),
            Segment::new(8.5, 10.0, "散歩に行きましょう"),
        ];

        let report = Realigner::new(config(RealignMethod::TextSearch))
            .unwrap()
            .run(&mut segments, &fx.probe);

        assert_eq!(report.adjusted, 3);
        assert_eq!(report.overlaps_fixed, 0);
        assert_output_invariants(&segments, 0.1);

        assert_close(segments[0].start, 1.0);
        assert_close(segments[0].end, 2.5);
        assert_close(segments[1].start, 5.0);
        assert_close(segments[2].start, 9.0);
        assert_close(segments[2].end, 10.75);
        assert_eq!(segments[2].words.len(), 2);
    }
}

// =============================================================================
// Failure isolation
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_silence_everywhere_keeps_timing() {
        for method in [RealignMethod::TimeBased, RealignMethod::TextSearch] {
            let original = vec![
                Segment::new(1.0, 2.0, "テストです"),
                Segment::new(3.0, 4.5, "もう一つの文"),
            ];
            let mut segments = original.clone();

            let report = Realigner::new(config(method))
                .unwrap()
                .run(&mut segments, &Silence);

            assert_eq!(report.adjusted, 0, "{method}");
            assert_eq!(report.rejected, 2, "{method}");
            assert_eq!(report.probe_failures, 0);
            assert_eq!(segments, original);
        }
    }

    #[test]
    fn test_windows_past_the_audio_are_empty_not_errors() {
        let fx = fixture(&[("テスト", 0.5, 1.0)], 2.0);
        let mut segments = vec![Segment::new(10.0, 11.0, "別の文です")];

        let report = Realigner::new(config(RealignMethod::TimeBased))
            .unwrap()
            .run(&mut segments, &fx.probe);

        assert_eq!(report.probe_failures, 0);
        assert_eq!(report.rejected, 1);
        assert_eq!((segments[0].start, segments[0].end), (10.0, 11.0));
    }
}
