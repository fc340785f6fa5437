//! Scripted probe for unit tests: speech is a fixed timeline of utterances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use jimaku_stt::SttError;
use jimaku_transcript::{join_words, SearchWindow, WordToken};

use crate::{Probe, ProbeError, ProbeResult, ProbeSegment};

/// Tokens laid end to end starting at `start`, each `token_secs` long.
pub(crate) fn utterance(tokens: &[&str], start: f64, token_secs: f64) -> Vec<WordToken> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let s = start + i as f64 * token_secs;
            WordToken::new(*t, s, s + token_secs)
        })
        .collect()
}

/// Returns every word lying fully inside the probed window, grouped by utterance.
pub(crate) struct ScriptedProbe {
    utterances: Vec<Vec<WordToken>>,
    failing: bool,
    calls: AtomicUsize,
    windows: Mutex<Vec<SearchWindow>>,
}

impl ScriptedProbe {
    pub fn new(utterances: Vec<Vec<WordToken>>) -> Self {
        Self {
            utterances,
            failing: false,
            calls: AtomicUsize::new(0),
            windows: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<SearchWindow> {
        self.windows.lock().unwrap().clone()
    }
}

impl Probe for ScriptedProbe {
    fn probe(&self, window: SearchWindow) -> Result<ProbeResult, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push(window);
        if self.failing {
            return Err(SttError::TranscriptionFailed("engine offline".to_string()).into());
        }

        let segments: Vec<ProbeSegment> = self
            .utterances
            .iter()
            .filter_map(|words| {
                let inside: Vec<WordToken> = words
                    .iter()
                    .filter(|w| window.contains(w.start, w.end))
                    .cloned()
                    .collect();
                let first = inside.first()?;
                let last = inside.last()?;
                Some(ProbeSegment {
                    text: join_words(&inside),
                    start: first.start,
                    end: last.end,
                    words: inside.clone(),
                })
            })
            .collect();

        let text = segments.iter().map(|s| s.text.as_str()).collect::<String>();
        Ok(ProbeResult { text, segments })
    }
}
