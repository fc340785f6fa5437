//! Transcript data model shared by the realignment stages.
//!
//! All times are in seconds relative to the start of the source audio.

use serde::{Deserialize, Serialize};

/// Smallest timestamped unit produced by the speech engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A timestamped transcript span.
///
/// `start < end` holds for every segment handed in and out of a realignment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<WordToken>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }

    /// Signed distance from this segment's end to `next`'s start.
    /// Negative when the two overlap.
    pub fn gap_to(&self, next: &Segment) -> f64 {
        next.start - self.end
    }

    pub fn window(&self) -> SearchWindow {
        SearchWindow::new(self.start, self.end)
    }
}

/// Audio sub-range used to drive a probe.
///
/// Windows are never copied into a segment's timing directly; final boundaries
/// always come from matched word tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub start: f64,
    pub end: f64,
}

impl SearchWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Grow the window by `padding` on both sides, never starting before zero.
    pub fn padded(&self, padding: f64) -> Self {
        Self::new((self.start - padding).max(0.0), self.end + padding)
    }

    /// Move the window by `offset` seconds keeping its duration.
    /// A window shifted before zero is pinned to zero.
    pub fn shifted(&self, offset: f64) -> Self {
        let duration = self.end - self.start;
        let start = (self.start + offset).max(0.0);
        Self::new(start, start + duration)
    }

    /// Smallest window covering both `self` and `other`.
    pub fn union(&self, other: &SearchWindow) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn contains(&self, start: f64, end: f64) -> bool {
        const TOLERANCE: f64 = 1e-6;
        start >= self.start - TOLERANCE && end <= self.end + TOLERANCE
    }
}

/// Concatenate token texts the way the speech engine emits them.
///
/// Tokens already carry their own leading whitespace when the language uses it.
pub fn join_words(words: &[WordToken]) -> String {
    words.iter().map(|w| w.text.as_str()).collect::<String>().trim().to_string()
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
