//! Word-span alignment: which contiguous run of tokens spells a target text.

use jimaku_transcript::{join_words, WordToken};

use crate::similarity::{normalize, similarity};

/// Stop extending a span once its text is this much longer than the target.
const MAX_LENGTH_RATIO: f64 = 1.5;

/// Best-matching contiguous token span.
#[derive(Debug, Clone, PartialEq)]
pub struct WordMatch {
    /// Index of the first matched token.
    pub first: usize,
    /// Index of the last matched token (inclusive).
    pub last: usize,
    /// `words[first].start`
    pub start: f64,
    /// `words[last].end`
    pub end: f64,
    pub similarity: f64,
    pub text: String,
}

impl WordMatch {
    pub fn tokens<'a>(&self, words: &'a [WordToken]) -> &'a [WordToken] {
        &words[self.first..=self.last]
    }
}

/// Find the contiguous sub-sequence of `words` whose text best matches `target`.
///
/// Spans from each starting token grow until their normalized text exceeds
/// 1.5× the target's length, which bounds the search at O(n·k) comparisons.
/// Ties keep the earliest, shortest span. Returns `None` when there is nothing
/// to match or no span shares any text with the target.
pub fn align_words(target: &str, words: &[WordToken]) -> Option<WordMatch> {
    let target_len = normalize(target).chars().count();
    if target_len == 0 || words.is_empty() {
        return None;
    }
    let max_len = target_len as f64 * MAX_LENGTH_RATIO;

    let mut best: Option<(usize, usize, f64)> = None;

    'outer: for first in 0..words.len() {
        let mut combined = String::new();
        let mut combined_len = 0usize;

        for last in first..words.len() {
            let token = &words[last].text;
            combined.push_str(token);
            combined_len += normalize(token).chars().count();

            let score = similarity(target, &combined);
            if score > best.map_or(0.0, |(_, _, s)| s) {
                best = Some((first, last, score));
                if score >= 1.0 {
                    break 'outer;
                }
            }

            if combined_len as f64 > max_len {
                break;
            }
        }
    }

    best.map(|(first, last, score)| WordMatch {
        first,
        last,
        start: words[first].start,
        end: words[last].end,
        similarity: score,
        text: join_words(&words[first..=last]),
    })
}
