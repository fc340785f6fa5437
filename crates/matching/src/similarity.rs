//! Text similarity based on Ratcliff/Obershelp pattern matching.

use std::collections::HashMap;

/// Characters removed before comparison, alongside all whitespace.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '、', '。', '！', '？', '，', '．', ',', '.', '!', '?',
];

/// Strip whitespace and sentence-ending/comma punctuation.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_PUNCTUATION.contains(c))
        .collect()
}

/// Similarity ratio in `[0, 1]` between two texts after normalization.
///
/// Two empty texts are identical (`1.0`); an empty text never matches a
/// non-empty one (`0.0`). The longest-block recursion depends on argument
/// order when blocks tie, so both orders are scored and the larger ratio wins.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    ratio(&a, &b).max(ratio(&b, &a))
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let matched = SequenceMatcher::new(a, b).matched_len();
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Longest-matching-block recursion without junk heuristics.
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges.
    /// Ties resolve to the smallest `i`, then the smallest `j`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let mut best = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best.2 {
                        best = (i + 1 - k, j + 1 - k, k);
                    }
                }
            }
            j2len = next_j2len;
        }

        best
    }

    /// Total size of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }
}
