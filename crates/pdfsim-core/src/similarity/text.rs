//! Ratcliff/Obershelp text similarity.
//!
//! Character-level sequence matching: find the longest contiguous
//! common block, recurse on the left and right remainders, and sum the
//! matched lengths. The ratio `2 * M / (len_a + len_b)` is scaled to a
//! percentage with two-decimal precision.
//!
//! The raw recursion is order-dependent: which sequence drives the
//! match search can change the matched total. The metric is required to
//! be symmetric, so arguments are canonicalized (lexicographically
//! smaller sequence first) before matching.

use std::collections::HashMap;

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Text similarity percentage between two character sequences.
///
/// Symmetric, with `text_similarity(t, t) == 100.0` for every `t`.
/// Two empty texts are treated as identical-null (`100.0`); exactly one
/// empty text scores `0.0`.
///
/// # Examples
///
/// ```
/// use pdfsim_core::similarity::text_similarity;
///
/// assert_eq!(text_similarity("hello world", "hello world"), 100.0);
/// assert_eq!(text_similarity("hello world", ""), 0.0);
/// ```
#[must_use]
pub fn text_similarity(text_a: &str, text_b: &str) -> f64 {
    if text_a.is_empty() && text_b.is_empty() {
        return 100.0;
    }
    if text_a.is_empty() || text_b.is_empty() {
        return 0.0;
    }

    // Canonical argument order makes the score symmetric.
    let (first, second) = if text_a <= text_b {
        (text_a, text_b)
    } else {
        (text_b, text_a)
    };
    let a: Vec<char> = first.chars().collect();
    let b: Vec<char> = second.chars().collect();

    let matched = matched_length(&a, &b);
    let ratio = 2.0 * matched as f64 / (a.len() + b.len()) as f64;
    round2(ratio * 100.0)
}

/// Total length of the longest-matching-block decomposition.
fn matched_length(a: &[char], b: &[char]) -> usize {
    // Positions of every character of `b`, in ascending order.
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest contiguous matching block within `a[alo..ahi]` and
/// `b[blo..bhi]`.
///
/// Ties break toward the earliest start in `a`, then the earliest start
/// in `b`; a candidate replaces the current best only when strictly
/// longer.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // j2len[j] = length of the longest match ending at a[i], b[j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, &ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut new_j2len = HashMap::new();
        if let Some(positions) = b2j.get(&ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev).copied())
                    .unwrap_or(0)
                    + 1;
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }
    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_100() {
        assert_eq!(text_similarity("hello world", "hello world"), 100.0);
        assert_eq!(text_similarity("a", "a"), 100.0);
    }

    #[test]
    fn both_empty_is_identical_null() {
        assert_eq!(text_similarity("", ""), 100.0);
    }

    #[test]
    fn one_empty_scores_zero() {
        assert_eq!(text_similarity("hello", ""), 0.0);
        assert_eq!(text_similarity("", "hello"), 0.0);
    }

    #[test]
    fn symmetric_for_all_argument_orders() {
        let pairs = [
            ("hello world", "goodbye"),
            ("abcd", "bcde"),
            ("the quick brown fox", "the slow brown dog"),
            ("aaaa", "aa"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                text_similarity(a, b),
                text_similarity(b, a),
                "asymmetric for {a:?} / {b:?}"
            );
        }
    }

    #[test]
    fn hello_world_vs_goodbye() {
        // Canonical order matches "goodbye" against "hello world":
        // three single-character blocks (o, o, d), 2*3/18 = 33.33%.
        assert_eq!(text_similarity("hello world", "goodbye"), 33.33);
    }

    #[test]
    fn common_block_ratio() {
        // "bcd" is the longest common block: 2*3/8 = 75%.
        assert_eq!(text_similarity("abcd", "bcde"), 75.0);
    }

    #[test]
    fn disjoint_alphabets_score_zero() {
        assert_eq!(text_similarity("aaaa", "bbbb"), 0.0);
    }

    #[test]
    fn sensitive_to_reordering() {
        let verbatim = text_similarity("one two three four", "one two three four");
        let reordered = text_similarity("one two three four", "four three two one");
        assert_eq!(verbatim, 100.0);
        assert!(reordered < verbatim);
    }

    #[test]
    fn multibyte_characters_compare_per_char() {
        assert_eq!(text_similarity("héllo", "héllo"), 100.0);
        assert!(text_similarity("héllo", "hello") < 100.0);
    }
}
