//! Approximate title matching.
//!
//! Maps noisy, user-typed titles to canonical catalog titles. The
//! similarity function is pluggable: anything that scores a pair of
//! strings in [0, 1] works, with `strsim::normalized_levenshtein` as the
//! default.

use tracing::debug;

/// Score a pair of strings in [0, 1], 1 meaning identical.
pub type SimilarityFn = fn(&str, &str) -> f64;

/// Default acceptance threshold: a candidate must be at least this
/// similar to the input to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Fuzzy matcher over a fixed candidate universe.
#[derive(Clone)]
pub struct TitleMatcher {
    similarity: SimilarityFn,
    threshold: f64,
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self {
            similarity: normalized_levenshtein,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TitleMatcher {
    /// Create a matcher with a custom similarity function and threshold.
    pub fn new(similarity: SimilarityFn, threshold: f64) -> Self {
        Self {
            similarity,
            threshold,
        }
    }

    /// Find the best-matching candidate for an input title.
    ///
    /// Returns the index of the single best match if its score clears
    /// the threshold, `None` otherwise. Ties keep the earliest candidate
    /// in iteration order, so results are deterministic for a fixed
    /// candidate list. A miss is an expected outcome, not an error.
    pub fn resolve<'a, I>(&self, input: &str, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(usize, f64)> = None;
        for (idx, candidate) in candidates.into_iter().enumerate() {
            let score = (self.similarity)(input, candidate);
            // Strict > keeps the first candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score >= self.threshold => Some(idx),
            Some((_, score)) => {
                debug!("No match for '{}' (best score {:.2})", input, score);
                None
            }
            None => None,
        }
    }
}
