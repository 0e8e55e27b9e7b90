//! Content-based similarity: TF-IDF over genre tokens plus a dense
//! pairwise cosine matrix, and the scorer that ranks the whole catalog
//! from a user's weighted preferences.

use crate::matcher::TitleMatcher;
use crate::types::Preference;
use catalog::Catalog;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Dense, symmetric N×N cosine-similarity matrix over the catalog,
/// indexed by catalog row position.
///
/// Entries are in [0, 1] with self-similarity exactly 1. Built once per
/// catalog snapshot; O(N²) memory, acceptable because N is bounded
/// (tens of thousands, not millions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build the matrix from the catalog's genre lists.
    ///
    /// Each movie becomes a TF-IDF vector over its genre tokens; the
    /// matrix holds pairwise cosine similarities of those vectors.
    #[instrument(skip(catalog), fields(movies = catalog.len()))]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let vectors = tfidf_vectors(catalog);
        let n = vectors.len();

        // Vectors are unit length, so cosine similarity is a plain dot
        // product over the sparse term maps. Rows are independent and
        // fill in parallel.
        let mut data = vec![0.0f32; n * n];
        data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if i == j {
                    1.0
                } else {
                    sparse_dot(&vectors[i], &vectors[j]).clamp(0.0, 1.0)
                };
            }
        });

        debug!("Built {}x{} content similarity matrix", n, n);
        Self { n, data }
    }

    /// Catalog size this matrix was built for
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity of the movie at `row` to every other movie.
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.n..(row + 1) * self.n]
    }
}

/// One TF-IDF vector as a term-id → weight map. Genre vocabularies are
/// tiny, so sparse maps beat dense vectors here.
type TermVector = HashMap<usize, f32>;

fn sparse_dot(a: &TermVector, b: &TermVector) -> f32 {
    // Iterate the smaller map
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum()
}

/// Build L2-normalized TF-IDF vectors over per-movie genre documents.
///
/// Smoothed IDF: `ln((1 + n) / (1 + df)) + 1`, so terms present in every
/// document still carry weight and empty-vocabulary corner cases cannot
/// produce NaN.
fn tfidf_vectors(catalog: &Catalog) -> Vec<TermVector> {
    let n = catalog.len();

    // Vocabulary and document frequencies
    let mut term_ids: HashMap<String, usize> = HashMap::new();
    let mut doc_freq: Vec<usize> = Vec::new();
    let mut docs: Vec<Vec<usize>> = Vec::with_capacity(n);

    for movie in catalog.movies() {
        let mut doc = Vec::with_capacity(movie.genres.len());
        for genre in &movie.genres {
            let token = genre.to_lowercase();
            let next_id = term_ids.len();
            let id = *term_ids.entry(token).or_insert(next_id);
            if id == doc_freq.len() {
                doc_freq.push(0);
            }
            doc.push(id);
        }
        // Genres are deduplicated upstream, so each term counts once
        for &id in &doc {
            doc_freq[id] += 1;
        }
        docs.push(doc);
    }

    let idf: Vec<f32> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n as f32) / (1.0 + df as f32)).ln() + 1.0)
        .collect();

    docs.into_iter()
        .map(|doc| {
            let mut vector: TermVector = HashMap::with_capacity(doc.len());
            for id in doc {
                *vector.entry(id).or_insert(0.0) += idf[id];
            }
            let norm: f32 = vector.values().map(|w| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for w in vector.values_mut() {
                    *w /= norm;
                }
            }
            vector
        })
        .collect()
}

/// Ranks every catalog movie by genre similarity to the user's weighted
/// preferences.
#[derive(Clone)]
pub struct ContentScorer {
    catalog: Arc<Catalog>,
    similarity: Arc<SimilarityMatrix>,
    matcher: TitleMatcher,
}

impl ContentScorer {
    pub fn new(
        catalog: Arc<Catalog>,
        similarity: Arc<SimilarityMatrix>,
        matcher: TitleMatcher,
    ) -> Self {
        Self {
            catalog,
            similarity,
            matcher,
        }
    }

    /// Resolve each preference against the catalog, dropping misses.
    /// Returns `(row, strength)` pairs in preference entry order.
    fn resolve_preferences(&self, preferences: &[Preference]) -> Vec<(usize, f32)> {
        let mut resolved = Vec::new();
        for pref in preferences {
            match self
                .matcher
                .resolve(&pref.title, self.catalog.titles())
            {
                Some(row) => {
                    debug!(
                        "Resolved '{}' -> '{}' (row {})",
                        pref.title,
                        self.catalog.movie_at(row).map(|m| m.title.as_str()).unwrap_or(""),
                        row
                    );
                    resolved.push((row, pref.strength));
                }
                None => debug!("Dropped unresolvable preference '{}'", pref.title),
            }
        }
        resolved
    }

    /// Rank catalog rows by accumulated, strength-weighted similarity.
    ///
    /// Returns up to `top_n` rows, never including a resolved input row.
    /// An empty result means nothing resolved; that is an expected
    /// outcome, not a failure.
    #[instrument(skip(self, preferences), fields(prefs = preferences.len()))]
    pub fn recommend(&self, preferences: &[Preference], top_n: usize) -> Vec<usize> {
        let resolved = self.resolve_preferences(preferences);
        if resolved.is_empty() {
            return Vec::new();
        }

        // Accumulator sized by the full catalog, indexed by row
        let n = self.catalog.len();
        let mut scores = vec![0.0f64; n];
        let mut total_weight = 0.0f64;

        for &(row, strength) in &resolved {
            let sim_row = self.similarity.row(row);
            for (j, &sim) in sim_row.iter().enumerate() {
                scores[j] += sim as f64 * strength as f64;
            }
            total_weight += strength as f64;
        }

        // resolved is non-empty, so total_weight > 0 for valid strengths
        if total_weight > 0.0 {
            for score in scores.iter_mut() {
                *score /= total_weight;
            }
        }

        // Exclusion is keyed by title: the catalog permits duplicate
        // titles, and every row carrying an input title must stay out.
        let exclude: HashSet<&str> = resolved
            .iter()
            .filter_map(|&(row, _)| self.catalog.movie_at(row))
            .map(|movie| movie.title.as_str())
            .collect();

        let mut ranked: Vec<usize> = (0..n).collect();
        // Stable sort keeps catalog order on score ties
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });

        ranked
            .into_iter()
            .filter(|&row| !exclude.contains(self.catalog.movies()[row].title.as_str()))
            .take(top_n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Movie;

    fn test_catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(vec![
                Movie::new(1, "Toy Story", "Animation|Comedy"),
                Movie::new(2, "A Bug's Life", "Animation|Comedy"),
                Movie::new(3, "Heat", "Action|Crime"),
            ])
            .unwrap(),
        )
    }

    fn test_scorer() -> ContentScorer {
        let catalog = test_catalog();
        let similarity = Arc::new(SimilarityMatrix::from_catalog(&catalog));
        ContentScorer::new(catalog, similarity, TitleMatcher::default())
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let catalog = test_catalog();
        let matrix = SimilarityMatrix::from_catalog(&catalog);

        for i in 0..matrix.len() {
            assert!((matrix.row(i)[i] - 1.0).abs() < 1e-6);
            for j in 0..matrix.len() {
                let diff = (matrix.row(i)[j] - matrix.row(j)[i]).abs();
                assert!(diff < 1e-5, "asymmetry at ({}, {})", i, j);
                assert!((0.0..=1.0).contains(&matrix.row(i)[j]));
            }
        }
    }

    #[test]
    fn test_identical_genres_beat_disjoint_genres() {
        let scorer = test_scorer();
        let prefs = vec![Preference::new("Toy Story", 5.0)];

        let ranked = scorer.recommend(&prefs, 5);

        // A Bug's Life (row 1) shares all genres with Toy Story; Heat
        // shares none.
        assert_eq!(ranked[0], 1);
        assert!(!ranked.contains(&0), "input title must be excluded");
    }

    #[test]
    fn test_unresolvable_preferences_yield_empty_result() {
        let scorer = test_scorer();
        let prefs = vec![Preference::new("Nonexistent Movie XYZ123", 5.0)];
        assert!(scorer.recommend(&prefs, 5).is_empty());
    }

    #[test]
    fn test_empty_preferences_yield_empty_result() {
        let scorer = test_scorer();
        assert!(scorer.recommend(&[], 5).is_empty());
    }

    #[test]
    fn test_duplicate_titles_are_all_excluded() {
        // Two catalog rows share a title (e.g. a re-release); resolving
        // one must keep both out of the results.
        let catalog = Arc::new(
            Catalog::new(vec![
                Movie::new(1, "Toy Story", "Animation|Comedy"),
                Movie::new(2, "A Bug's Life", "Animation|Comedy"),
                Movie::new(9, "Toy Story", "Animation|Comedy"),
            ])
            .unwrap(),
        );
        let similarity = Arc::new(SimilarityMatrix::from_catalog(&catalog));
        let scorer = ContentScorer::new(catalog.clone(), similarity, TitleMatcher::default());

        let ranked = scorer.recommend(&[Preference::new("Toy Story", 5.0)], 5);

        assert!(!ranked.is_empty());
        for row in ranked {
            assert_ne!(catalog.movie_at(row).unwrap().title, "Toy Story");
        }
    }

    #[test]
    fn test_top_n_is_monotonic_prefix() {
        let scorer = test_scorer();
        let prefs = vec![Preference::new("Toy Story", 5.0)];

        let small = scorer.recommend(&prefs, 1);
        let large = scorer.recommend(&prefs, 2);
        assert_eq!(small[..], large[..small.len()]);
    }
}
