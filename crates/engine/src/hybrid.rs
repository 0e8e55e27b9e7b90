//! The hybrid model: explicit construction, parallel content and
//! collaborative scoring, and rank-aware merging.

use crate::cache;
use crate::collab::{CollaborativeScorer, RatingMatrix};
use crate::content::ContentScorer;
use crate::error::{EngineError, Result};
use crate::matcher::TitleMatcher;
use crate::types::{Preference, Recommendation};
use catalog::{Catalog, Rating};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Constant of the reciprocal-rank fusion formula used by the merger.
const RRF_K: f64 = 60.0;

/// Immutable model handle combining both recommendation paths.
///
/// Built once from a snapshot of the catalog and rating log; after
/// construction all state is read-only, so one model can serve
/// concurrent requests without locking.
pub struct HybridModel {
    catalog: Arc<Catalog>,
    content: ContentScorer,
    collab: CollaborativeScorer,
    matcher: TitleMatcher,
}

impl HybridModel {
    /// Build the model, recomputing the similarity matrix.
    pub fn build(catalog: Catalog, ratings: &[Rating]) -> Result<Self> {
        Self::build_with_cache(catalog, ratings, None)
    }

    /// Build the model, reusing a cached similarity matrix when the
    /// artifact at `cache_path` matches the catalog snapshot.
    ///
    /// Construction is the expensive step (O(N²) for content, one pass
    /// over the rating log for collaborative) and fails fatally on an
    /// empty table; it never partially succeeds.
    #[instrument(skip_all, fields(movies = catalog.len(), ratings = ratings.len()))]
    pub fn build_with_cache(
        catalog: Catalog,
        ratings: &[Rating],
        cache_path: Option<&Path>,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        if ratings.is_empty() {
            return Err(EngineError::EmptyRatings);
        }

        let catalog = Arc::new(catalog);
        let matcher = TitleMatcher::default();

        // The two indexes are independent; build them side by side.
        let (similarity, rating_matrix) = rayon::join(
            || cache::load_or_build(&catalog, cache_path),
            || RatingMatrix::from_ratings(ratings),
        );

        info!(
            "Model built: {} movies, {} users x {} rated movies",
            catalog.len(),
            rating_matrix.n_users(),
            rating_matrix.n_movies()
        );

        let similarity = Arc::new(similarity);
        let rating_matrix = Arc::new(rating_matrix);

        Ok(Self {
            content: ContentScorer::new(catalog.clone(), similarity, matcher.clone()),
            collab: CollaborativeScorer::new(catalog.clone(), rating_matrix, matcher.clone()),
            catalog,
            matcher,
        })
    }

    /// The catalog snapshot this model was built from
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Pure matching probe: canonical title for a free-text input, if
    /// any candidate clears the matcher threshold.
    pub fn resolve_title(&self, text: &str) -> Option<&str> {
        self.matcher
            .resolve(text, self.catalog.titles())
            .and_then(|row| self.catalog.movie_at(row))
            .map(|movie| movie.title.as_str())
    }

    /// Top-N hybrid recommendations for a transient preference set.
    ///
    /// Content and collaborative scoring run in parallel; the merger
    /// waits for both. A preference set that resolves to nothing yields
    /// an empty list, distinguishable from engine failure because this
    /// method cannot fail.
    #[instrument(skip(self, preferences), fields(prefs = preferences.len(), top_n))]
    pub fn recommend(&self, preferences: &[Preference], top_n: usize) -> Vec<Recommendation> {
        if top_n == 0 || preferences.is_empty() {
            return Vec::new();
        }

        // Both scorers produce their complete rankings so the fused
        // order is independent of top_n: truncation happens only in the
        // merger, and a larger request always extends a smaller one.
        let (content_rows, collab_titles) = rayon::join(
            || self.content.recommend(preferences, self.catalog.len()),
            || self.collab.candidates(preferences, self.collab.n_rated_movies()),
        );

        let content_titles: Vec<String> = content_rows
            .into_iter()
            .filter_map(|row| self.catalog.movie_at(row))
            .map(|movie| movie.title.clone())
            .collect();

        info!(
            "Scored request: {} content candidates, {} collaborative candidates",
            content_titles.len(),
            collab_titles.len()
        );

        let exclude: HashSet<String> = preferences
            .iter()
            .filter_map(|p| self.resolve_title(&p.title))
            .map(str::to_string)
            .collect();

        let merged = merge_ranked(&content_titles, &collab_titles, &exclude, top_n);

        merged
            .into_iter()
            .filter_map(|title| {
                let row = self.catalog.row_of_title(&title)?;
                let movie = self.catalog.movie_at(row)?;
                Some(Recommendation {
                    title: movie.title.clone(),
                    genres: movie.genres.clone(),
                })
            })
            .collect()
    }
}

/// Merge the two ranked lists into one deduplicated top-N list.
///
/// A plain set union of the two lists would discard rank information
/// and leave the final order an accident of container iteration. This
/// merger uses reciprocal-rank fusion instead: each title scores
/// `Σ 1 / (60 + rank)` over the lists it appears in, ties broken by
/// earliest appearance (content list first) and then lexicographically.
/// Excluded titles never appear; the result holds no duplicates.
pub fn merge_ranked(
    content_ranked: &[String],
    collab_ranked: &[String],
    exclude_titles: &HashSet<String>,
    top_n: usize,
) -> Vec<String> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    // Position of first appearance across both lists, content first
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (offset, list) in [content_ranked, collab_ranked].into_iter().enumerate() {
        for (rank, title) in list.iter().enumerate() {
            if exclude_titles.contains(title) {
                continue;
            }
            *scores.entry(title).or_insert(0.0) += 1.0 / (RRF_K + rank as f64);
            first_seen
                .entry(title)
                .or_insert(offset * content_ranked.len().max(collab_ranked.len()) + rank);
        }
    }

    let mut merged: Vec<(&str, f64)> = scores.into_iter().collect();
    merged.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| first_seen[a.0].cmp(&first_seen[b.0]))
            .then_with(|| a.0.cmp(b.0))
    });

    merged
        .into_iter()
        .take(top_n)
        .map(|(title, _)| title.to_string())
        .collect()
}
