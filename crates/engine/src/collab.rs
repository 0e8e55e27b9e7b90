//! Collaborative similarity: a user×movie rating matrix with dense
//! re-indexing of raw ids, indexed for nearest-neighbor search in movie
//! space.
//!
//! Each movie is represented by its column vector (its rating pattern
//! across users, dimension = number of users). Columns are L2-normalized
//! and registered in an [`InnerProductIndex`], so "movies rated like the
//! ones the user liked" is a single inner-product query.

use crate::knn::{normalize, InnerProductIndex};
use crate::matcher::TitleMatcher;
use crate::types::Preference;
use catalog::{Catalog, MovieId, Rating, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sparse rating log reshaped into indexed movie-column vectors.
///
/// Raw user and movie ids get dense indices in first-seen order over the
/// rating log. Both mappings are bijective and fixed for the lifetime of
/// the matrix; the reverse movie mapping recovers ids from search hits.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    /// Reverse lookup: column index -> raw movie id
    movie_ids: Vec<MovieId>,
    index: InnerProductIndex,
}

impl RatingMatrix {
    /// Build the matrix and its search index from a deduplicated rating
    /// log.
    #[instrument(skip(ratings), fields(ratings = ratings.len()))]
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        // Dense re-indexing, first-seen order
        let mut user_index: HashMap<UserId, usize> = HashMap::new();
        let mut movie_index: HashMap<MovieId, usize> = HashMap::new();
        let mut movie_ids: Vec<MovieId> = Vec::new();

        for rating in ratings {
            let next_user = user_index.len();
            user_index.entry(rating.user_id).or_insert(next_user);

            if !movie_index.contains_key(&rating.movie_id) {
                movie_index.insert(rating.movie_id, movie_ids.len());
                movie_ids.push(rating.movie_id);
            }
        }

        let n_users = user_index.len();
        let n_movies = movie_ids.len();

        // Materialize movie columns: one vector per movie across users
        let mut columns = vec![vec![0.0f32; n_users]; n_movies];
        for rating in ratings {
            let col = movie_index[&rating.movie_id];
            let row = user_index[&rating.user_id];
            columns[col][row] = rating.rating;
        }

        let mut index = InnerProductIndex::new(n_users);
        for column in columns {
            index.add(column);
        }

        debug!(
            "Built rating matrix: {} users x {} movies",
            n_users, n_movies
        );

        Self {
            user_index,
            movie_index,
            movie_ids,
            index,
        }
    }

    /// Number of distinct users in the rating log
    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    /// Number of distinct movies in the rating log
    pub fn n_movies(&self) -> usize {
        self.movie_ids.len()
    }

    /// Column index of a raw movie id, if the movie has rating history
    pub fn column_of(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    /// Raw movie id stored at a column index
    pub fn movie_id_at(&self, col: usize) -> Option<MovieId> {
        self.movie_ids.get(col).copied()
    }

    /// Lift a movie-space profile into user space: the weighted sum of
    /// the profile's movie columns. The result lives in the same space
    /// as the indexed vectors and can be searched directly.
    fn lift_profile(&self, profile: &[f32]) -> Vec<f32> {
        let mut query = vec![0.0f32; self.n_users()];
        for (col, &weight) in profile.iter().enumerate() {
            if weight == 0.0 {
                continue;
            }
            for (u, &v) in self.index.vector(col).iter().enumerate() {
                query[u] += weight * v;
            }
        }
        query
    }

    /// Nearest movie columns to a movie-space profile vector, as
    /// `(column, score)` pairs in descending inner-product order.
    pub fn search_profile(&self, profile: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut query = self.lift_profile(profile);
        normalize(&mut query);
        self.index.search(&query, k)
    }
}

/// Produces candidate titles from a synthesized user profile vector.
#[derive(Clone)]
pub struct CollaborativeScorer {
    catalog: Arc<Catalog>,
    ratings: Arc<RatingMatrix>,
    matcher: TitleMatcher,
}

impl CollaborativeScorer {
    pub fn new(catalog: Arc<Catalog>, ratings: Arc<RatingMatrix>, matcher: TitleMatcher) -> Self {
        Self {
            catalog,
            ratings,
            matcher,
        }
    }

    /// Number of movies with rating history; `candidates` with this `k`
    /// returns the complete ranking.
    pub fn n_rated_movies(&self) -> usize {
        self.ratings.n_movies()
    }

    /// Candidate titles by collaborative similarity, best first.
    ///
    /// The result never contains a resolved input title and holds no
    /// duplicates. Preferences whose movies have no rating history are
    /// skipped; if nothing maps onto the matrix the result is empty,
    /// which is an expected outcome for movies nobody has rated.
    #[instrument(skip(self, preferences), fields(prefs = preferences.len()))]
    pub fn candidates(&self, preferences: &[Preference], k: usize) -> Vec<String> {
        let mut profile = vec![0.0f32; self.ratings.n_movies()];
        let mut resolved_titles: HashSet<String> = HashSet::new();
        let mut nonzero = false;

        for pref in preferences {
            let Some(row) = self.matcher.resolve(&pref.title, self.catalog.titles()) else {
                debug!("Dropped unresolvable preference '{}'", pref.title);
                continue;
            };
            let movie = &self.catalog.movies()[row];
            resolved_titles.insert(movie.title.clone());

            match self.ratings.column_of(movie.id) {
                Some(col) => {
                    profile[col] = pref.strength;
                    nonzero = true;
                }
                None => debug!("'{}' has no rating history, skipped", movie.title),
            }
        }

        if !nonzero {
            debug!("Profile vector is all zero, no collaborative candidates");
            return Vec::new();
        }

        normalize(&mut profile);

        let mut seen: HashSet<String> = HashSet::new();
        self.ratings
            .search_profile(&profile, k)
            .into_iter()
            .filter_map(|(col, _)| {
                let movie_id = self.ratings.movie_id_at(col)?;
                let movie = self.catalog.get(movie_id)?;
                Some(movie.title.clone())
            })
            .filter(|title| !resolved_titles.contains(title) && seen.insert(title.clone()))
            .collect()
    }
}
