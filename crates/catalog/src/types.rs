//! Core domain types for the movie catalog and rating log.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Sentinel genre assigned when a movie has no genre information.
pub const NO_GENRES: &str = "(no genres listed)";

/// Lower bound of the valid rating range (inclusive).
pub const MIN_RATING: f32 = 0.5;

/// Upper bound of the valid rating range (inclusive).
pub const MAX_RATING: f32 = 5.0;

/// A single catalog entry.
///
/// Genres are an ordered, deduplicated list of normalized genre names.
/// After normalization the list is never empty: movies without genre
/// information carry the [`NO_GENRES`] sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
}

impl Movie {
    /// Create a movie from a raw pipe-separated genre field, applying
    /// the catalog's genre normalization rules.
    pub fn new(id: MovieId, title: impl Into<String>, raw_genres: &str) -> Self {
        Self {
            id,
            title: title.into(),
            genres: normalize_genres(raw_genres),
        }
    }
}

/// Split a raw genre field on `|`, trim, drop empties and duplicates
/// while preserving first-seen order.
pub fn normalize_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for token in raw.split('|') {
        let token = token.trim();
        if token.is_empty() || token == NO_GENRES {
            continue;
        }
        if !genres.iter().any(|g| g == token) {
            genres.push(token.to_string());
        }
    }
    if genres.is_empty() {
        genres.push(NO_GENRES.to_string());
    }
    genres
}

/// A single rating from the rating log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value in [[`MIN_RATING`], [`MAX_RATING`]]
    pub rating: f32,
}

/// The fixed set of all known movies, with row-position indices.
///
/// Rows are assigned in ingestion order and are the coordinate system of
/// the content similarity matrix, so the order is load-bearing: the same
/// input always yields the same row assignment. The catalog is immutable
/// after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
    id_to_row: HashMap<MovieId, usize>,
    title_to_row: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from movies in ingestion order.
    ///
    /// Fails on duplicate movie ids or empty titles; construction never
    /// partially succeeds.
    pub fn new(movies: Vec<Movie>) -> Result<Self> {
        if movies.is_empty() {
            return Err(CatalogError::EmptyTable {
                table: "movies".to_string(),
            });
        }

        let mut id_to_row = HashMap::with_capacity(movies.len());
        let mut title_to_row = HashMap::with_capacity(movies.len());

        for (row, movie) in movies.iter().enumerate() {
            if movie.title.trim().is_empty() {
                return Err(CatalogError::InvalidValue {
                    field: "title".to_string(),
                    value: format!("empty title for movie id {}", movie.id),
                });
            }
            if id_to_row.insert(movie.id, row).is_some() {
                return Err(CatalogError::DuplicateMovieId { id: movie.id });
            }
            // Duplicate titles keep the first row, matching first-seen
            // resolution order.
            title_to_row.entry(movie.title.clone()).or_insert(row);
        }

        Ok(Self {
            movies,
            id_to_row,
            title_to_row,
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// All movies in row order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Movie at a given row position
    pub fn movie_at(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    /// Look up a movie by id
    pub fn get(&self, id: MovieId) -> Option<&Movie> {
        self.id_to_row.get(&id).map(|&row| &self.movies[row])
    }

    /// Row position of a movie id
    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.id_to_row.get(&id).copied()
    }

    /// Row position of an exact canonical title
    pub fn row_of_title(&self, title: &str) -> Option<usize> {
        self.title_to_row.get(title).copied()
    }

    /// All canonical titles in row order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }
}

/// Validate a rating value against the allowed range.
pub fn validate_rating(value: f32) -> Result<f32> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) || value.is_nan() {
        return Err(CatalogError::InvalidValue {
            field: "rating".to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}
