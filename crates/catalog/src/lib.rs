//! # Catalog Crate
//!
//! Loads and validates the movie catalog and rating log that feed the
//! recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, Catalog)
//! - **loader**: CSV ingestion with validation and deduplication
//! - **error**: Error types for ingestion failures
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{load_catalog, load_ratings};
//! use std::path::Path;
//!
//! let catalog = load_catalog(Path::new("data/movies.csv"))?;
//! let ratings = load_ratings(Path::new("data/ratings.csv"))?;
//!
//! println!("{} movies, {} ratings", catalog.len(), ratings.len());
//! ```

pub mod error;
pub mod loader;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use loader::{load_catalog, load_ratings};
pub use types::{
    normalize_genres, validate_rating, Catalog, Movie, MovieId, Rating, UserId, MAX_RATING,
    MIN_RATING, NO_GENRES,
};
