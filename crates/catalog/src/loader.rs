//! CSV ingestion for the catalog and rating tables.
//!
//! Expects MovieLens-style files:
//! - `movies.csv`: movieId,title,genres (genres pipe-separated)
//! - `ratings.csv`: userId,movieId,rating,timestamp (timestamp ignored)
//!
//! Duplicate `(userId, movieId)` pairs in the rating log are collapsed
//! keeping the last value, so the engine only ever sees deduplicated
//! input.

use crate::error::{CatalogError, Result};
use crate::types::{validate_rating, Catalog, Movie, MovieId, Rating, UserId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    genres: String,
}

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
}

fn csv_error(path: &Path, source: csv::Error) -> CatalogError {
    CatalogError::Csv {
        file: path.display().to_string(),
        source,
    }
}

/// Load and validate the movie catalog from a `movies.csv` file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut movies = Vec::new();
    for record in reader.deserialize() {
        let record: MovieRecord = record.map_err(|e| csv_error(path, e))?;
        movies.push(Movie::new(record.movie_id, record.title, &record.genres));
    }

    let catalog = Catalog::new(movies)?;
    info!("Loaded {} movies from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load and validate the rating log from a `ratings.csv` file.
///
/// Returns ratings in first-seen `(user, movie)` order, which fixes the
/// engine's dense re-indexing of raw ids.
pub fn load_ratings(path: &Path) -> Result<Vec<Rating>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut ratings: Vec<Rating> = Vec::new();
    let mut seen: HashMap<(UserId, MovieId), usize> = HashMap::new();

    for record in reader.deserialize() {
        let record: RatingRecord = record.map_err(|e| csv_error(path, e))?;
        let rating = Rating {
            user_id: record.user_id,
            movie_id: record.movie_id,
            rating: validate_rating(record.rating)?,
        };

        match seen.get(&(rating.user_id, rating.movie_id)) {
            // Collapse duplicates keeping the last value
            Some(&pos) => ratings[pos] = rating,
            None => {
                seen.insert((rating.user_id, rating.movie_id), ratings.len());
                ratings.push(rating);
            }
        }
    }

    if ratings.is_empty() {
        return Err(CatalogError::EmptyTable {
            table: "ratings".to_string(),
        });
    }

    info!("Loaded {} ratings from {}", ratings.len(), path.display());
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("catalog-test-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_catalog_parses_quoted_titles() {
        let path = write_temp(
            "movies.csv",
            "movieId,title,genres\n\
             1,Toy Story (1995),Animation|Comedy\n\
             2,\"American President, The (1995)\",Comedy|Drama|Romance\n",
        );

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(2).unwrap().title,
            "American President, The (1995)"
        );
        assert_eq!(catalog.get(1).unwrap().genres, vec!["Animation", "Comedy"]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_ratings_collapses_duplicates_keeping_last() {
        let path = write_temp(
            "ratings.csv",
            "userId,movieId,rating,timestamp\n\
             1,10,3.0,100\n\
             1,10,4.5,200\n\
             2,10,2.0,300\n",
        );

        let ratings = load_ratings(&path).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].rating, 4.5);
        assert_eq!(ratings[1].user_id, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_ratings_rejects_out_of_range() {
        let path = write_temp(
            "bad-ratings.csv",
            "userId,movieId,rating,timestamp\n1,10,6.0,100\n",
        );

        let result = load_ratings(&path);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidValue { ref field, .. }) if field == "rating"
        ));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_ratings_rejects_empty_log() {
        let path = write_temp("empty-ratings.csv", "userId,movieId,rating,timestamp\n");
        assert!(matches!(
            load_ratings(&path),
            Err(CatalogError::EmptyTable { .. })
        ));
        std::fs::remove_file(path).ok();
    }
}
