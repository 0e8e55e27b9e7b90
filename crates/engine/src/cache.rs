//! Content-addressed disk cache for the similarity matrix.
//!
//! The artifact is keyed by a SHA-256 fingerprint of the catalog
//! snapshot (every movie id and genre list, in row order). A cached
//! matrix is only trusted when its fingerprint matches the live catalog;
//! any mismatch, missing file, or corrupt artifact triggers a rebuild
//! and a rewrite. A stale matrix is never served.

use crate::content::SimilarityMatrix;
use crate::error::{EngineError, Result};
use catalog::Catalog;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Serialize, Deserialize)]
struct CachedMatrix {
    fingerprint: String,
    matrix: SimilarityMatrix,
}

/// Hex SHA-256 fingerprint of the catalog snapshot the similarity
/// matrix depends on: movie ids and genre lists in row order.
pub fn catalog_fingerprint(catalog: &Catalog) -> String {
    let mut hasher = Sha256::new();
    for movie in catalog.movies() {
        hasher.update(movie.id.to_le_bytes());
        for genre in &movie.genres {
            hasher.update(genre.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xff]);
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn cache_error(path: &Path, reason: impl ToString) -> EngineError {
    EngineError::Cache {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Load a cached matrix if its fingerprint matches the given one.
pub fn load(path: &Path, fingerprint: &str) -> Result<Option<SimilarityMatrix>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| cache_error(path, e))?;
    let cached: CachedMatrix =
        bincode::deserialize(&bytes).map_err(|e| cache_error(path, e))?;

    if cached.fingerprint != fingerprint {
        debug!(
            "Cache fingerprint mismatch at {} (stale catalog snapshot)",
            path.display()
        );
        return Ok(None);
    }
    Ok(Some(cached.matrix))
}

/// Write the matrix to disk under the given fingerprint.
pub fn save(path: &Path, fingerprint: &str, matrix: &SimilarityMatrix) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| cache_error(path, e))?;
    }
    let cached = CachedMatrix {
        fingerprint: fingerprint.to_string(),
        matrix: matrix.clone(),
    };
    let bytes = bincode::serialize(&cached).map_err(|e| cache_error(path, e))?;
    fs::write(path, bytes).map_err(|e| cache_error(path, e))?;
    Ok(())
}

/// Return a similarity matrix for the catalog, reusing a valid cached
/// artifact when one exists.
///
/// The cache is best-effort: unreadable or stale artifacts cause a
/// rebuild, and a failed rewrite is logged but does not fail the build.
pub fn load_or_build(catalog: &Catalog, cache_path: Option<&Path>) -> SimilarityMatrix {
    let Some(path) = cache_path else {
        return SimilarityMatrix::from_catalog(catalog);
    };

    let fingerprint = catalog_fingerprint(catalog);
    match load(path, &fingerprint) {
        Ok(Some(matrix)) if matrix.len() == catalog.len() => {
            info!("Loaded similarity matrix from cache {}", path.display());
            return matrix;
        }
        Ok(Some(_)) => warn!("Cached matrix size disagrees with catalog, rebuilding"),
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable similarity cache: {}", e),
    }

    let matrix = SimilarityMatrix::from_catalog(catalog);
    if let Err(e) = save(path, &fingerprint, &matrix) {
        warn!("Failed to write similarity cache: {}", e);
    }
    matrix
}
