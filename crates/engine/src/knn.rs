//! Exact inner-product nearest-neighbor search over dense vectors.
//!
//! Flat index: vectors are L2-normalized on insertion and queries scan
//! every stored vector in parallel. For catalogs in the tens of
//! thousands this stays well inside the latency budget; an approximate
//! structure would only pay off far beyond that scale.

use rayon::prelude::*;

/// Flat inner-product index, the moral equivalent of FAISS `IndexFlatIP`
/// with normalized inputs.
#[derive(Debug, Clone)]
pub struct InnerProductIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

/// L2-normalize a vector in place. All-zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

impl InnerProductIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality of stored vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Add a vector, normalizing it first. The vector's position in
    /// insertion order is its index in search results.
    ///
    /// # Panics
    /// Panics if the vector's length doesn't match the index dimension.
    pub fn add(&mut self, mut vector: Vec<f32>) {
        assert_eq!(vector.len(), self.dim, "vector dimension mismatch");
        normalize(&mut vector);
        self.vectors.push(vector);
    }

    /// The normalized vector stored at an insertion index
    pub fn vector(&self, idx: usize) -> &[f32] {
        &self.vectors[idx]
    }

    /// Return the `k` stored vectors with the highest inner product
    /// against the query, as `(index, score)` pairs sorted by score
    /// descending. Ties break toward lower insertion index.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        assert_eq!(query.len(), self.dim, "query dimension mismatch");

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(idx, vector)| {
                let dot: f32 = vector.iter().zip(query).map(|(a, b)| a * b).sum();
                (idx, dot)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}
