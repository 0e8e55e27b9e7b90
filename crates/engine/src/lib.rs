//! # Engine Crate
//!
//! Hybrid movie recommendation engine: resolves noisy user-typed titles
//! against the catalog, ranks candidates by content similarity (genre
//! TF-IDF cosine) and by collaborative similarity (nearest-neighbor
//! search over rating vectors), and fuses both rankings into one
//! deduplicated top-N list.
//!
//! ## Main Components
//!
//! - **matcher**: approximate title resolution with a pluggable
//!   similarity function
//! - **content**: TF-IDF genre vectors, the dense similarity matrix, and
//!   the content scorer
//! - **collab**: the re-indexed rating matrix and the collaborative
//!   scorer
//! - **knn**: exact inner-product nearest-neighbor search
//! - **cache**: content-addressed disk cache for the similarity matrix
//! - **hybrid**: the model handle and the rank-fusion merger
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{HybridModel, Preference};
//!
//! let model = HybridModel::build(catalog, &ratings)?;
//! let prefs = vec![Preference::new("Toy Stroy", 5.0)];
//! for rec in model.recommend(&prefs, 5) {
//!     println!("{} [{}]", rec.title, rec.genres.join(", "));
//! }
//! ```

pub mod cache;
pub mod collab;
pub mod content;
pub mod error;
pub mod hybrid;
pub mod knn;
pub mod matcher;
pub mod types;

// Re-export commonly used types
pub use collab::{CollaborativeScorer, RatingMatrix};
pub use content::{ContentScorer, SimilarityMatrix};
pub use error::{EngineError, Result};
pub use hybrid::{merge_ranked, HybridModel};
pub use knn::InnerProductIndex;
pub use matcher::TitleMatcher;
pub use types::{Preference, Recommendation};
