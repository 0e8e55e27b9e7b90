//! Request and response types shared across the engine.

use serde::{Deserialize, Serialize};

/// One stated preference: a free-text title, as typed, and how strongly
/// the user liked it.
///
/// Preference sets are transient per-request values; entry order is
/// preserved for debug traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub title: String,
    pub strength: f32,
}

impl Preference {
    pub fn new(title: impl Into<String>, strength: f32) -> Self {
        Self {
            title: title.into(),
            strength,
        }
    }
}

/// One entry of the final ranked recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub genres: Vec<String>,
}
