//! End-to-end tests for the hybrid model.

use catalog::{Catalog, Movie, Rating};
use engine::{EngineError, HybridModel, Preference};

fn rating(user_id: u32, movie_id: u32, value: f32) -> Rating {
    Rating {
        user_id,
        movie_id,
        rating: value,
    }
}

fn test_catalog() -> Catalog {
    Catalog::new(vec![
        Movie::new(1, "Toy Story", "Animation|Comedy"),
        Movie::new(2, "A Bug's Life", "Animation|Comedy"),
        Movie::new(3, "Heat", "Action|Crime"),
        Movie::new(4, "Ronin", "Action|Crime|Thriller"),
        Movie::new(5, "The Documentary", ""),
    ])
    .unwrap()
}

fn test_ratings() -> Vec<Rating> {
    vec![
        // Users 1 and 2 agree on the animation titles
        rating(1, 1, 5.0),
        rating(1, 2, 4.5),
        rating(2, 1, 4.5),
        rating(2, 2, 5.0),
        // User 3 likes the crime titles
        rating(3, 3, 5.0),
        rating(3, 4, 4.5),
        rating(4, 3, 4.0),
    ]
}

fn test_model() -> HybridModel {
    HybridModel::build(test_catalog(), &test_ratings()).unwrap()
}

#[test]
fn recommend_never_returns_an_input_title() {
    let model = test_model();
    let prefs = vec![Preference::new("Toy Story", 5.0)];

    let recs = model.recommend(&prefs, 5);
    assert!(!recs.is_empty());
    assert!(recs.iter().all(|r| r.title != "Toy Story"));
}

#[test]
fn genre_neighbors_rank_first() {
    let model = test_model();
    let prefs = vec![Preference::new("Toy Story", 5.0)];

    let recs = model.recommend(&prefs, 5);
    // A Bug's Life shares genres and rating history with Toy Story
    assert_eq!(recs[0].title, "A Bug's Life");
    assert_eq!(recs[0].genres, vec!["Animation", "Comedy"]);
}

#[test]
fn typos_still_resolve() {
    let model = test_model();
    let prefs = vec![Preference::new("Toy Stroy", 5.0)];

    let recs = model.recommend(&prefs, 3);
    assert_eq!(recs[0].title, "A Bug's Life");
}

#[test]
fn unknown_titles_yield_empty_result_without_error() {
    let model = test_model();
    let prefs = vec![Preference::new("Nonexistent Movie XYZ123", 5.0)];

    assert!(model.recommend(&prefs, 5).is_empty());
}

#[test]
fn empty_preference_set_yields_empty_result() {
    let model = test_model();
    assert!(model.recommend(&[], 5).is_empty());
}

#[test]
fn results_never_exceed_top_n() {
    let model = test_model();
    let prefs = vec![Preference::new("Heat", 5.0)];

    assert!(model.recommend(&prefs, 1).len() <= 1);
    assert!(model.recommend(&prefs, 100).len() <= model.catalog().len());
}

#[test]
fn results_hold_no_duplicate_titles() {
    let model = test_model();
    let prefs = vec![
        Preference::new("Toy Story", 5.0),
        Preference::new("Heat", 4.0),
    ];

    let recs = model.recommend(&prefs, 10);
    let mut titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
    titles.sort_unstable();
    titles.dedup();
    assert_eq!(titles.len(), recs.len());
}

#[test]
fn increasing_top_n_preserves_earlier_results() {
    let model = test_model();
    let prefs = vec![Preference::new("Toy Story", 5.0)];

    let small = model.recommend(&prefs, 2);
    let large = model.recommend(&prefs, 4);
    assert_eq!(small[..], large[..small.len()]);
}

#[test]
fn disagreeing_scorers_still_extend_earlier_results() {
    // The genre neighbors of "Frozen Planet" share no rating history
    // with it, and its co-rated titles share no genres, so the two
    // rankings disagree completely. Growing top_n must still only
    // append to the smaller result.
    let catalog = Catalog::new(vec![
        Movie::new(1, "Frozen Planet", "Documentary"),
        Movie::new(2, "Blue Planet", "Documentary"),
        Movie::new(3, "Earth", "Documentary"),
        Movie::new(4, "Heat", "Action|Crime"),
        Movie::new(5, "Ronin", "Action|Thriller"),
    ])
    .unwrap();
    let ratings = vec![
        rating(1, 1, 5.0),
        rating(1, 4, 5.0),
        rating(1, 5, 4.5),
        rating(2, 1, 4.5),
        rating(2, 4, 4.5),
        rating(2, 5, 5.0),
    ];
    let model = HybridModel::build(catalog, &ratings).unwrap();
    let prefs = vec![Preference::new("Frozen Planet", 5.0)];

    let full = model.recommend(&prefs, 4);
    assert_eq!(full.len(), 4);
    for n in 1..=4 {
        let partial = model.recommend(&prefs, n);
        assert_eq!(partial[..], full[..n]);
    }
}

#[test]
fn recommend_is_deterministic() {
    let model = test_model();
    let prefs = vec![
        Preference::new("Toy Story", 5.0),
        Preference::new("Heat", 3.5),
    ];

    assert_eq!(model.recommend(&prefs, 5), model.recommend(&prefs, 5));
}

#[test]
fn resolve_title_is_idempotent_on_canonical_titles() {
    let model = test_model();
    for title in ["Toy Story", "A Bug's Life", "Heat"] {
        assert_eq!(model.resolve_title(title), Some(title));
        let resolved = model.resolve_title(title).unwrap();
        assert_eq!(model.resolve_title(resolved), Some(title));
    }
}

#[test]
fn build_rejects_empty_ratings() {
    let result = HybridModel::build(test_catalog(), &[]);
    assert!(matches!(result, Err(EngineError::EmptyRatings)));
}

#[test]
fn model_is_shareable_across_threads() {
    let model = std::sync::Arc::new(test_model());
    let prefs = vec![Preference::new("Toy Story", 5.0)];

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = model.clone();
            let prefs = prefs.clone();
            std::thread::spawn(move || model.recommend(&prefs, 3))
        })
        .collect();

    let first = model.recommend(&prefs, 3);
    for handle in handles {
        assert_eq!(handle.join().unwrap(), first);
    }
}
