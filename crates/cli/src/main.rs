use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{HybridModel, Preference};
use std::path::PathBuf;
use std::time::Instant;

/// Hybrid movie recommender: content + collaborative filtering
#[derive(Parser)]
#[command(name = "hybrid-recs")]
#[command(about = "Movie recommendations from the titles you already like", long_about = None)]
struct Cli {
    /// Directory containing movies.csv and ratings.csv
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for the cached similarity matrix (omit to disable caching)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies from titles you liked
    Recommend {
        /// A liked title, optionally with a strength: "Toy Story=4.5".
        /// Repeat for multiple titles.
        #[arg(long = "like", required = true)]
        likes: Vec<String>,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        top_n: usize,
    },

    /// Resolve a free-text title to its canonical catalog title
    Resolve {
        /// Title to resolve
        #[arg(long)]
        title: String,
    },

    /// Search for movies by title (case-insensitive substring match)
    Search {
        /// Search text
        #[arg(long)]
        title: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog from {}...", cli.data_dir.display());
    let start = Instant::now();
    let catalog = catalog::load_catalog(&cli.data_dir.join("movies.csv"))
        .context("Failed to load movie catalog")?;
    let ratings = catalog::load_ratings(&cli.data_dir.join("ratings.csv"))
        .context("Failed to load rating log")?;
    println!(
        "{} Loaded {} movies and {} ratings in {:?}",
        "✓".green(),
        catalog.len(),
        ratings.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend { likes, top_n } => {
            handle_recommend(catalog, &ratings, cli.cache_dir, &likes, top_n)
        }
        Commands::Resolve { title } => handle_resolve(catalog, &ratings, &title),
        Commands::Search { title } => handle_search(&catalog, &title),
    }
}

/// Parse a `--like` value of the form "Title" or "Title=4.5".
fn parse_preference(raw: &str) -> Result<Preference> {
    match raw.rsplit_once('=') {
        Some((title, strength)) => {
            let title = title.trim();
            if title.is_empty() {
                bail!("Empty title in preference '{}'", raw);
            }
            let strength: f32 = strength
                .trim()
                .parse()
                .with_context(|| format!("Invalid strength in preference '{}'", raw))?;
            Ok(Preference::new(title, strength))
        }
        None => Ok(Preference::new(raw.trim(), 5.0)),
    }
}

fn build_model(
    catalog: catalog::Catalog,
    ratings: &[catalog::Rating],
    cache_dir: Option<PathBuf>,
) -> Result<HybridModel> {
    let cache_path = cache_dir.map(|dir| dir.join("similarity.bin"));
    let start = Instant::now();
    let model = HybridModel::build_with_cache(catalog, ratings, cache_path.as_deref())
        .context("Failed to build recommendation model")?;
    println!("{} Built model in {:?}", "✓".green(), start.elapsed());
    Ok(model)
}

fn handle_recommend(
    catalog: catalog::Catalog,
    ratings: &[catalog::Rating],
    cache_dir: Option<PathBuf>,
    likes: &[String],
    top_n: usize,
) -> Result<()> {
    let preferences: Vec<Preference> = likes
        .iter()
        .map(|raw| parse_preference(raw))
        .collect::<Result<_>>()?;

    let model = build_model(catalog, ratings, cache_dir)?;

    // Echo how each input resolved before recommending
    for pref in &preferences {
        match model.resolve_title(&pref.title) {
            Some(resolved) if resolved == pref.title => {}
            Some(resolved) => println!(
                "{} \"{}\" matched as \"{}\"",
                "~".yellow(),
                pref.title,
                resolved
            ),
            None => println!("{} \"{}\" matched nothing, skipped", "✗".red(), pref.title),
        }
    }

    let recommendations = model.recommend(&preferences, top_n);
    if recommendations.is_empty() {
        println!("{}", "No matches found for your titles.".yellow().bold());
        return Ok(());
    }

    println!("{}", "Recommendations:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}]",
            (rank + 1).to_string().green(),
            rec.title,
            rec.genres.join(", ")
        );
    }
    Ok(())
}

fn handle_resolve(
    catalog: catalog::Catalog,
    ratings: &[catalog::Rating],
    title: &str,
) -> Result<()> {
    let model = build_model(catalog, ratings, None)?;
    match model.resolve_title(title) {
        Some(resolved) => println!("{} \"{}\" -> \"{}\"", "✓".green(), title, resolved),
        None => println!("{} No catalog title matches \"{}\"", "✗".red(), title),
    }
    Ok(())
}

fn handle_search(catalog: &catalog::Catalog, title: &str) -> Result<()> {
    let needle = title.to_lowercase();
    let mut matches: Vec<&catalog::Movie> = catalog
        .movies()
        .iter()
        .filter(|movie| movie.title.to_lowercase().contains(&needle))
        .collect();

    // Exact matches first, then alphabetical
    matches.sort_by_key(|movie| (movie.title.to_lowercase() != needle, movie.title.clone()));

    println!(
        "{}",
        format!("Search results for '{}':", title).bold().blue()
    );
    for movie in matches.iter().take(20) {
        println!("{}: {} [{}]", movie.id, movie.title, movie.genres.join(", "));
    }
    if matches.is_empty() {
        println!("(no matches)");
    }
    Ok(())
}
