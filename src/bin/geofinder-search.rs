//! Command-line search client
//!
//! Runs one bounding-box search against a Geofinder server and prints the
//! results table. Optionally opens the detail view for one row and lists
//! the photos taken nearby.

use clap::Parser;
use geofinder::client::view::PhotoSlot;
use geofinder::client::{
    ClientConfig, GeocacheApi, HttpGeocacheApi, ResultsView, SearchController, SearchForm,
    SearchOutcome,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Geofinder - find geocaches around a point
#[derive(Parser)]
#[command(name = "geofinder-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Center latitude (defaults to Tucson, AZ)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    /// Center longitude
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<String>,

    /// Search radius in miles
    #[arg(long, short = 'd')]
    distance: Option<String>,

    /// Cache type id filter
    #[arg(long = "type", short = 't', default_value = "")]
    cache_type: String,

    /// Difficulty rating filter
    #[arg(long, default_value = "")]
    difficulty: String,

    /// Open the detail view for this result row (0-based) and list photos
    #[arg(long, short = 's')]
    select: Option<usize>,

    /// Print raw results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// List the available cache types and exit
    #[arg(long)]
    list_types: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "geofinder=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("Geofinder/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let api = HttpGeocacheApi::new(&cli.server, http_client)?;

    if cli.list_types {
        for cache_type in api.cache_types().await? {
            println!("{:>4}  {}", cache_type.type_id, cache_type.cache_type);
        }
        return Ok(());
    }

    let mut controller = SearchController::new(api, ClientConfig::default());
    let form = SearchForm {
        lat: cli.lat,
        lng: cli.lng,
        distance: cli.distance,
        cache_type: cli.cache_type,
        difficulty: cli.difficulty,
    };

    let ticket = controller.begin_search(&form);
    let bounds = ticket.bounds;
    println!(
        "Searching {:.4}..{:.4} lat, {:.4}..{:.4} lng",
        bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng
    );

    let response = controller.api().search(&ticket.request).await;
    match controller.finish_search(&ticket, response) {
        SearchOutcome::Rendered(_) => {}
        SearchOutcome::Failed | SearchOutcome::Superseded => {
            if let Some(alert) = controller.view().alert() {
                eprintln!("{alert}");
            }
            std::process::exit(1);
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(controller.view().results())?);
    } else {
        print_table(controller.view());
    }

    if let Some(index) = cli.select {
        if !controller.select(index).await {
            anyhow::bail!("no result row {index}");
        }
        print_detail(controller.view());
    }

    Ok(())
}

fn print_table(view: &ResultsView) {
    if view.rows().is_empty() {
        println!("No geocaches found.");
        return;
    }

    println!("{:>4}  {:<20} {:<10} {}", "#", "Type", "Difficulty", "Location");
    for row in view.rows() {
        let [cache_type, difficulty, location] = &row.cells;
        println!("{:>4}  {:<20} {:<10} {}", row.index, cache_type, difficulty, location);
    }
}

fn print_detail(view: &ResultsView) {
    let Some(detail) = view.detail() else {
        return;
    };

    println!();
    println!("Type: {}", detail.cache_type);
    println!("Difficulty: {}", detail.difficulty);
    println!("Location: {}", detail.location);

    match &detail.photos {
        PhotoSlot::Loading => println!("Loading photos..."),
        PhotoSlot::Failed(text) => println!("{text}"),
        PhotoSlot::Loaded(photos) if photos.is_empty() => println!("No photos nearby."),
        PhotoSlot::Loaded(photos) => {
            for photo in photos {
                println!("  {}", photo.thumbnail_url);
            }
        }
    }
}
