use clap::Parser;
use unfold_page::Unfold;

mod args;
use args::{Args, convert_strategy};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Starting scrape of {}", args.url);

    let mut unfold = Unfold::new(&args.url);
    if let Some(path) = &args.config {
        unfold = match unfold.with_config_file(path) {
            Ok(unfold) => unfold,
            Err(e) => {
                ::log::error!("Failed to load configuration from {}: {}", path, e);
                std::process::exit(1);
            }
        };
    }

    // Command-line flags win over the configuration file
    if let Some(strategy) = args.strategy {
        unfold = unfold.with_pagination(convert_strategy(strategy));
    }
    if let Some(max_scrolls) = args.max_scrolls {
        unfold = unfold.with_max_scrolls(max_scrolls);
    }
    if let Some(max_pages) = args.max_pages {
        unfold = unfold.with_max_pages(max_pages);
    }
    if args.prioritized {
        unfold = unfold.prioritized();
    }

    let start_time = std::time::Instant::now();
    let outcome = match unfold.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Scrape complete - {} fragments, {} images in {:.2} seconds",
        outcome.document.content.len(),
        outcome.document.images.len(),
        start_time.elapsed().as_secs_f64()
    );

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => ::log::error!("Failed to serialize result: {}", e),
    }
}
