use clap::Parser;
use job_harvest::JobScraper;
use std::error::Error;

mod args;
use args::{Args, convert_source};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    let config = args.to_config()?;

    let source = convert_source(args.source);
    let scraper = job_harvest::scraper_for(source, &config);
    ::log::info!(
        "Scraping up to {} offers from {} ({})",
        config.max_results,
        scraper.name(),
        scraper.search_url()
    );

    let start_time = std::time::Instant::now();
    let (path, json) = match job_harvest::run(&scraper, &config).await {
        Ok(done) => done,
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    ::log::info!(
        "Scraping complete in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    println!("{json}");
    println!("\nSaved JSON to: {}", path.display());
    Ok(())
}
