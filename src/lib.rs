// Re-export modules
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod offer;
pub mod output;
pub mod scrapers;
pub mod text;

// Re-export commonly used types for convenience
pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use offer::{LinkEntry, OfferRecord};
pub use scrapers::{JobScraper, Scraper, SiteProfile};

use browser::webdriver::WebDriverLauncher;

/// Job boards that can be scraped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// apec.fr
    Apec,
}

impl Source {
    pub fn profile(self) -> SiteProfile {
        match self {
            Source::Apec => SiteProfile::apec(),
        }
    }
}

/// Builds the WebDriver-backed scraper for a source
pub fn scraper_for(source: Source, config: &ScrapeConfig) -> Scraper<WebDriverLauncher> {
    let launcher = WebDriverLauncher::new(&config.webdriver_url)
        .with_page_load_timeout(config.timings.navigation_timeout());
    Scraper::from_config(launcher, source.profile(), config)
}

/// Scrapes `source` as configured and exports the offers.
///
/// Nothing is written unless the scrape as a whole succeeds. Returns the path
/// written to and the exported JSON.
pub async fn run<S: JobScraper + ?Sized>(
    scraper: &S,
    config: &ScrapeConfig,
) -> Result<(std::path::PathBuf, String)> {
    output::prepare_dirs(config)?;

    let offers = scraper
        .scrape_jobs(config.max_results, config.headless)
        .await?;

    let path = output::output_path(config, scraper.name(), chrono::Utc::now());
    let json = output::write_offers(&path, &offers)?;
    Ok((path, json))
}
