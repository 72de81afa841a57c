use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one scraping run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Search results URL to start from (the site's default search if unset)
    #[serde(default)]
    pub search_url: Option<String>,

    /// Maximum number of offers to scrape
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Whether to run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Whether to store the rendered HTML of every offer page
    #[serde(default)]
    pub save_raw: bool,

    /// Directory for raw HTML snapshots
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Directory for timestamped JSON exports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Explicit export path, overriding `output_dir`
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Browser locale (the site's own locale if unset)
    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub timings: Timings,
}

/// Timeouts and settle delays, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Upper bound for a page navigation
    pub navigation_timeout_ms: u64,

    /// How long to wait for offer links on the results page
    pub results_wait_ms: u64,

    /// Visibility wait for each consent button selector
    pub consent_selector_timeout_ms: u64,

    /// Visibility wait for each consent button found by role and name
    pub consent_role_timeout_ms: u64,

    /// Pause after dismissing the consent banner
    pub consent_settle_ms: u64,

    /// Pause after the results page is loaded
    pub results_settle_ms: u64,

    /// Pause after an offer page is loaded
    pub offer_settle_ms: u64,

    /// Interval between visibility checks
    pub poll_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 90_000,
            results_wait_ms: 15_000,
            consent_selector_timeout_ms: 2_500,
            consent_role_timeout_ms: 1_500,
            consent_settle_ms: 500,
            results_settle_ms: 1_500,
            offer_settle_ms: 800,
            poll_interval_ms: 100,
        }
    }
}

impl Timings {
    /// Tiny timeouts and no settle delays, for pages that are already complete
    #[cfg(test)]
    pub(crate) fn immediate() -> Self {
        Self {
            navigation_timeout_ms: 1_000,
            results_wait_ms: 50,
            consent_selector_timeout_ms: 20,
            consent_role_timeout_ms: 20,
            consent_settle_ms: 0,
            results_settle_ms: 0,
            offer_settle_ms: 0,
            poll_interval_ms: 5,
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn results_wait(&self) -> Duration {
        Duration::from_millis(self.results_wait_ms)
    }

    pub fn consent_selector_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_selector_timeout_ms)
    }

    pub fn consent_role_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_role_timeout_ms)
    }

    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    pub fn results_settle(&self) -> Duration {
        Duration::from_millis(self.results_settle_ms)
    }

    pub fn offer_settle(&self) -> Duration {
        Duration::from_millis(self.offer_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Default value for max_results
fn default_max_results() -> usize {
    20
}

fn default_headless() -> bool {
    true
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("outputs/raw")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs/json")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_url: None,
            max_results: default_max_results(),
            headless: default_headless(),
            save_raw: false,
            raw_dir: default_raw_dir(),
            output_dir: default_output_dir(),
            output_file: None,
            webdriver_url: default_webdriver_url(),
            locale: None,
            timings: Timings::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rejects settings a run cannot start with
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.search_url {
            let parsed = url::Url::parse(url)
                .map_err(|e| ScrapeError::Config(format!("search url {url:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ScrapeError::Config(format!(
                    "search url {url:?} is not an http(s) URL"
                )));
            }
        }
        if self.webdriver_url.trim().is_empty() {
            return Err(ScrapeError::Config("webdriver url is empty".to_string()));
        }
        if self.timings.poll_interval_ms == 0 {
            return Err(ScrapeError::Config(
                "poll interval must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ScrapeConfig::from_json("{}").unwrap();

        assert_eq!(config.max_results, 20);
        assert!(config.headless);
        assert!(!config.save_raw);
        assert_eq!(config.raw_dir, PathBuf::from("outputs/raw"));
        assert_eq!(config.output_dir, PathBuf::from("outputs/json"));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn test_partial_timings() {
        let config = ScrapeConfig::from_json(
            r#"{
                "max_results": 5,
                "save_raw": true,
                "timings": { "offer_settle_ms": 2000 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_results, 5);
        assert!(config.save_raw);
        assert_eq!(config.timings.offer_settle(), Duration::from_secs(2));
        assert_eq!(config.timings.navigation_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_json() {
        assert!(ScrapeConfig::from_json("{ max_results: }").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ScrapeConfig::default().validate().is_ok());

        let config = ScrapeConfig {
            search_url: Some("https://www.apec.fr/candidat/recherche-emploi.html".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        for bad in ["recherche-emploi.html", "ftp://www.apec.fr/"] {
            let config = ScrapeConfig {
                search_url: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ScrapeError::Config(_))),
                "{bad} accepted"
            );
        }

        let config = ScrapeConfig {
            webdriver_url: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(ScrapeConfig::from_file("/nonexistent/job-harvest.json").is_err());
    }
}
