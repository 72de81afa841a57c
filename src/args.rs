use clap::{Parser, ValueEnum};
use job_harvest::{Result, ScrapeConfig, Source};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "job-harvest")]
#[command(about = "Scrapes job offers from a job board and exports them as JSON")]
#[command(version)]
pub struct Args {
    /// Source scraper to run
    #[arg(long, value_enum, default_value_t = SourceArg::Apec)]
    pub source: SourceArg,

    /// Override the search results URL
    #[arg(long)]
    pub url: Option<String>,

    /// Max job offers to scrape [default: 20]
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Launch the browser with a window
    #[arg(long)]
    pub headed: bool,

    /// Directory where JSON output is stored [default: outputs/json]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Explicit JSON output file path
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Store raw HTML for each scraped offer
    #[arg(long)]
    pub save_raw: bool,

    /// Directory where raw HTML files are stored [default: outputs/raw]
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// WebDriver server to drive the browser through [default: http://localhost:4444]
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Apec,
}

/// Convert from CLI argument source to internal source
pub fn convert_source(arg: SourceArg) -> Source {
    match arg {
        SourceArg::Apec => Source::Apec,
    }
}

impl Args {
    /// Run configuration: the config file (or defaults) with flags applied on
    /// top, then the `WEBDRIVER_URL` environment variable
    pub fn to_config(&self) -> Result<ScrapeConfig> {
        self.merge(std::env::var("WEBDRIVER_URL").ok())
    }

    fn merge(&self, env_webdriver_url: Option<String>) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        if let Some(url) = &self.url {
            config.search_url = Some(url.clone());
        }
        if let Some(max_results) = self.max_results {
            config.max_results = max_results;
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(file) = &self.output_file {
            config.output_file = Some(file.clone());
        }
        if self.save_raw {
            config.save_raw = true;
        }
        if let Some(dir) = &self.raw_dir {
            config.raw_dir = dir.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        } else if let Some(url) = env_webdriver_url.filter(|u| !u.is_empty()) {
            // Override the WebDriver URL with an environment variable if provided
            config.webdriver_url = url;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["job-harvest"]);
        let config = args.merge(None).unwrap();

        assert_eq!(args.source, SourceArg::Apec);
        assert_eq!(config.max_results, 20);
        assert!(config.headless);
        assert!(!config.save_raw);
        assert_eq!(config.output_dir, PathBuf::from("outputs/json"));
        assert_eq!(config.search_url, None);
    }

    #[test]
    fn test_flags_override() {
        let args = Args::parse_from([
            "job-harvest",
            "--url",
            "https://www.apec.fr/recherche?q=rust",
            "--max-results",
            "3",
            "--headed",
            "--save-raw",
            "--raw-dir",
            "/tmp/raw",
            "--output-file",
            "out.json",
        ]);
        let config = args.merge(None).unwrap();

        assert_eq!(
            config.search_url.as_deref(),
            Some("https://www.apec.fr/recherche?q=rust")
        );
        assert_eq!(config.max_results, 3);
        assert!(!config.headless);
        assert!(config.save_raw);
        assert_eq!(config.raw_dir, PathBuf::from("/tmp/raw"));
        assert_eq!(config.output_file, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let args = Args::parse_from(["job-harvest", "--url", "not a url"]);
        assert!(args.merge(None).is_err());
    }

    #[test]
    fn test_webdriver_url_from_environment() {
        let args = Args::parse_from(["job-harvest"]);

        let config = args.merge(Some("http://selenium:4444".to_string())).unwrap();
        assert_eq!(config.webdriver_url, "http://selenium:4444");

        let config = args.merge(Some(String::new())).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:4444");

        // Checked like any other setting
        assert!(args.merge(Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_webdriver_flag_beats_environment() {
        let args = Args::parse_from(["job-harvest", "--webdriver-url", "http://localhost:9515"]);
        let config = args.merge(Some("http://selenium:4444".to_string())).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(Args::try_parse_from(["job-harvest", "--source", "indeed"]).is_err());
    }
}
