use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Everything that can go wrong while driving the browser or exporting offers
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A WebDriver command was rejected or the session went away
    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// No WebDriver session could be created
    #[error("could not start a webdriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("failed to navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    /// An element handle no longer points at anything on its page
    #[error("element is no longer attached: {0}")]
    StaleElement(String),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        ScrapeError::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::Timeout { .. })
    }
}
