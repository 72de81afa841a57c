//! JSON export of scraped offers.

use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::offer::OfferRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates the directories a run writes into
pub fn prepare_dirs(config: &ScrapeConfig) -> Result<()> {
    fs::create_dir_all(&config.output_dir)?;
    if config.save_raw {
        fs::create_dir_all(&config.raw_dir)?;
    }
    Ok(())
}

/// Where the export of a run of `source` finishing at `now` goes: the
/// configured file if any, else a timestamped file in the output directory
pub fn output_path(config: &ScrapeConfig, source: &str, now: DateTime<Utc>) -> PathBuf {
    match &config.output_file {
        Some(path) => path.clone(),
        None => config
            .output_dir
            .join(format!("{}_{}.json", source, now.format("%Y%m%d_%H%M%S"))),
    }
}

/// Pretty-printed JSON array of the offers, non-ASCII text left as is
pub fn to_json(offers: &[OfferRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(offers)?)
}

/// Writes the export in one go, creating the parent directory if needed
pub fn write_offers(path: &Path, offers: &[OfferRecord]) -> Result<String> {
    let json = to_json(offers)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &json)?;
    ::log::info!("Wrote {} offers to {}", offers.len(), path.display());
    Ok(json)
}
