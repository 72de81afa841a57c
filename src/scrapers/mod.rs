//! Scraping a job board: results page, offer links, offer details.

pub mod consent;
pub mod detail;
pub mod harvest;
pub mod profile;

#[cfg(test)]
mod tests;

pub use profile::SiteProfile;

use crate::browser::{Browser, Context, Launcher, Page};
use crate::config::{ScrapeConfig, Timings};
use crate::error::Result;
use crate::offer::{LinkEntry, OfferRecord};
use async_trait::async_trait;
use detail::RawSnapshots;
use std::future::Future;
use std::path::PathBuf;

/// A source of job offers
#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Short name of the source, used to name output files
    fn name(&self) -> &'static str;

    /// Scrapes at most `max_results` offers, in the order the source lists them
    async fn scrape_jobs(&self, max_results: usize, headless: bool) -> Result<Vec<OfferRecord>>;
}

/// Drives a browser through a site's results page and offer pages.
///
/// One browser and one context are used for the whole run. The results page
/// and a single offer page are opened in that context; offers are fetched one
/// after another in the offer page. An offer that cannot be read is kept as a
/// degraded record. Everything opened is closed again before returning,
/// whatever happened.
pub struct Scraper<L> {
    launcher: L,
    profile: SiteProfile,
    search_url: String,
    locale: String,
    raw_dir: Option<PathBuf>,
    timings: Timings,
}

impl<L: Launcher> Scraper<L> {
    pub fn new(launcher: L, profile: SiteProfile) -> Self {
        Self {
            launcher,
            search_url: profile.default_search_url.to_string(),
            locale: profile.locale.to_string(),
            profile,
            raw_dir: None,
            timings: Timings::default(),
        }
    }

    /// Scraper for `profile` set up from a run configuration
    pub fn from_config(launcher: L, profile: SiteProfile, config: &ScrapeConfig) -> Self {
        let mut scraper = Self::new(launcher, profile).with_timings(config.timings);
        if let Some(url) = &config.search_url {
            scraper = scraper.with_url(url);
        }
        if let Some(locale) = &config.locale {
            scraper = scraper.with_locale(locale);
        }
        if config.save_raw {
            scraper = scraper.with_save_raw(config.raw_dir.clone());
        }
        scraper
    }

    /// Start from this search instead of the site's default one
    pub fn with_url(mut self, url: &str) -> Self {
        self.search_url = url.to_string();
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    /// Keep the rendered HTML of every offer page in `dir`
    pub fn with_save_raw(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = Some(dir.into());
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Opens the results page and the offer page in `context` and runs the
    /// scrape in them
    async fn scrape_in<C: Context>(&self, context: &C, max_results: usize) -> Result<Vec<OfferRecord>> {
        let mut results_page = context.new_page().await?;
        let links = match self.harvest(&mut results_page, max_results).await {
            Ok(links) => links,
            Err(e) => {
                close_logged("results page", results_page.close()).await;
                return Err(e);
            }
        };

        let mut offer_page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                close_logged("results page", results_page.close()).await;
                return Err(e);
            }
        };

        let offers = self.fetch_all(&mut offer_page, &links).await;

        close_logged("offer page", offer_page.close()).await;
        close_logged("results page", results_page.close()).await;
        Ok(offers)
    }

    /// Loads the search results, clears the consent banner and collects the
    /// offer links
    async fn harvest<P: Page>(&self, page: &mut P, max_results: usize) -> Result<Vec<LinkEntry>> {
        ::log::info!("Loading results page {}", self.search_url);
        page.goto(&self.search_url, self.timings.navigation_timeout())
            .await?;

        consent::dismiss_consent(
            &*page,
            &self.profile.consent_buttons,
            &self.profile.consent_roles,
            &self.timings,
        )
        .await;
        tokio::time::sleep(self.timings.results_settle()).await;

        harvest::harvest_links(&*page, &self.profile, max_results, &self.timings).await
    }

    /// Fetches every offer in order. Never fails: an offer that cannot be
    /// read becomes a degraded record.
    async fn fetch_all<P: Page>(&self, page: &mut P, links: &[LinkEntry]) -> Vec<OfferRecord> {
        let raw = self
            .raw_dir
            .as_deref()
            .map(|dir| RawSnapshots { dir });
        let mut offers = Vec::with_capacity(links.len());

        for (i, link) in links.iter().enumerate() {
            let index = i + 1;
            ::log::info!("Fetching offer {}/{}: {}", index, links.len(), link.url);

            match detail::fetch_offer(page, link, index, &self.profile, &self.timings, raw).await {
                Ok(offer) => offers.push(offer),
                Err(e) => {
                    ::log::warn!(
                        "Could not read offer {} ({}), keeping listing data only: {}",
                        index,
                        link.url,
                        e
                    );
                    offers.push(OfferRecord::degraded(link));
                }
            }
        }

        offers
    }
}

#[async_trait]
impl<L: Launcher> JobScraper for Scraper<L> {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    async fn scrape_jobs(&self, max_results: usize, headless: bool) -> Result<Vec<OfferRecord>> {
        let browser = self.launcher.launch(headless).await?;
        let context = match browser.new_context(&self.locale).await {
            Ok(context) => context,
            Err(e) => {
                close_logged("browser", browser.close()).await;
                return Err(e);
            }
        };

        let outcome = self.scrape_in(&context, max_results).await;

        close_logged("browsing context", context.close()).await;
        close_logged("browser", browser.close()).await;

        if let Ok(offers) = &outcome {
            let degraded = offers.iter().filter(|o| o.is_degraded()).count();
            ::log::info!(
                "Scraped {} offers from {} ({} degraded)",
                offers.len(),
                self.profile.name,
                degraded
            );
        }
        outcome
    }
}

/// Awaits a close operation; failures are logged and otherwise ignored
async fn close_logged(what: &str, closing: impl Future<Output = Result<()>>) {
    if let Err(e) = closing.await {
        ::log::warn!("Failed to close {}: {}", what, e);
    }
}
