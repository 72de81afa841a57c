use super::profile::{FieldSource, SiteProfile};
use crate::browser::{Page, Scope};
use crate::config::Timings;
use crate::error::Result;
use crate::extract::{first_text, read_nth};
use crate::offer::{LinkEntry, OfferRecord};
use crate::text::clean_block;
use std::path::Path;

/// Where raw offer pages are written, if anywhere
#[derive(Debug, Clone, Copy)]
pub struct RawSnapshots<'a> {
    pub dir: &'a Path,
}

/// Opens one offer in `page` and reads its fields.
///
/// `index` is the 1-based position of the offer in the harvest and numbers
/// the raw snapshot. Every failure is returned as is; deciding what an
/// unreadable offer becomes is up to the caller.
pub async fn fetch_offer<P: Page>(
    page: &mut P,
    link: &LinkEntry,
    index: usize,
    profile: &SiteProfile,
    timings: &Timings,
    raw: Option<RawSnapshots<'_>>,
) -> Result<OfferRecord> {
    page.goto(&link.url, timings.navigation_timeout()).await?;
    tokio::time::sleep(timings.offer_settle()).await;

    if let Some(raw) = raw {
        let path = raw.dir.join(profile.raw_file_name(index));
        let content = page.content().await?;
        tokio::fs::write(&path, content).await?;
        ::log::debug!("Saved raw offer page to {}", path.display());
    }

    let fields = &profile.detail;
    let page = &*page;

    let title = read_field(page, &fields.title).await?;
    let company = read_field(page, &fields.company).await?;
    let location = read_field(page, &fields.location).await?;
    let contract_type = read_field(page, &fields.contract_type).await?;
    let salary = read_field(page, &fields.salary).await?;
    let publication_date = read_field(page, &fields.publication_date).await?;
    let description = read_field(page, &fields.description)
        .await?
        .map(|text| clean_block(&text));

    Ok(OfferRecord {
        title: title.unwrap_or_else(|| link.title.clone()),
        url: link.url.clone(),
        company,
        location,
        contract_type,
        salary,
        publication_date,
        description,
    })
}

async fn read_field<S: Scope>(scope: &S, source: &FieldSource) -> Result<Option<String>> {
    match source {
        FieldSource::FirstOf(candidates) => Ok(first_text(scope, candidates).await),
        FieldSource::Nth(locator, n) => read_nth(scope, locator, *n).await,
    }
}
