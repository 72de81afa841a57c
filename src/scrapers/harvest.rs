use super::profile::SiteProfile;
use crate::browser::locator::wait_visible;
use crate::browser::{Element, Page};
use crate::config::Timings;
use crate::error::Result;
use crate::extract::first_text;
use crate::offer::LinkEntry;
use crate::text::first_line;
use std::collections::HashSet;
use url::Url;

/// Collects up to `max_results` distinct offer links from a results page, in
/// document order.
///
/// Waits for anchors matching the site's offer link pattern; if none become
/// visible in time the broader fallback lookup is used instead.
pub async fn harvest_links<P: Page>(
    page: &P,
    profile: &SiteProfile,
    max_results: usize,
    timings: &Timings,
) -> Result<Vec<LinkEntry>> {
    if max_results == 0 {
        return Ok(Vec::new());
    }

    let locator = match wait_visible(
        page,
        &profile.offer_links,
        timings.results_wait(),
        timings.poll_interval(),
    )
    .await
    {
        Ok(_) => &profile.offer_links,
        Err(e) if e.is_timeout() => {
            ::log::info!(
                "No offer links matched {}, falling back to {}",
                profile.offer_links,
                profile.offer_links_fallback
            );
            &profile.offer_links_fallback
        }
        Err(e) => return Err(e),
    };

    let anchors = locator.resolve(page).await?;
    ::log::debug!("Found {} candidate anchors", anchors.len());

    let mut links = Vec::new();
    let mut seen_urls = HashSet::new();

    for anchor in anchors {
        if links.len() >= max_results {
            break;
        }

        let Some(href) = anchor.attr("href").await?.filter(|h| !h.is_empty()) else {
            continue;
        };

        let url = match resolve_offer_url(profile.origin, &href) {
            Ok(url) => url,
            Err(e) => {
                ::log::debug!("Skipping unresolvable href {:?}: {}", href, e);
                continue;
            }
        };
        if seen_urls.contains(&url) {
            continue;
        }

        let title = link_title(&anchor, profile).await?;
        ::log::debug!("Harvested {:?} -> {}", title, url);

        seen_urls.insert(url.clone());
        links.push(LinkEntry::new(title, url));
    }

    ::log::info!("Harvested {} offer links", links.len());
    Ok(links)
}

/// Absolute URL for an offer href. Absolute `http(s)` hrefs are kept as they
/// are, anything else is resolved against the site origin.
pub fn resolve_offer_url(origin: &str, href: &str) -> Result<String> {
    if href.starts_with("http") {
        return Ok(href.to_string());
    }
    Ok(Url::parse(origin)?.join(href)?.to_string())
}

/// Best-effort title of an offer anchor
async fn link_title<E: Element>(anchor: &E, profile: &SiteProfile) -> Result<String> {
    if let Some(title) = first_text(anchor, &profile.link_title).await {
        return Ok(title);
    }

    let text = anchor.text().await?;
    let line = first_line(&text);
    if line.is_empty() {
        Ok(profile.untitled.to_string())
    } else {
        Ok(line.to_string())
    }
}
