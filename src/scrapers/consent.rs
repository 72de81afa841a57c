use crate::browser::locator::wait_visible;
use crate::browser::{Element, Locator, Page};
use crate::config::Timings;
use std::time::Duration;

/// Clicks away the cookie consent banner if one shows up.
///
/// Selector-based candidates are tried before role-based ones, each with its
/// own visibility wait. Returns whether a banner was dismissed; an absent
/// banner is not an error.
pub async fn dismiss_consent<P: Page>(
    page: &P,
    buttons: &[Locator],
    roles: &[Locator],
    timings: &Timings,
) -> bool {
    let candidates = buttons
        .iter()
        .map(|locator| (locator, timings.consent_selector_timeout()))
        .chain(
            roles
                .iter()
                .map(|locator| (locator, timings.consent_role_timeout())),
        );

    for (locator, timeout) in candidates {
        if try_click(page, locator, timeout, timings).await {
            ::log::info!("Dismissed consent banner via {}", locator);
            return true;
        }
    }

    ::log::debug!("No consent banner to dismiss");
    false
}

async fn try_click<P: Page>(
    page: &P,
    locator: &Locator,
    timeout: Duration,
    timings: &Timings,
) -> bool {
    let button = match wait_visible(page, locator, timeout, timings.poll_interval()).await {
        Ok(button) => button,
        Err(e) => {
            ::log::trace!("Consent candidate {} not usable: {}", locator, e);
            return false;
        }
    };

    if let Err(e) = button.click().await {
        ::log::debug!("Clicking consent candidate {} failed: {}", locator, e);
        return false;
    }

    tokio::time::sleep(timings.consent_settle()).await;
    true
}
