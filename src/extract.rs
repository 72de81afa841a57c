//! Reading field values off a page.

use crate::browser::{Element, Locator, Scope};
use crate::error::Result;
use crate::text::non_empty;
use std::future::Future;
use std::pin::Pin;

/// A pending fallible lookup, boxed so lookups over different locators share a type
pub type Lookup<'a, T> = Pin<Box<dyn Future<Output = Result<Option<T>>> + Send + 'a>>;

/// Tries lookups in order and returns the first value found.
///
/// A lookup that fails or finds nothing is skipped; failures are only logged.
/// Returns `None` once every lookup has been tried. Lookups are lazy, so
/// nothing after the first hit is evaluated.
pub async fn first_present<T, F, I>(lookups: I) -> Option<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<Option<T>>>,
{
    for lookup in lookups {
        match lookup.await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => continue,
            Err(e) => {
                ::log::debug!("Lookup failed, trying next candidate: {}", e);
                continue;
            }
        }
    }
    None
}

/// Trimmed text of the first element `locator` finds, or `None` if it finds
/// nothing or only whitespace
pub async fn first_match_text<S: Scope>(scope: &S, locator: &Locator) -> Result<Option<String>> {
    match locator.first(scope).await? {
        Some(element) => Ok(non_empty(&element.text().await?)),
        None => Ok(None),
    }
}

/// Text of the first candidate that yields any, trying candidates in order
pub async fn first_text<S: Scope>(scope: &S, candidates: &[Locator]) -> Option<String> {
    let lookups: Vec<Lookup<'_, String>> = candidates
        .iter()
        .map(|locator| Box::pin(first_match_text(scope, locator)) as Lookup<'_, String>)
        .collect();
    first_present(lookups).await
}

/// Direct read of the `n`th match of a locator whose position on the page is
/// known. Too few matches or blank text give `None`; browser errors are
/// returned to the caller.
pub async fn read_nth<S: Scope>(scope: &S, locator: &Locator, n: usize) -> Result<Option<String>> {
    let mut found = locator.resolve(scope).await?;
    if n >= found.len() {
        return Ok(None);
    }
    let element = found.swap_remove(n);
    Ok(non_empty(&element.text().await?))
}
