use serde::{Deserialize, Serialize};

/// One scraped job posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    /// Title from the detail page, or the one harvested from the results list
    pub title: String,

    /// Absolute URL of the detail page
    pub url: String,

    pub company: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary: Option<String>,
    pub publication_date: Option<String>,
    pub description: Option<String>,
}

impl OfferRecord {
    /// Record for an offer whose detail page could not be read: only the
    /// harvested title and URL are known.
    pub fn degraded(link: &LinkEntry) -> Self {
        Self {
            title: link.title.clone(),
            url: link.url.clone(),
            company: None,
            location: None,
            contract_type: None,
            salary: None,
            publication_date: None,
            description: None,
        }
    }

    /// True when none of the optional fields could be filled in
    pub fn is_degraded(&self) -> bool {
        self.company.is_none()
            && self.location.is_none()
            && self.contract_type.is_none()
            && self.salary.is_none()
            && self.publication_date.is_none()
            && self.description.is_none()
    }
}

/// A detail-page link found on the results page, with a best-effort title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub title: String,
    pub url: String,
}

impl LinkEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}
