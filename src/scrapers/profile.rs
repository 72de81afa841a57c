use crate::browser::{Condition, Locator};

/// How one field of an offer is read from its detail page
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// First candidate yielding text wins; lookup failures are tolerated
    FirstOf(Vec<Locator>),

    /// The `n`th match of a locator with a known position; lookup failures
    /// abort the offer
    Nth(Locator, usize),
}

/// Where the fields of an offer live on its detail page
#[derive(Debug, Clone)]
pub struct DetailFields {
    pub title: FieldSource,
    pub company: FieldSource,
    pub location: FieldSource,
    pub contract_type: FieldSource,
    pub salary: FieldSource,
    pub publication_date: FieldSource,
    pub description: FieldSource,
}

/// Everything that ties the pipeline to one job board
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Short source name, used for output and raw file names
    pub name: &'static str,

    /// Origin relative offer links are resolved against
    pub origin: &'static str,

    /// Search used when none is configured
    pub default_search_url: &'static str,

    /// Browser locale the site is visited with
    pub locale: &'static str,

    /// Anchors pointing at offer detail pages
    pub offer_links: Locator,

    /// Broader anchor lookup used when `offer_links` finds nothing in time
    pub offer_links_fallback: Locator,

    /// Title-like elements inside an offer anchor
    pub link_title: Vec<Locator>,

    /// Title given to a link when nothing better is found
    pub untitled: &'static str,

    /// Consent buttons found by selector, in priority order
    pub consent_buttons: Vec<Locator>,

    /// Consent buttons found by role and accessible name, in priority order
    pub consent_roles: Vec<Locator>,

    pub detail: DetailFields,
}

const APEC_SEARCH_URL: &str = concat!(
    "https://www.apec.fr/candidat/recherche-emploi.html/emploi?",
    "typesConvention=143684&typesConvention=143685&typesConvention=143686&typesConvention=143687",
    "&at_medium=sl&at_campaign=marque&at_platform=google&at_creation=marque_candidat",
    "&at_variant=&at_network=&at_term=apec%20offre%20d%20emploi&gclsrc=aw.ds&gad_source=1",
    "&gad_campaignid=7976498296&gbraid=0AAAAAD_P-vbpYbar1CMrXnwT2baZz9a0K",
    "&gclid=Cj0KCQiAubrJBhCbARIsAHIdxD-ZZBBupvlv0F81Yq1DSYwD14UVKem_1TjucNs-n7YX-_WYJnhS0ocaAnP_EALw_wcB",
    "&fonctions=101807&lieux=720",
);

/// Affirmative consent wording used on French sites
const CONSENT_PHRASES: [&str; 4] = ["Tout accepter", "Accepter", "J’accepte", "J'accepte"];

const METADATA_ITEMS: &str = "apec-offre-metadata ul.details-offer-list li";

impl SiteProfile {
    /// The APEC job board (apec.fr)
    pub fn apec() -> Self {
        let mut consent_buttons: Vec<Locator> = CONSENT_PHRASES
            .iter()
            .map(|phrase| Locator::css("button").with_text(phrase))
            .collect();
        consent_buttons.extend([
            Locator::css("#didomi-notice-agree-button"),
            Locator::css("button[id*='agree']"),
            Locator::css("button").attr_contains("aria-label", "accepter"),
        ]);

        Self {
            name: "apec",
            origin: "https://www.apec.fr",
            default_search_url: APEC_SEARCH_URL,
            locale: "fr-FR",
            offer_links: Locator::css("a[href*='/emploi/detail-offre/']"),
            offer_links_fallback: Locator::css("a").any_of(vec![
                Condition::AttrContains {
                    name: "data-cy".to_string(),
                    value: "job-title".to_string(),
                },
                Condition::Has {
                    css: "h2".to_string(),
                    text: None,
                },
                Condition::Has {
                    css: "h3".to_string(),
                    text: None,
                },
            ]),
            link_title: vec![
                Locator::css("h2"),
                Locator::css("h3"),
                Locator::css("[data-cy*='title']"),
            ],
            untitled: "Offre sans titre",
            consent_buttons,
            consent_roles: CONSENT_PHRASES
                .iter()
                .map(|phrase| Locator::role("button", phrase))
                .collect(),
            detail: DetailFields {
                title: FieldSource::FirstOf(vec![
                    Locator::css("h1[data-cy='job-title']"),
                    Locator::css("main h1"),
                    Locator::css("h1"),
                ]),
                company: FieldSource::Nth(Locator::css(METADATA_ITEMS), 0),
                contract_type: FieldSource::Nth(Locator::css(METADATA_ITEMS), 1),
                location: FieldSource::Nth(Locator::css(METADATA_ITEMS), 2),
                salary: FieldSource::Nth(
                    Locator::css("apec-poste-informations .details-post")
                        .has_with_text("h4", "Salaire")
                        .then("span"),
                    0,
                ),
                publication_date: FieldSource::Nth(
                    Locator::css("apec-offre-metadata .date-offre").with_text("Publiée"),
                    0,
                ),
                description: FieldSource::Nth(Locator::css("apec-poste-informations"), 0),
            },
        }
    }

    /// Name of the raw HTML snapshot of the `index`th offer (1-based)
    pub fn raw_file_name(&self, index: usize) -> String {
        format!("{}_offer_{:03}.html", self.name, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_file_name() {
        let profile = SiteProfile::apec();
        assert_eq!(profile.raw_file_name(1), "apec_offer_001.html");
        assert_eq!(profile.raw_file_name(42), "apec_offer_042.html");
        assert_eq!(profile.raw_file_name(1234), "apec_offer_1234.html");
    }

    #[test]
    fn test_consent_priority() {
        let profile = SiteProfile::apec();

        assert_eq!(profile.consent_buttons.len(), 7);
        assert_eq!(
            profile.consent_buttons[0].to_string(),
            "button:has-text(\"Tout accepter\")"
        );
        assert_eq!(
            profile.consent_buttons[4].to_string(),
            "#didomi-notice-agree-button"
        );
        assert_eq!(profile.consent_roles.len(), 4);
    }

    #[test]
    fn test_default_search_url() {
        let profile = SiteProfile::apec();
        assert!(profile.default_search_url.starts_with(profile.origin));
        assert!(profile.default_search_url.ends_with("&fonctions=101807&lieux=720"));
    }
}
