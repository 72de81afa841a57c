use super::fixtures::{SEARCH_URL, offer_page, results_page};
use crate::browser::document::DocumentSite;
use crate::config::Timings;
use crate::error::ScrapeError;
use crate::offer::OfferRecord;
use crate::scrapers::{JobScraper, Scraper, SiteProfile};

fn scraper(site: &DocumentSite) -> Scraper<DocumentSite> {
    Scraper::new(site.clone(), SiteProfile::apec())
        .with_url(SEARCH_URL)
        .with_timings(Timings::immediate())
}

#[tokio::test]
async fn test_failed_offer_degrades_without_stopping_the_run() {
    let site = DocumentSite::new()
        .with_page(
            SEARCH_URL,
            &results_page(&[("https://x/e1", "Engineer"), ("https://x/e2", "Analyst")]),
        )
        .with_page("https://x/e1", &offer_page("Engineer", "ACME"));

    let offers = scraper(&site).scrape_jobs(20, true).await.unwrap();

    assert_eq!(
        offers,
        vec![
            OfferRecord {
                title: "Engineer".to_string(),
                url: "https://x/e1".to_string(),
                company: Some("ACME".to_string()),
                location: Some("Paris 08 - 75".to_string()),
                contract_type: Some("CDI".to_string()),
                salary: Some("A partir de 50 k€ brut annuel".to_string()),
                publication_date: Some("Publiée le 02/04/2025".to_string()),
                description: Some(
                    "Salaire\nA partir de 50 k€ brut annuel\n\
                     Au sein de l'équipe data,\nvous concevez les pipelines."
                        .to_string()
                ),
            },
            OfferRecord {
                title: "Analyst".to_string(),
                url: "https://x/e2".to_string(),
                company: None,
                location: None,
                contract_type: None,
                salary: None,
                publication_date: None,
                description: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_resources_closed_in_order() {
    let site = DocumentSite::new()
        .with_page(
            SEARCH_URL,
            &results_page(&[("/emploi/detail-offre/1", "Comptable")]),
        )
        .with_page(
            "https://www.apec.fr/emploi/detail-offre/1",
            &offer_page("Comptable H/F", "Cabinet Martin"),
        );

    let offers = scraper(&site).scrape_jobs(5, false).await.unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].title, "Comptable H/F");

    let journal = site.journal().entries();
    assert_eq!(journal[0], "launch headless=false");
    assert_eq!(journal[1], "new context fr-FR");
    assert_eq!(journal[2], "new page");
    assert_eq!(journal[3], format!("goto {SEARCH_URL}"));
    assert!(journal[4].starts_with("click <button id=\"didomi-notice-agree-button\">"));
    assert_eq!(
        journal[5..].to_vec(),
        vec![
            "new page".to_string(),
            "goto https://www.apec.fr/emploi/detail-offre/1".to_string(),
            "close page https://www.apec.fr/emploi/detail-offre/1".to_string(),
            format!("close page {SEARCH_URL}"),
            "close context".to_string(),
            "close browser".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_no_links_gives_empty_result() {
    let site = DocumentSite::new().with_page(SEARCH_URL, &results_page(&[]));

    let offers = scraper(&site).scrape_jobs(20, true).await.unwrap();
    assert!(offers.is_empty());

    let journal = site.journal().entries();
    assert_eq!(journal.last().map(String::as_str), Some("close browser"));
    assert!(journal.contains(&"close page about:blank".to_string()));
}

#[tokio::test]
async fn test_results_page_failure_is_fatal_but_cleans_up() {
    let site = DocumentSite::new();

    let err = scraper(&site).scrape_jobs(20, true).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Navigation { .. }));

    assert_eq!(
        site.journal().entries(),
        vec![
            "launch headless=true".to_string(),
            "new context fr-FR".to_string(),
            "new page".to_string(),
            format!("goto {SEARCH_URL}"),
            "close page about:blank".to_string(),
            "close context".to_string(),
            "close browser".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_one_record_per_harvested_link() {
    let listing = [
        ("/emploi/detail-offre/1", "Un"),
        ("/emploi/detail-offre/2", "Deux"),
        ("/emploi/detail-offre/3", "Trois"),
        ("/emploi/detail-offre/4", "Quatre"),
    ];
    // Only every other offer page can be opened
    let site = DocumentSite::new()
        .with_page(SEARCH_URL, &results_page(&listing))
        .with_page(
            "https://www.apec.fr/emploi/detail-offre/1",
            &offer_page("Un", "A"),
        )
        .with_page(
            "https://www.apec.fr/emploi/detail-offre/3",
            &offer_page("Trois", "C"),
        );

    for max_results in 0..=6 {
        let offers = scraper(&site).scrape_jobs(max_results, true).await.unwrap();

        assert_eq!(offers.len(), max_results.min(listing.len()));
        for (offer, (href, title)) in offers.iter().zip(listing.iter()) {
            assert_eq!(offer.url, format!("https://www.apec.fr{href}"));
            assert_eq!(offer.title, *title);
        }
        for offer in offers.iter().skip(1).step_by(2) {
            assert!(offer.is_degraded());
        }
    }
}

#[tokio::test]
async fn test_raw_pages_saved_for_fetched_offers() {
    let dir = std::env::temp_dir().join(format!("job-harvest-pipeline-raw-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let site = DocumentSite::new()
        .with_page(
            SEARCH_URL,
            &results_page(&[
                ("/emploi/detail-offre/1", "Un"),
                ("/emploi/detail-offre/2", "Deux"),
            ]),
        )
        .with_page(
            "https://www.apec.fr/emploi/detail-offre/1",
            &offer_page("Un", "A"),
        );

    let offers = scraper(&site)
        .with_save_raw(&dir)
        .scrape_jobs(10, true)
        .await
        .unwrap();
    assert_eq!(offers.len(), 2);

    assert!(dir.join("apec_offer_001.html").exists());
    assert!(!dir.join("apec_offer_002.html").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_from_config() {
    let config = crate::config::ScrapeConfig {
        search_url: Some(SEARCH_URL.to_string()),
        ..Default::default()
    };
    let scraper = Scraper::from_config(DocumentSite::new(), SiteProfile::apec(), &config);

    assert_eq!(scraper.search_url(), SEARCH_URL);
    assert_eq!(scraper.name(), "apec");

    let default = Scraper::new(DocumentSite::new(), SiteProfile::apec());
    assert_eq!(default.search_url(), SiteProfile::apec().default_search_url);
}
