//! A browser over fixed HTML documents held in memory.
//!
//! Pages are looked up by exact URL; navigating anywhere else fails the way a
//! dead link would. Elements are kept as the chain of `(selector, index)`
//! lookups that found them and are re-resolved against the parsed document on
//! every use, so handles stay cheap to clone and free of borrows.
//!
//! Everything done through the browser is written to a shared journal that can
//! be inspected afterwards.

use super::{Browser, Context, Element, Launcher, Page, Scope};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BLANK: &str = "about:blank";

/// Shared, append-only record of browser activity
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, entry: String) {
        ::log::trace!("document browser: {}", entry);
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry);
        }
    }

    /// Everything recorded so far, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

/// A set of pages keyed by URL. Acts as the launcher of the document browser.
#[derive(Debug, Clone, Default)]
pub struct DocumentSite {
    pages: HashMap<String, Arc<str>>,
    journal: Journal,
}

impl DocumentSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Arc::from(html));
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

#[async_trait]
impl Launcher for DocumentSite {
    type Browser = DocumentBrowser;

    async fn launch(&self, headless: bool) -> Result<DocumentBrowser> {
        self.journal.record(format!("launch headless={headless}"));
        Ok(DocumentBrowser { site: self.clone() })
    }
}

pub struct DocumentBrowser {
    site: DocumentSite,
}

#[async_trait]
impl Browser for DocumentBrowser {
    type Context = DocumentContext;

    async fn new_context(&self, locale: &str) -> Result<DocumentContext> {
        self.site.journal.record(format!("new context {locale}"));
        Ok(DocumentContext {
            site: self.site.clone(),
        })
    }

    async fn close(self) -> Result<()> {
        self.site.journal.record("close browser".to_string());
        Ok(())
    }
}

pub struct DocumentContext {
    site: DocumentSite,
}

#[async_trait]
impl Context for DocumentContext {
    type Page = DocumentPage;

    async fn new_page(&self) -> Result<DocumentPage> {
        self.site.journal.record("new page".to_string());
        Ok(DocumentPage {
            url: BLANK.to_string(),
            html: Arc::from(""),
            pages: self.site.pages.clone(),
            journal: self.site.journal.clone(),
        })
    }

    async fn close(self) -> Result<()> {
        self.site.journal.record("close context".to_string());
        Ok(())
    }
}

/// One tab of the document browser
#[derive(Debug, Clone)]
pub struct DocumentPage {
    url: String,
    html: Arc<str>,
    pages: HashMap<String, Arc<str>>,
    journal: Journal,
}

impl DocumentPage {
    /// A standalone page already showing `html`
    pub fn from_html(url: &str, html: &str) -> Self {
        let html: Arc<str> = Arc::from(html);
        let mut pages = HashMap::new();
        pages.insert(url.to_string(), html.clone());
        Self {
            url: url.to_string(),
            html,
            pages,
            journal: Journal::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn element(&self, path: Vec<(String, usize)>) -> DocumentElement {
        DocumentElement {
            html: self.html.clone(),
            path,
            journal: self.journal.clone(),
        }
    }
}

#[async_trait]
impl Scope for DocumentPage {
    type Element = DocumentElement;

    async fn query(&self, css: &str) -> Result<Vec<DocumentElement>> {
        let selector = parse_selector(css)?;
        let count = Html::parse_document(&self.html).select(&selector).count();
        Ok((0..count)
            .map(|i| self.element(vec![(css.to_string(), i)]))
            .collect())
    }
}

#[async_trait]
impl Page for DocumentPage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.journal.record(format!("goto {url}"));
        match self.pages.get(url) {
            Some(html) => {
                self.url = url.to_string();
                self.html = html.clone();
                Ok(())
            }
            None => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "no such document".to_string(),
            }),
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html.to_string())
    }

    async fn close(self) -> Result<()> {
        self.journal.record(format!("close page {}", self.url));
        Ok(())
    }
}

/// Element of a [`DocumentPage`], addressed by the lookups that found it
#[derive(Debug, Clone)]
pub struct DocumentElement {
    html: Arc<str>,
    path: Vec<(String, usize)>,
    journal: Journal,
}

impl DocumentElement {
    /// Parses the document, walks to this element and hands it to `f`
    fn with_ref<R>(&self, f: impl FnOnce(ElementRef<'_>) -> R) -> Result<R> {
        let document = Html::parse_document(&self.html);
        let mut current: Option<ElementRef<'_>> = None;

        for (css, index) in &self.path {
            let selector = parse_selector(css)?;
            let found = match current {
                None => document.select(&selector).nth(*index),
                Some(parent) => parent.select(&selector).nth(*index),
            };
            current = Some(found.ok_or_else(|| ScrapeError::StaleElement(self.describe()))?);
        }

        current
            .map(f)
            .ok_or_else(|| ScrapeError::StaleElement(self.describe()))
    }

    fn describe(&self) -> String {
        self.path
            .iter()
            .map(|(css, index)| format!("{css}[{index}]"))
            .collect::<Vec<_>>()
            .join(" >> ")
    }
}

#[async_trait]
impl Scope for DocumentElement {
    type Element = DocumentElement;

    async fn query(&self, css: &str) -> Result<Vec<DocumentElement>> {
        let selector = parse_selector(css)?;
        let count = self.with_ref(|element| element.select(&selector).count())?;
        Ok((0..count)
            .map(|i| {
                let mut path = self.path.clone();
                path.push((css.to_string(), i));
                DocumentElement {
                    html: self.html.clone(),
                    path,
                    journal: self.journal.clone(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl Element for DocumentElement {
    async fn text(&self) -> Result<String> {
        self.with_ref(|element| element.text().collect::<String>())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        self.with_ref(|element| element.value().attr(name).map(str::to_string))
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.with_ref(|element| {
            !std::iter::once(element)
                .chain(element.ancestors().filter_map(ElementRef::wrap))
                .any(is_hidden)
        })
    }

    async fn click(&self) -> Result<()> {
        let target = self.with_ref(|element| element.html())?;
        self.journal.record(format!("click {target}"));
        Ok(())
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let style = style.replace(' ', "").to_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}
