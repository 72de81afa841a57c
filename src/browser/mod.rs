//! The browser capabilities the scraping pipeline relies on.
//!
//! The pipeline only ever talks to these traits. `webdriver` drives a real
//! browser through a WebDriver server, `document` serves fixed HTML documents
//! from memory.

pub mod document;
pub mod locator;
pub mod webdriver;

pub use locator::{Condition, Locator};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Something elements can be looked up from: a page, or an element's subtree
#[async_trait]
pub trait Scope: Send + Sync {
    type Element: Element;

    /// All elements matching a CSS selector, in document order
    async fn query(&self, css: &str) -> Result<Vec<Self::Element>>;
}

/// A handle on one element of a rendered page
#[async_trait]
pub trait Element: Scope<Element = Self> + Clone + Sized + 'static {
    /// Rendered text of the element and its descendants
    async fn text(&self) -> Result<String>;

    async fn attr(&self, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self) -> Result<bool>;

    async fn click(&self) -> Result<()>;
}

/// A single browser tab. Operations on one page are never interleaved.
#[async_trait]
pub trait Page: Scope {
    /// Navigates and waits until the document content is loaded
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Full source of the page as currently rendered
    async fn content(&self) -> Result<String>;

    async fn close(self) -> Result<()>;
}

/// A browsing context: shared cookies and locale for all of its pages
#[async_trait]
pub trait Context: Send + Sync {
    type Page: Page;

    async fn new_page(&self) -> Result<Self::Page>;

    async fn close(self) -> Result<()>;
}

#[async_trait]
pub trait Browser: Send + Sync {
    type Context: Context;

    async fn new_context(&self, locale: &str) -> Result<Self::Context>;

    async fn close(self) -> Result<()>;
}

/// Starts browsers
#[async_trait]
pub trait Launcher: Send + Sync {
    type Browser: Browser;

    async fn launch(&self, headless: bool) -> Result<Self::Browser>;
}
