use super::{Browser, Context, Element, Launcher, Page, Scope};
use crate::config::Timings;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use fantoccini::elements::Element as WdElement;
use fantoccini::error::NewSessionError;
use fantoccini::wd::{Capabilities, WindowHandle};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Local ports WebDriver servers commonly listen on, tried when the
/// configured server refuses a session
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://localhost:4723", // Appium default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Launches browsers through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    page_load_timeout: Duration,
}

impl WebDriverLauncher {
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            page_load_timeout: Timings::default().navigation_timeout(),
        }
    }

    /// How long the browser itself may spend loading a page before giving up
    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    type Browser = WebDriverBrowser;

    async fn launch(&self, headless: bool) -> Result<WebDriverBrowser> {
        ::log::info!(
            "Using WebDriver at {} (headless: {})",
            self.webdriver_url,
            headless
        );
        Ok(WebDriverBrowser {
            webdriver_url: self.webdriver_url.clone(),
            headless,
            page_load_timeout: self.page_load_timeout,
        })
    }
}

/// The WebDriver server and the way browsers are started on it. Each
/// context is its own WebDriver session.
pub struct WebDriverBrowser {
    webdriver_url: String,
    headless: bool,
    page_load_timeout: Duration,
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Context = WebDriverContext;

    async fn new_context(&self, locale: &str) -> Result<WebDriverContext> {
        let capabilities = session_capabilities(self.headless, locale, self.page_load_timeout);
        let client = connect_to_webdriver(&self.webdriver_url, capabilities).await?;
        Ok(WebDriverContext {
            client,
            initial_window_used: AtomicBool::new(false),
        })
    }

    async fn close(self) -> Result<()> {
        // The server outlives us; the sessions were ended with their contexts
        ::log::debug!("Released WebDriver at {}", self.webdriver_url);
        Ok(())
    }
}

/// Capabilities requesting a browser in `locale` that reports navigation as
/// done once the document content is loaded.
///
/// The browser abandons a page load after `page_load_timeout`, so a hung
/// navigation does not hold up the commands queued behind it.
pub fn session_capabilities(
    headless: bool,
    locale: &str,
    page_load_timeout: Duration,
) -> Capabilities {
    let mut chrome_args = vec![
        format!("--lang={locale}"),
        "--window-size=1366,900".to_string(),
    ];
    let mut firefox_args = Vec::new();
    if headless {
        chrome_args.push("--headless=new".to_string());
        chrome_args.push("--disable-gpu".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert("pageLoadStrategy".to_string(), json!("eager"));
    capabilities.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": page_load_timeout.as_millis() as u64 }),
    );
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": chrome_args,
            "prefs": { "intl.accept_languages": locale },
        }),
    );
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "intl.accept_languages": locale },
        }),
    );
    capabilities
}

/// Connects to the WebDriver server, trying common local alternatives if the
/// configured one fails
async fn connect_to_webdriver(webdriver_url: &str, capabilities: Capabilities) -> Result<Client> {
    let first_error = match try_connect(webdriver_url, &capabilities).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
            e
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = try_connect(url, &capabilities).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(first_error.into())
}

async fn try_connect(
    webdriver_url: &str,
    capabilities: &Capabilities,
) -> std::result::Result<Client, NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    builder.connect(webdriver_url).await
}

/// One WebDriver session. Its pages are windows of the session.
pub struct WebDriverContext {
    client: Client,
    initial_window_used: AtomicBool,
}

#[async_trait]
impl Context for WebDriverContext {
    type Page = WebDriverPage;

    async fn new_page(&self) -> Result<WebDriverPage> {
        // A fresh session already has one window; hand that out first
        let window = if !self.initial_window_used.swap(true, Ordering::SeqCst) {
            self.client.window().await?
        } else {
            self.client.new_window(true).await?.handle
        };
        self.client.switch_to_window(window.clone()).await?;

        Ok(WebDriverPage {
            client: self.client.clone(),
            window,
        })
    }

    async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// A window of a WebDriver session. Page-level commands first make the window
/// current, since WebDriver commands apply to whichever window is current.
pub struct WebDriverPage {
    client: Client,
    window: WindowHandle,
}

impl WebDriverPage {
    async fn activate(&self) -> Result<()> {
        self.client.switch_to_window(self.window.clone()).await?;
        Ok(())
    }
}

#[async_trait]
impl Scope for WebDriverPage {
    type Element = WebDriverElement;

    async fn query(&self, css: &str) -> Result<Vec<WebDriverElement>> {
        self.activate().await?;
        let found = self.client.find_all(fantoccini::Locator::Css(css)).await?;
        Ok(found.into_iter().map(WebDriverElement).collect())
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.activate().await?;
        match tokio::time::timeout(timeout, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(navigation_error(e, url)),
            Err(_) => Err(ScrapeError::timeout(format!("navigation to {url}"), timeout)),
        }
    }

    async fn content(&self) -> Result<String> {
        self.activate().await?;
        Ok(self.client.source().await?)
    }

    async fn close(self) -> Result<()> {
        // Closing the last window ends the session, which is the context's job
        if self.client.windows().await?.len() <= 1 {
            return Ok(());
        }
        self.activate().await?;
        self.client.close_window().await?;
        Ok(())
    }
}

/// Turns a failed navigation into an error, noting lost sessions separately
fn navigation_error(error: fantoccini::error::CmdError, url: &str) -> ScrapeError {
    let reason = error.to_string();
    if reason.contains("Unable to find session") || reason.contains("invalid session id") {
        ::log::warn!("Lost WebDriver session while accessing {}", url);
    } else {
        ::log::debug!("Failed to access {}: {}", url, reason);
    }
    ScrapeError::Navigation {
        url: url.to_string(),
        reason,
    }
}

#[derive(Debug, Clone)]
pub struct WebDriverElement(WdElement);

#[async_trait]
impl Scope for WebDriverElement {
    type Element = WebDriverElement;

    async fn query(&self, css: &str) -> Result<Vec<WebDriverElement>> {
        let found = self.0.find_all(fantoccini::Locator::Css(css)).await?;
        Ok(found.into_iter().map(WebDriverElement).collect())
    }
}

#[async_trait]
impl Element for WebDriverElement {
    async fn text(&self) -> Result<String> {
        Ok(self.0.text().await?)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.attr(name).await?)
    }

    async fn is_displayed(&self) -> Result<bool> {
        Ok(self.0.is_displayed().await?)
    }

    async fn click(&self) -> Result<()> {
        self.0.click().await?;
        Ok(())
    }
}
