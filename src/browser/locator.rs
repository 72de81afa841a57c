use super::{Element, Scope};
use crate::error::{Result, ScrapeError};
use crate::text::contains_text;
use std::fmt;
use std::time::Duration;

/// A condition an element has to satisfy on top of its CSS selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Rendered text contains the value (case and whitespace insensitive)
    HasText(String),

    /// Attribute is present and contains the value (case insensitive)
    AttrContains { name: String, value: String },

    /// Has a descendant matching `css`, optionally one containing `text`
    Has { css: String, text: Option<String> },

    /// `aria-label` or rendered text contains the name
    AccessibleName(String),
}

impl Condition {
    async fn matches<E: Element>(&self, element: &E) -> Result<bool> {
        match self {
            Condition::HasText(text) => Ok(contains_text(&element.text().await?, text)),
            Condition::AttrContains { name, value } => Ok(element
                .attr(name)
                .await?
                .is_some_and(|attr| attr.to_lowercase().contains(&value.to_lowercase()))),
            Condition::Has { css, text } => {
                let children = element.query(css).await?;
                match text {
                    None => Ok(!children.is_empty()),
                    Some(text) => {
                        for child in &children {
                            if contains_text(&child.text().await?, text) {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                }
            }
            Condition::AccessibleName(name) => {
                if let Some(label) = element.attr("aria-label").await? {
                    if contains_text(&label, name) {
                        return Ok(true);
                    }
                }
                Ok(contains_text(&element.text().await?, name))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::HasText(text) => write!(f, ":has-text({text:?})"),
            Condition::AttrContains { name, value } => write!(f, "[{name}*={value:?} i]"),
            Condition::Has { css, text: None } => write!(f, ":has({css})"),
            Condition::Has {
                css,
                text: Some(text),
            } => write!(f, ":has({css}:has-text({text:?}))"),
            Condition::AccessibleName(name) => write!(f, "[name~={name:?}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    css: String,
    all: Vec<Condition>,
    any: Vec<Condition>,
}

impl Step {
    fn new(css: &str) -> Self {
        Self {
            css: css.to_string(),
            all: Vec::new(),
            any: Vec::new(),
        }
    }

    async fn accepts<E: Element>(&self, element: &E) -> Result<bool> {
        for condition in &self.all {
            if !condition.matches(element).await? {
                return Ok(false);
            }
        }

        if self.any.is_empty() {
            return Ok(true);
        }
        for condition in &self.any {
            if condition.matches(element).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Describes how to find zero or more elements.
///
/// A locator is a chain of steps. The first step is looked up from the scope
/// it is resolved against, each further step among the descendants of the
/// previous step's matches. Every step is a CSS selector narrowed by
/// conditions, so that matching on text or on children works the same way
/// whatever the browser backend understands beyond plain CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    pub fn css(css: &str) -> Self {
        Self {
            steps: vec![Step::new(css)],
        }
    }

    /// Elements exposing the given ARIA role whose accessible name contains `name`
    pub fn role(role: &str, name: &str) -> Self {
        let css = format!("{role}, [role='{role}']");
        Self::css(&css).with(Condition::AccessibleName(name.to_string()))
    }

    /// Adds a condition that must hold on the current step
    pub fn with(mut self, condition: Condition) -> Self {
        self.last_step().all.push(condition);
        self
    }

    /// Adds conditions of which at least one must hold on the current step
    pub fn any_of(mut self, conditions: Vec<Condition>) -> Self {
        self.last_step().any.extend(conditions);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with(Condition::HasText(text.to_string()))
    }

    pub fn attr_contains(self, name: &str, value: &str) -> Self {
        self.with(Condition::AttrContains {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn has_with_text(self, css: &str, text: &str) -> Self {
        self.with(Condition::Has {
            css: css.to_string(),
            text: Some(text.to_string()),
        })
    }

    /// Continues the lookup among descendants of the matches so far
    pub fn then(mut self, css: &str) -> Self {
        self.steps.push(Step::new(css));
        self
    }

    fn last_step(&mut self) -> &mut Step {
        // A locator is always built from at least one step
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// All matching elements in document order
    pub async fn resolve<S: Scope>(&self, scope: &S) -> Result<Vec<S::Element>> {
        let mut steps = self.steps.iter();
        let Some(first) = steps.next() else {
            return Ok(Vec::new());
        };

        let mut current = Vec::new();
        for element in scope.query(&first.css).await? {
            if first.accepts(&element).await? {
                current.push(element);
            }
        }

        for step in steps {
            let mut next = Vec::new();
            for parent in &current {
                for element in parent.query(&step.css).await? {
                    if step.accepts(&element).await? {
                        next.push(element);
                    }
                }
            }
            current = next;
        }

        Ok(current)
    }

    /// First matching element, if any
    pub async fn first<S: Scope>(&self, scope: &S) -> Result<Option<S::Element>> {
        Ok(self.resolve(scope).await?.into_iter().next())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", step.css)?;
            for condition in &step.all {
                write!(f, "{condition}")?;
            }
            if !step.any.is_empty() {
                let any = step
                    .any
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(f, ":any({any})")?;
            }
        }
        Ok(())
    }
}

/// First element matching `locator`, if it is displayed right now
async fn visible_now<S: Scope>(scope: &S, locator: &Locator) -> Result<Option<S::Element>> {
    match locator.first(scope).await? {
        Some(element) if element.is_displayed().await? => Ok(Some(element)),
        _ => Ok(None),
    }
}

/// Polls until the first element matching `locator` is displayed.
///
/// Lookup errors during the wait (elements going stale while the page
/// re-renders, say) count as not displayed yet. Returns a timeout error if
/// nothing is displayed within `timeout`.
pub async fn wait_visible<S: Scope>(
    scope: &S,
    locator: &Locator,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<S::Element> {
    let poll = async {
        loop {
            match visible_now(scope, locator).await {
                Ok(Some(element)) => return element,
                Ok(None) => {}
                Err(e) => ::log::trace!("Still waiting for {}: {}", locator, e),
            }
            tokio::time::sleep(poll_interval).await;
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| ScrapeError::timeout(locator.to_string(), timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::document::DocumentPage;

    const LISTING: &str = r#"
        <html><body>
          <nav><a href="/aide">Aide</a></nav>
          <div class="results">
            <a href="/emploi/detail-offre/1" data-cy="job-title-link"><span>Ingénieur</span></a>
            <a href="/emploi/detail-offre/2"><h2>Analyste</h2></a>
            <a href="/emploi/detail-offre/3"><h3>Chef de projet</h3></a>
          </div>
          <div class="details-post"><h4>Contrat</h4><span>CDI</span></div>
          <div class="details-post"><h4>Salaire</h4><span>45 - 55 k€</span></div>
          <button aria-label="Accepter les cookies">OK</button>
          <button>Tout refuser</button>
        </body></html>
    "#;

    fn page() -> DocumentPage {
        DocumentPage::from_html("https://example.test/", LISTING)
    }

    async fn hrefs(page: &DocumentPage, locator: &Locator) -> Vec<String> {
        let mut out = Vec::new();
        for element in locator.resolve(page).await.unwrap() {
            out.push(element.attr("href").await.unwrap().unwrap_or_default());
        }
        out
    }

    #[tokio::test]
    async fn test_plain_css() {
        let page = page();
        let locator = Locator::css("a[href*='/emploi/detail-offre/']");
        assert_eq!(
            hrefs(&page, &locator).await,
            vec![
                "/emploi/detail-offre/1",
                "/emploi/detail-offre/2",
                "/emploi/detail-offre/3"
            ]
        );
    }

    #[tokio::test]
    async fn test_any_of_keeps_document_order() {
        let page = page();
        let locator = Locator::css("a").any_of(vec![
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
        ]);

        assert_eq!(
            hrefs(&page, &locator).await,
            vec![
                "/emploi/detail-offre/1",
                "/emploi/detail-offre/2",
                "/emploi/detail-offre/3"
            ]
        );
    }

    #[tokio::test]
    async fn test_descendant_step_after_has_with_text() {
        let page = page();
        let locator = Locator::css(".details-post")
            .has_with_text("h4", "Salaire")
            .then("span");

        let found = locator.resolve(&page).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text().await.unwrap(), "45 - 55 k€");
    }

    #[tokio::test]
    async fn test_role_matches_aria_label() {
        let page = page();

        let accept = Locator::role("button", "accepter");
        let found = accept.first(&page).await.unwrap().unwrap();
        assert_eq!(found.text().await.unwrap(), "OK");

        let missing = Locator::role("button", "Tout accepter");
        assert!(missing.first(&page).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wait_visible_times_out() {
        let page = page();
        let locator = Locator::css("#didomi-notice-agree-button");

        let err = wait_visible(
            &page,
            &locator,
            Duration::from_millis(30),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_display() {
        let locator = Locator::css("apec-poste-informations .details-post")
            .has_with_text("h4", "Salaire")
            .then("span");
        assert_eq!(
            locator.to_string(),
            "apec-poste-informations .details-post:has(h4:has-text(\"Salaire\")) >> span"
        );
    }
}
