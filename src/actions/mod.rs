//! Wait-gated interaction layer
//!
//! Every primitive first waits for its target to become visible (first match only),
//! then acts. A timeout surfaces as [`PilotError::ElementNotReady`]. The one exception is
//! [`Actions::is_visible`], which never fails and reports absence as `false`.
//!
//! Page-level components depend on the [`Actions`] capability trait rather than on a
//! concrete driver, so the orchestrators can be exercised against a scripted page.

pub mod chrome;

pub use chrome::ChromeActions;

use crate::error::{PilotError, Result};
use serde::{Deserialize, Serialize};
use std::{fmt,
          time::{Duration, Instant}};

/// How an element is located
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "query", rename_all = "lowercase")]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(query: impl Into<String>) -> Self {
        Selector::Css(query.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Selector::XPath(query.into())
    }

    /// Button whose text contains `text`
    pub fn button_with_text(text: &str) -> Self {
        Selector::XPath(format!("//button[contains(normalize-space(.), {})]", xpath_literal(text)))
    }

    /// Any element whose own normalized text equals `text` exactly
    pub fn exact_text(text: &str) -> Self {
        Selector::XPath(format!("//*[normalize-space(text())={}]", xpath_literal(text)))
    }

    /// Address the n-th match (1-based) of this selector
    pub fn nth(&self, position: usize) -> Result<Selector> {
        match self {
            Selector::XPath(query) if position > 0 => Ok(Selector::XPath(format!("({})[{}]", query, position))),
            Selector::XPath(query) => Err(PilotError::InvalidSelector {
                selector: query.clone(),
                reason: "positions are 1-based".to_string(),
            }),
            Selector::Css(query) => Err(PilotError::InvalidSelector {
                selector: query.clone(),
                reason: "only XPath selectors can be indexed".to_string(),
            }),
        }
    }

    /// Append a relative XPath step (e.g. `//a`) to an XPath selector
    pub fn descendant(&self, step: &str) -> Result<Selector> {
        match self {
            Selector::XPath(query) => Ok(Selector::XPath(format!("{}{}", query, step))),
            Selector::Css(query) => Err(PilotError::InvalidSelector {
                selector: query.clone(),
                reason: "descendant steps require an XPath selector".to_string(),
            }),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(query) => write!(f, "css:{}", query),
            Selector::XPath(query) => write!(f, "xpath:{}", query),
        }
    }
}

/// Quote a string for use inside an XPath expression
pub(crate) fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Point in time a wait gives up at; unbounded when the timeout does not fit in an `Instant`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Outcome of a visibility probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Nothing matched the selector when the probe gave up
    NotFound,
    /// Something matched but never became visible
    TimedOut,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Point-in-time view of one matched element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub visible: bool,
    pub text: String,
}

impl ElementSnapshot {
    pub fn new(visible: bool, text: impl Into<String>) -> Self {
        Self { visible, text: text.into() }
    }
}

/// Capability interface over a single browsing context
pub trait Actions {
    /// Navigate and wait for the load to finish
    fn navigate(&self, url: &str) -> Result<()>;

    /// Block until the first match is visible
    fn wait_visible(&self, selector: &Selector) -> Result<()>;

    /// Wait for the first match, scroll it into view, then click it
    fn click(&self, selector: &Selector) -> Result<()>;

    /// Wait for the first match, clear it, then type `text`
    fn fill(&self, selector: &Selector, text: &str) -> Result<()>;

    /// Send a key press to the focused element
    fn press_key(&self, key: &str) -> Result<()>;

    /// Text of the first match
    fn read_text(&self, selector: &Selector) -> Result<String>;

    /// Text of every match in document order, after at least one is visible
    fn read_all_texts(&self, selector: &Selector) -> Result<Vec<String>>;

    /// Visibility and text of every current match, without waiting
    fn snapshot_all(&self, selector: &Selector) -> Result<Vec<ElementSnapshot>>;

    /// Bounded visibility check that never fails
    fn probe(&self, selector: &Selector) -> Visibility;

    fn is_visible(&self, selector: &Selector) -> bool {
        let outcome = self.probe(selector);
        if !outcome.is_visible() {
            log::debug!("{} not visible ({:?})", selector, outcome);
        }
        outcome.is_visible()
    }

    /// Unconditional settle wait
    fn pause(&self, duration: Duration);

    fn current_url(&self) -> Result<String>;

    /// Click `trigger` and return the browsing context it opens
    fn open_secondary_context(&self, trigger: &Selector) -> Result<Box<dyn Actions>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_saturates_on_huge_timeout() {
        assert!(!Deadline::after(Duration::MAX).is_expired());
        assert!(Deadline::after(Duration::ZERO).is_expired());
    }

    #[test]
    fn test_nth_wraps_xpath() {
        let cards = Selector::xpath("//div[@itemprop='itemListElement']");
        let third = cards.nth(3).unwrap();
        assert_eq!(third, Selector::xpath("(//div[@itemprop='itemListElement'])[3]"));
    }

    #[test]
    fn test_nth_rejects_css_and_zero() {
        assert!(matches!(Selector::css(".card").nth(1), Err(PilotError::InvalidSelector { .. })));
        assert!(Selector::xpath("//div").nth(0).is_err());
    }

    #[test]
    fn test_descendant_step() {
        let link = Selector::xpath("(//div)[2]").descendant("//a").unwrap();
        assert_eq!(link, Selector::xpath("(//div)[2]//a"));
    }

    #[test]
    fn test_exact_text_quotes() {
        assert_eq!(
            Selector::exact_text("Israel (+972)"),
            Selector::xpath("//*[normalize-space(text())='Israel (+972)']")
        );
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }

    #[test]
    fn test_display() {
        assert_eq!(Selector::css("#x").to_string(), "css:#x");
        assert_eq!(Selector::xpath("//h2").to_string(), "xpath://h2");
    }

    #[test]
    fn test_visibility_projection() {
        assert!(Visibility::Visible.is_visible());
        assert!(!Visibility::NotFound.is_visible());
        assert!(!Visibility::TimedOut.is_visible());
    }
}
