//! Scripted in-memory page for driving the orchestrators without a browser

#![allow(dead_code)]

use std::{cell::RefCell,
          collections::{HashMap, HashSet},
          rc::Rc,
          time::Duration};
use stay_pilot::{Actions, ElementSnapshot, PilotError, Result, Selector, Visibility};

#[derive(Default)]
struct PageState {
    url: String,
    visible: HashSet<Selector>,
    texts: HashMap<Selector, String>,
    cards: Vec<ElementSnapshot>,

    month_headers: Option<Selector>,
    next_month: Option<Selector>,
    months: Vec<String>,
    month_pos: usize,

    click_urls: HashMap<Selector, String>,
    secondary: Option<FakePage>,
    events: Vec<String>,
    header_reads: usize,
    pauses: Vec<Duration>,
}

/// Cloning shares the underlying state, so tests keep a handle on pages they hand out
#[derive(Clone, Default)]
pub struct FakePage {
    state: Rc<RefCell<PageState>>,
}

fn not_ready(selector: &Selector) -> PilotError {
    PilotError::ElementNotReady { selector: selector.to_string(), timeout: Duration::from_millis(0) }
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state.borrow_mut().url = url.to_string();
        self
    }

    pub fn show(self, selector: &Selector) -> Self {
        self.state.borrow_mut().visible.insert(selector.clone());
        self
    }

    pub fn show_text(self, selector: &Selector, text: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.visible.insert(selector.clone());
            state.texts.insert(selector.clone(), text.to_string());
        }
        self
    }

    pub fn hide(self, selector: &Selector) -> Self {
        self.state.borrow_mut().visible.remove(selector);
        self
    }

    pub fn with_cards(self, cards: Vec<ElementSnapshot>) -> Self {
        self.state.borrow_mut().cards = cards;
        self
    }

    /// One-month calendar view that starts at `months[0]` and moves one entry per `next` click
    pub fn with_calendar(self, headers: &Selector, next: &Selector, months: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.visible.insert(headers.clone());
            state.visible.insert(next.clone());
            state.month_headers = Some(headers.clone());
            state.next_month = Some(next.clone());
            state.months = months.iter().map(|m| m.to_string()).collect();
        }
        self
    }

    /// Clicking `selector` moves the page to `url`
    pub fn click_navigates(self, selector: &Selector, url: &str) -> Self {
        self.state.borrow_mut().click_urls.insert(selector.clone(), url.to_string());
        self
    }

    pub fn with_secondary(self, page: FakePage) -> Self {
        self.state.borrow_mut().secondary = Some(page);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.state.borrow().events.clone()
    }

    pub fn clicks_on(&self, selector: &Selector) -> usize {
        let needle = format!("click {}", selector);
        self.state.borrow().events.iter().filter(|e| **e == needle).count()
    }

    /// Attempts to read the text of `selector`, successful or not
    pub fn reads_of(&self, selector: &Selector) -> usize {
        let needle = format!("read {}", selector);
        self.state.borrow().events.iter().filter(|e| **e == needle).count()
    }

    pub fn header_reads(&self) -> usize {
        self.state.borrow().header_reads
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.state.borrow().pauses.clone()
    }

    fn record(&self, event: String) {
        self.state.borrow_mut().events.push(event);
    }

    fn require_visible(&self, selector: &Selector) -> Result<()> {
        if self.state.borrow().visible.contains(selector) { Ok(()) } else { Err(not_ready(selector)) }
    }
}

impl Actions for FakePage {
    fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        self.state.borrow_mut().url = url.to_string();
        Ok(())
    }

    fn wait_visible(&self, selector: &Selector) -> Result<()> {
        self.require_visible(selector)
    }

    fn click(&self, selector: &Selector) -> Result<()> {
        self.require_visible(selector)?;
        self.record(format!("click {}", selector));

        let mut state = self.state.borrow_mut();
        if state.next_month.as_ref() == Some(selector) && state.month_pos + 1 < state.months.len() {
            state.month_pos += 1;
        }
        if let Some(url) = state.click_urls.get(selector).cloned() {
            state.url = url;
        }
        Ok(())
    }

    fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        self.require_visible(selector)?;
        self.record(format!("fill {} {}", selector, text));
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.record(format!("press {}", key));
        Ok(())
    }

    fn read_text(&self, selector: &Selector) -> Result<String> {
        self.record(format!("read {}", selector));
        self.require_visible(selector)?;
        self.state.borrow().texts.get(selector).cloned().ok_or_else(|| not_ready(selector))
    }

    fn read_all_texts(&self, selector: &Selector) -> Result<Vec<String>> {
        self.require_visible(selector)?;

        let mut state = self.state.borrow_mut();
        if state.month_headers.as_ref() == Some(selector) {
            state.header_reads += 1;
            return Ok(state.months.get(state.month_pos).cloned().into_iter().collect());
        }
        state.texts.get(selector).map(|t| vec![t.clone()]).ok_or_else(|| not_ready(selector))
    }

    fn snapshot_all(&self, _selector: &Selector) -> Result<Vec<ElementSnapshot>> {
        Ok(self.state.borrow().cards.clone())
    }

    fn probe(&self, selector: &Selector) -> Visibility {
        if self.state.borrow().visible.contains(selector) { Visibility::Visible } else { Visibility::NotFound }
    }

    fn pause(&self, duration: Duration) {
        self.state.borrow_mut().pauses.push(duration);
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.state.borrow().url.clone())
    }

    fn open_secondary_context(&self, trigger: &Selector) -> Result<Box<dyn Actions>> {
        self.click(trigger)?;
        let secondary = self
            .state
            .borrow()
            .secondary
            .clone()
            .ok_or_else(|| PilotError::TabOperationFailed("no secondary page scripted".to_string()))?;
        Ok(Box::new(secondary))
    }
}
