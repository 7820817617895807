use crate::{actions::{Actions, Deadline, ElementSnapshot, Selector, Visibility},
            browser::ActionOptions,
            error::{PilotError, Result}};
use headless_chrome::{Element, Tab};
use std::{collections::HashSet,
          sync::{Arc, Mutex},
          thread,
          time::Duration};

const IS_VISIBLE_JS: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden'
            && style.display !== 'none';
    }
"#;

const CLEAR_VALUE_JS: &str = r#"
    function() {
        if ('value' in this) {
            this.value = '';
            this.dispatchEvent(new Event('input', { bubbles: true }));
        }
        return true;
    }
"#;

/// [`Actions`] adapter over a headless_chrome tab
pub struct ChromeActions {
    tab: Arc<Tab>,

    /// Browser-wide tab list, used to detect tabs opened by a click
    tabs: Arc<Mutex<Vec<Arc<Tab>>>>,

    options: ActionOptions,
}

impl ChromeActions {
    pub fn new(tab: Arc<Tab>, tabs: Arc<Mutex<Vec<Arc<Tab>>>>, options: ActionOptions) -> Self {
        Self { tab, tabs, options }
    }

    fn find_first(&self, selector: &Selector) -> anyhow::Result<Element<'_>> {
        match selector {
            Selector::Css(query) => self.tab.find_element(query),
            Selector::XPath(query) => self.tab.find_element_by_xpath(query),
        }
    }

    fn find_all(&self, selector: &Selector) -> anyhow::Result<Vec<Element<'_>>> {
        match selector {
            Selector::Css(query) => self.tab.find_elements(query),
            Selector::XPath(query) => self.tab.find_elements_by_xpath(query),
        }
    }

    /// Poll until the first match is visible, or report why it never was
    fn poll_visible(&self, selector: &Selector, timeout: Duration) -> std::result::Result<Element<'_>, Visibility> {
        let deadline = Deadline::after(timeout);

        loop {
            let outcome = match self.find_first(selector) {
                Ok(element) if element_is_visible(&element) => return Ok(element),
                Ok(_) => Visibility::TimedOut,
                Err(_) => Visibility::NotFound,
            };

            if deadline.is_expired() {
                return Err(outcome);
            }
            thread::sleep(self.options.poll_interval);
        }
    }

    fn wait_for(&self, selector: &Selector) -> Result<Element<'_>> {
        self.poll_visible(selector, self.options.timeout).map_err(|outcome| {
            log::debug!("Wait for {} ended with {:?}", selector, outcome);
            PilotError::ElementNotReady { selector: selector.to_string(), timeout: self.options.timeout }
        })
    }

    fn tab_ids(&self) -> Result<HashSet<String>> {
        let tabs = self
            .tabs
            .lock()
            .map_err(|e| PilotError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?;
        Ok(tabs.iter().map(|tab| tab.get_target_id().to_string()).collect())
    }

    fn find_new_tab(&self, known: &HashSet<String>) -> Result<Option<Arc<Tab>>> {
        let tabs = self
            .tabs
            .lock()
            .map_err(|e| PilotError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?;
        Ok(tabs.iter().find(|tab| !known.contains(tab.get_target_id().as_str())).cloned())
    }
}

fn element_is_visible(element: &Element<'_>) -> bool {
    element
        .call_js_fn(IS_VISIBLE_JS, vec![], false)
        .ok()
        .and_then(|remote| remote.value)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}

impl Actions for ChromeActions {
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| PilotError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| PilotError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        Ok(())
    }

    fn wait_visible(&self, selector: &Selector) -> Result<()> {
        self.wait_for(selector).map(|_| ())
    }

    fn click(&self, selector: &Selector) -> Result<()> {
        let element = self.wait_for(selector)?;

        // Elements outside the viewport swallow clicks
        element.scroll_into_view().map_err(|e| PilotError::driver("scroll", e))?;
        element.click().map_err(|e| PilotError::driver("click", e))?;

        log::debug!("Clicked {}", selector);
        Ok(())
    }

    fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let element = self.wait_for(selector)?;

        element
            .call_js_fn(CLEAR_VALUE_JS, vec![], false)
            .map_err(|e| PilotError::driver("fill", e))?;
        element.type_into(text).map_err(|e| PilotError::driver("fill", e))?;

        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.tab.press_key(key).map_err(|e| PilotError::driver("press_key", e))?;
        Ok(())
    }

    fn read_text(&self, selector: &Selector) -> Result<String> {
        let element = self.wait_for(selector)?;
        element.get_inner_text().map_err(|e| PilotError::driver("read_text", e))
    }

    fn read_all_texts(&self, selector: &Selector) -> Result<Vec<String>> {
        self.wait_for(selector)?;

        let elements = self.find_all(selector).map_err(|e| PilotError::driver("read_all_texts", e))?;
        elements
            .iter()
            .map(|element| element.get_inner_text().map_err(|e| PilotError::driver("read_all_texts", e)))
            .collect()
    }

    fn snapshot_all(&self, selector: &Selector) -> Result<Vec<ElementSnapshot>> {
        // headless_chrome reports an empty match set as an error
        let elements = match self.find_all(selector) {
            Ok(elements) => elements,
            Err(e) => {
                log::debug!("No matches for {}: {}", selector, e);
                return Ok(Vec::new());
            }
        };

        Ok(elements
            .iter()
            .map(|element| {
                let visible = element_is_visible(element);
                let text = element.get_inner_text().unwrap_or_default();
                ElementSnapshot { visible, text }
            })
            .collect())
    }

    fn probe(&self, selector: &Selector) -> Visibility {
        match self.poll_visible(selector, self.options.probe_timeout) {
            Ok(_) => Visibility::Visible,
            Err(outcome) => outcome,
        }
    }

    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn open_secondary_context(&self, trigger: &Selector) -> Result<Box<dyn Actions>> {
        let known = self.tab_ids()?;
        self.click(trigger)?;

        let deadline = Deadline::after(self.options.secondary_context_timeout);
        let tab = loop {
            if let Some(tab) = self.find_new_tab(&known)? {
                break tab;
            }
            if deadline.is_expired() {
                return Err(PilotError::TabOperationFailed(format!(
                    "No new tab opened by {} within {:?}",
                    trigger, self.options.secondary_context_timeout
                )));
            }
            thread::sleep(self.options.poll_interval);
        };

        tab.wait_until_navigated()
            .map_err(|e| PilotError::NavigationFailed(format!("Secondary tab did not load: {}", e)))?;
        tab.activate()
            .map_err(|e| PilotError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;

        log::info!("Secondary context opened at {}", tab.get_url());

        Ok(Box::new(ChromeActions::new(tab, self.tabs.clone(), self.options.clone())))
    }
}
