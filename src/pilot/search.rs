use crate::{actions::{xpath_literal, Actions, Selector},
            error::{PilotError, Result},
            pilot::calendar::{day_selector, CalendarNavigator, CalendarSelectors, CalendarTarget, NavigatorOptions}};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inputs for one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
}

impl SearchCriteria {
    pub fn new(
        location: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
        children: u32,
    ) -> Result<Self> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(PilotError::InvalidCriteria("location is empty".to_string()));
        }
        if check_out <= check_in {
            return Err(PilotError::InvalidCriteria(format!(
                "check-out {} is not after check-in {}",
                check_out, check_in
            )));
        }
        if adults < 1 {
            return Err(PilotError::InvalidCriteria("at least one adult is required".to_string()));
        }

        Ok(Self { location, check_in, check_out, adults, children })
    }

    /// Parse a `YYYY-MM-DD` date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| PilotError::InvalidCriteria(format!("invalid date '{}': {}", value, e)))
    }

    pub fn total_guests(&self) -> u32 {
        self.adults + self.children
    }

    /// Location as it appears in the results URL path
    pub fn location_slug(&self) -> String {
        self.location.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
    }

    /// Fragments the results URL must contain for this search
    pub fn expected_url_params(&self) -> Vec<String> {
        vec![
            format!("checkin={}", self.check_in.format("%Y-%m-%d")),
            format!("checkout={}", self.check_out.format("%Y-%m-%d")),
            format!("adults={}", self.adults),
            format!("children={}", self.children),
        ]
    }

    /// Fragments missing from `url`; empty when the results page reflects the search
    pub fn verify_results_url(&self, url: &str) -> Vec<String> {
        let mut missing: Vec<String> =
            self.expected_url_params().into_iter().filter(|fragment| !url.contains(fragment.as_str())).collect();

        let slug = self.location_slug();
        if !url.to_lowercase().contains(&slug) {
            missing.push(slug);
        }
        missing
    }

    pub fn check_in_day(&self) -> u32 {
        self.check_in.day()
    }

    pub fn check_out_day(&self) -> u32 {
        self.check_out.day()
    }
}

#[derive(Debug, Clone)]
pub struct SearchSelectors {
    pub cookie_accept: Selector,
    pub location_field: Selector,
    pub location_input: Selector,
    pub guests_opener: Selector,
    pub adults_increase: Selector,
    pub children_increase: Selector,
    pub submit: Selector,
    pub calendar: CalendarSelectors,
    pub summary: SummarySelectors,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            cookie_accept: Selector::button_with_text("Accept"),
            location_field: Selector::css("[data-testid='structured-search-input-field-query']"),
            location_input: Selector::css("input"),
            guests_opener: Selector::xpath("//div[contains(text(), 'Who')]"),
            adults_increase: Selector::xpath(
                "//div[@id='stepper-adults']//button[@data-testid='stepper-adults-increase-button']",
            ),
            children_increase: Selector::xpath(
                "//div[@id='stepper-children']//button[@data-testid='stepper-children-increase-button']",
            ),
            submit: Selector::xpath("//div[normalize-space(text())='Search']"),
            calendar: CalendarSelectors::default(),
            summary: SummarySelectors::default(),
        }
    }
}

/// Labels of the search summary the results page renders above the listings
#[derive(Debug, Clone)]
pub struct SummarySelectors {
    pub dates_label: String,
    pub guests_label: String,
    pub location_label: String,
}

impl Default for SummarySelectors {
    fn default() -> Self {
        Self {
            dates_label: "Check in / Check out".to_string(),
            guests_label: "Guests".to_string(),
            location_label: "Location".to_string(),
        }
    }
}

impl SummarySelectors {
    /// Value shown next to `label` whose text contains `value`
    pub fn chip(&self, label: &str, value: &str) -> Selector {
        Selector::xpath(format!(
            "//span[text()={}]/following-sibling::div[contains(text(), {})]",
            xpath_literal(label),
            xpath_literal(value)
        ))
    }

    /// Chips the summary must show for `criteria`, named for reporting
    pub fn expected(&self, criteria: &SearchCriteria) -> Vec<(String, Selector)> {
        let check_in = criteria.check_in_day().to_string();
        let check_out = criteria.check_out_day().to_string();
        let guests = criteria.total_guests().to_string();

        vec![
            (format!("check-in day {}", check_in), self.chip(&self.dates_label, &check_in)),
            (format!("check-out day {}", check_out), self.chip(&self.dates_label, &check_out)),
            (format!("guests {}", guests), self.chip(&self.guests_label, &guests)),
            (format!("location {}", criteria.location), self.chip(&self.location_label, &criteria.location)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub home_url: String,

    /// Guest counts the selector shows before any increment
    pub baseline_adults: u32,
    pub baseline_children: u32,

    /// Wait after submitting so the results page can render
    pub results_settle: Duration,

    pub navigator: NavigatorOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            home_url: "https://www.airbnb.com/".to_string(),
            baseline_adults: 1,
            baseline_children: 0,
            results_settle: Duration::from_secs(5),
            navigator: NavigatorOptions::default(),
        }
    }
}

impl SearchOptions {
    /// Increment clicks needed to reach the requested counts, as (adults, children)
    pub fn guest_increments(&self, criteria: &SearchCriteria) -> (u32, u32) {
        (
            criteria.adults.saturating_sub(self.baseline_adults),
            criteria.children.saturating_sub(self.baseline_children),
        )
    }
}

/// Drives the home page search form. Every step is mandatory.
pub struct SearchPage<'a> {
    actions: &'a dyn Actions,
    selectors: SearchSelectors,
    options: SearchOptions,
}

impl<'a> SearchPage<'a> {
    pub fn new(actions: &'a dyn Actions) -> Self {
        Self::with_config(actions, SearchSelectors::default(), SearchOptions::default())
    }

    pub fn with_config(actions: &'a dyn Actions, selectors: SearchSelectors, options: SearchOptions) -> Self {
        Self { actions, selectors, options }
    }

    pub fn open_homepage(&self) -> Result<()> {
        self.actions.navigate(&self.options.home_url)
    }

    /// Dismiss the cookie banner if one is shown
    pub fn accept_cookies_if_visible(&self) {
        if !self.actions.is_visible(&self.selectors.cookie_accept) {
            return;
        }
        if let Err(e) = self.actions.click(&self.selectors.cookie_accept) {
            log::warn!("{}", PilotError::OptionalStepFailed { step: "accept_cookies".to_string(), reason: e.to_string() });
        }
    }

    pub fn enter_location(&self, location: &str) -> Result<()> {
        self.actions.click(&self.selectors.location_field)?;
        self.actions.fill(&self.selectors.location_input, location)?;
        self.actions.press_key("Enter")
    }

    pub fn select_dates(&self, check_in: NaiveDate, check_out: NaiveDate) -> Result<()> {
        let navigator = CalendarNavigator::new(self.actions, &self.selectors.calendar, &self.options.navigator);

        navigator.go_to(&CalendarTarget::from_date(check_in))?;
        self.actions.click(&day_selector(check_in))?;

        navigator.go_to(&CalendarTarget::from_date(check_out))?;
        self.actions.click(&day_selector(check_out))
    }

    pub fn set_guests(&self, criteria: &SearchCriteria) -> Result<()> {
        self.actions.click(&self.selectors.guests_opener)?;

        let (adults, children) = self.options.guest_increments(criteria);
        for _ in 0..adults {
            self.actions.click(&self.selectors.adults_increase)?;
        }
        for _ in 0..children {
            self.actions.click(&self.selectors.children_increase)?;
        }
        Ok(())
    }

    pub fn submit_search(&self) -> Result<()> {
        self.actions.click(&self.selectors.submit)
    }

    /// Summary chips missing from the results page; empty when it reflects the search
    pub fn verify_summary(&self, criteria: &SearchCriteria) -> Vec<String> {
        self.selectors
            .summary
            .expected(criteria)
            .into_iter()
            .filter(|(_, chip)| !self.actions.is_visible(chip))
            .map(|(name, _)| name)
            .collect()
    }

    /// Full search sequence; returns the results page URL
    pub fn run(&self, criteria: &SearchCriteria) -> Result<String> {
        self.open_homepage()?;
        self.accept_cookies_if_visible();

        log::info!("Searching {} from {} to {}", criteria.location, criteria.check_in, criteria.check_out);
        self.enter_location(&criteria.location)?;
        self.select_dates(criteria.check_in, criteria.check_out)?;
        self.set_guests(criteria)?;
        self.submit_search()?;

        self.actions.pause(self.options.results_settle);

        let url = self.actions.current_url()?;
        log::info!("Results URL: {}", url);
        Ok(url)
    }
}
