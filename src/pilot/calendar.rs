use crate::{actions::{Actions, Deadline, Selector},
            error::{PilotError, Result}};
use chrono::{Datelike, NaiveDate};
use std::{fmt, time::Duration};

/// A month as the calendar renders it, e.g. "July 2025"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTarget {
    label: String,
}

impl CalendarTarget {
    pub fn from_date(date: NaiveDate) -> Self {
        Self { label: date.format("%B %Y").to_string() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Header labels are compared on rendered text, not on parsed dates
    pub fn matches(&self, header: &str) -> bool {
        header.split_whitespace().eq(self.label.split_whitespace())
    }
}

impl From<NaiveDate> for CalendarTarget {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for CalendarTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    /// Header reads before giving up; one forward advance happens between consecutive reads
    pub max_reads: usize,

    /// Delay between header re-reads while a month transition settles
    pub poll_interval: Duration,

    /// Upper bound on waiting for the headers to stop changing
    pub settle_timeout: Duration,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            max_reads: 12,
            poll_interval: Duration::from_millis(250),
            settle_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarSelectors {
    pub month_headers: Selector,
    pub next_month: Selector,
}

impl Default for CalendarSelectors {
    fn default() -> Self {
        Self {
            month_headers: Selector::xpath("//div[@role='tabpanel']//h2"),
            next_month: Selector::xpath("//button[contains(@aria-label,'Move forward to switch to the next month.')]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorState {
    Searching { reads: usize },
    Found { advances: usize },
    Exhausted,
}

/// Advances the date picker one month at a time until a target month is rendered.
///
/// The calendar only offers a forward control, so the search is bounded rather than
/// bidirectional. Calendar position is not reset between calls: navigating to the
/// check-out month starts from wherever the check-in navigation left the picker.
pub struct CalendarNavigator<'a> {
    actions: &'a dyn Actions,
    selectors: &'a CalendarSelectors,
    options: &'a NavigatorOptions,
}

impl<'a> CalendarNavigator<'a> {
    pub fn new(actions: &'a dyn Actions, selectors: &'a CalendarSelectors, options: &'a NavigatorOptions) -> Self {
        Self { actions, selectors, options }
    }

    /// Returns the number of forward advances issued before the target appeared
    pub fn go_to(&self, target: &CalendarTarget) -> Result<usize> {
        let mut state = NavigatorState::Searching { reads: 0 };

        loop {
            state = match state {
                NavigatorState::Searching { reads } if reads >= self.options.max_reads => NavigatorState::Exhausted,
                NavigatorState::Searching { reads } => {
                    if self.read_settled_headers(target)?.iter().any(|h| target.matches(h)) {
                        NavigatorState::Found { advances: reads }
                    } else {
                        if reads + 1 < self.options.max_reads {
                            self.actions.click(&self.selectors.next_month)?;
                        }
                        NavigatorState::Searching { reads: reads + 1 }
                    }
                }
                NavigatorState::Found { advances } => {
                    log::info!("Found month: {} after {} advances", target, advances);
                    return Ok(advances);
                }
                NavigatorState::Exhausted => {
                    return Err(PilotError::MonthNotFound {
                        target: target.to_string(),
                        reads: self.options.max_reads,
                    });
                }
            };
        }
    }

    /// Re-read headers until the target shows up or two consecutive reads agree
    fn read_settled_headers(&self, target: &CalendarTarget) -> Result<Vec<String>> {
        let deadline = Deadline::after(self.options.settle_timeout);
        let mut previous = self.actions.read_all_texts(&self.selectors.month_headers)?;

        loop {
            if previous.iter().any(|h| target.matches(h)) || deadline.is_expired() {
                return Ok(previous);
            }

            self.actions.pause(self.options.poll_interval);
            let current = self.actions.read_all_texts(&self.selectors.month_headers)?;
            if current == previous {
                return Ok(current);
            }
            previous = current;
        }
    }
}

/// Selector for the day button of `date` in the picker
pub fn day_selector(date: NaiveDate) -> Selector {
    Selector::xpath(format!(
        "//button[@data-state--date-string='{:04}-{:02}-{:02}']",
        date.year(),
        date.month(),
        date.day()
    ))
}
