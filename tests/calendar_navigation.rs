mod support;

use chrono::NaiveDate;
use std::time::Duration;
use stay_pilot::{PilotError,
                 pilot::{CalendarNavigator, CalendarSelectors, CalendarTarget, NavigatorOptions}};
use support::FakePage;

const MONTHS: [&str; 14] = [
    "May 2025",
    "June 2025",
    "July 2025",
    "August 2025",
    "September 2025",
    "October 2025",
    "November 2025",
    "December 2025",
    "January 2026",
    "February 2026",
    "March 2026",
    "April 2026",
    "May 2026",
    "June 2026",
];

fn fast_options() -> NavigatorOptions {
    NavigatorOptions { max_reads: 12, poll_interval: Duration::ZERO, settle_timeout: Duration::from_secs(1) }
}

fn calendar_page(selectors: &CalendarSelectors) -> FakePage {
    FakePage::new().with_calendar(&selectors.month_headers, &selectors.next_month, &MONTHS)
}

fn target(year: i32, month: u32) -> CalendarTarget {
    CalendarTarget::from_date(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

#[test]
fn test_target_on_first_read_needs_no_clicks() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);

    let advances = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2025, 5)).unwrap();

    assert_eq!(advances, 0);
    assert_eq!(page.clicks_on(&selectors.next_month), 0);
}

#[test]
fn test_target_on_nth_read_issues_n_minus_one_clicks() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);

    // July 2025 is rendered on the third read
    let advances = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2025, 7)).unwrap();

    assert_eq!(advances, 2);
    assert_eq!(page.clicks_on(&selectors.next_month), 2);
}

#[test]
fn test_target_beyond_bound_is_month_not_found() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);

    // May 2026 would only show on the 13th read
    let err = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2026, 5)).unwrap_err();

    match err {
        PilotError::MonthNotFound { target, reads } => {
            assert_eq!(target, "May 2026");
            assert_eq!(reads, 12);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(page.clicks_on(&selectors.next_month), 11);
}

#[test]
fn test_last_month_within_bound_is_found() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);

    let advances = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2026, 4)).unwrap();

    assert_eq!(advances, 11);
}

#[test]
fn test_second_navigation_continues_from_current_month() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);
    let navigator = CalendarNavigator::new(&page, &selectors, &options);

    assert_eq!(navigator.go_to(&target(2025, 7)).unwrap(), 2);
    assert_eq!(navigator.go_to(&target(2025, 8)).unwrap(), 1);
    assert_eq!(page.clicks_on(&selectors.next_month), 3);
}

#[test]
fn test_past_month_is_never_found() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = calendar_page(&selectors);

    let result = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2025, 4));

    assert!(matches!(result, Err(PilotError::MonthNotFound { .. })));
}

#[test]
fn test_missing_calendar_is_element_not_ready() {
    let selectors = CalendarSelectors::default();
    let options = fast_options();
    let page = FakePage::new();

    let result = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2025, 7));

    assert!(matches!(result, Err(PilotError::ElementNotReady { .. })));
}

#[test]
fn test_unbounded_settle_timeout_still_advances() {
    let selectors = CalendarSelectors::default();
    let page = calendar_page(&selectors);
    let options = NavigatorOptions { settle_timeout: Duration::MAX, ..fast_options() };

    let advances = CalendarNavigator::new(&page, &selectors, &options).go_to(&target(2025, 7)).unwrap();

    assert_eq!(advances, 2);
}
