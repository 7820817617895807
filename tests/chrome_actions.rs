use stay_pilot::{ActionOptions, Actions, BrowserSession, LaunchOptions, Selector, Visibility,
                 pilot::ListingAnalyzer};
use std::time::Duration;

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

fn fast_options() -> ActionOptions {
    ActionOptions::new()
        .timeout(Duration::from_secs(2))
        .probe_timeout(Duration::from_millis(300))
        .poll_interval(Duration::from_millis(50))
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_click_and_read_text() {
    let session = launch();
    let actions = session.actions(fast_options());

    actions
        .navigate(&data_url(
            "<html><body><div style='height:3000px'></div>\
             <button id='go' onclick=\"document.getElementById('out').innerText='clicked'\">Go</button>\
             <p id='out'>idle</p></body></html>",
        ))
        .expect("Failed to navigate");

    // Button sits below the fold
    actions.click(&Selector::css("#go")).expect("Failed to click");
    assert_eq!(actions.read_text(&Selector::css("#out")).unwrap(), "clicked");

    let scrolled = session.tab().evaluate("window.scrollY", false).unwrap().value.unwrap();
    assert!(scrolled.as_f64().unwrap() > 0.0);
}

#[test]
#[ignore]
fn test_hidden_element_is_not_ready() {
    let session = launch();
    let actions = session.actions(fast_options());

    actions
        .navigate(&data_url("<html><body><button id='ghost' style='display:none'>Ghost</button></body></html>"))
        .expect("Failed to navigate");

    assert!(actions.click(&Selector::css("#ghost")).is_err());
    assert_eq!(actions.probe(&Selector::css("#ghost")), Visibility::TimedOut);
    assert_eq!(actions.probe(&Selector::css("#missing")), Visibility::NotFound);
    assert!(!actions.is_visible(&Selector::css("#ghost")));
    assert!(!actions.is_visible(&Selector::css("#missing")));
}

#[test]
#[ignore]
fn test_fill_replaces_value() {
    let session = launch();
    let actions = session.actions(fast_options());

    actions
        .navigate(&data_url("<html><body><input id='q' value='old'></body></html>"))
        .expect("Failed to navigate");

    actions.fill(&Selector::css("#q"), "Tel Aviv").unwrap();

    let value = session.tab().evaluate("document.getElementById('q').value", false).unwrap().value.unwrap();
    assert_eq!(value.as_str(), Some("Tel Aviv"));
}

#[test]
#[ignore]
fn test_read_all_texts_in_document_order() {
    let session = launch();
    let actions = session.actions(fast_options());

    actions
        .navigate(&data_url(
            "<html><body><div role='tabpanel'><h2>July 2025</h2></div>\
             <div role='tabpanel'><h2>August 2025</h2></div></body></html>",
        ))
        .expect("Failed to navigate");

    let headers = actions.read_all_texts(&Selector::xpath("//div[@role='tabpanel']//h2")).unwrap();
    assert_eq!(headers, vec!["July 2025", "August 2025"]);
}

#[test]
#[ignore]
fn test_rank_rendered_cards() {
    let session = launch();
    let actions = session.actions(fast_options());

    actions
        .navigate(&data_url(
            "<html><body>\
             <div data-testid='card-container'>Loft ₪600 ₪450 4.8 (20)</div>\
             <div data-testid='card-container'>Flat ₪300 4.8 (12)</div>\
             <div data-testid='card-container' style='display:none'>Hidden ₪100 5.0 (3)</div>\
             </body></html>",
        ))
        .expect("Failed to navigate");

    let winner = ListingAnalyzer::new(&actions).cheapest_top_rated().unwrap();
    assert_eq!(winner.index, 1);
    assert_eq!(winner.price, 300);
}
