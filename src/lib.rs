//! # stay-pilot
//!
//! Browser automation pilot for a listing search and reservation workflow, driven over
//! the Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Wait-gated actions**: every click, fill and read waits for its target to be visible first
//! - **Calendar navigation**: bounded forward search for a month in the date picker
//! - **Listing ranking**: parses result cards and picks the cheapest among the top-rated
//! - **Reservation flow**: drives the listing tab with mandatory and best-effort steps
//! - **Artifacts**: ranking and reservation results persisted as JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stay_pilot::{ActionOptions, ArtifactStore, BrowserSession, LaunchOptions};
//! use stay_pilot::pilot::{ListingAnalyzer, ReservationFlow, SearchCriteria, SearchPage};
//!
//! # fn main() -> stay_pilot::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let actions = session.actions(ActionOptions::default());
//! let store = ArtifactStore::default();
//!
//! let criteria = SearchCriteria::new(
//!     "Tel Aviv",
//!     SearchCriteria::parse_date("2025-07-25")?,
//!     SearchCriteria::parse_date("2025-07-27")?,
//!     2,
//!     1,
//! )?;
//! SearchPage::new(&actions).run(&criteria)?;
//!
//! let analyzer = ListingAnalyzer::new(&actions);
//! let winner = analyzer.analyze_and_save(&store)?;
//!
//! ReservationFlow::new(&actions, analyzer.selectors().cards.clone()).attempt_and_save(winner.index, None, &store)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`actions`]: Wait-gated interaction primitives and the headless_chrome adapter
//! - [`pilot`]: Search, calendar, ranking and reservation orchestration
//! - [`artifacts`]: JSON artifact persistence
//! - [`watchdog`]: Run-wide hard timeout
//! - [`error`]: Error types and result aliases

pub mod actions;
pub mod artifacts;
pub mod browser;
pub mod error;
pub mod pilot;
pub mod watchdog;

pub use actions::{Actions, ChromeActions, ElementSnapshot, Selector, Visibility};
pub use artifacts::ArtifactStore;
pub use browser::{ActionOptions, BrowserSession, ConnectionOptions, LaunchOptions};
pub use error::{PilotError, Result};
pub use watchdog::Watchdog;
