//! Page-level orchestration built on the [`Actions`](crate::actions::Actions) layer
//!
//! - [`search`]: fills and submits the home page search form
//! - [`calendar`]: bounded forward navigation of the date picker
//! - [`listings`]: result-card parsing and cheapest-top-rated ranking
//! - [`reservation`]: secondary-tab reservation walk with mandatory and best-effort steps
//! - [`steps`]: the policy-tagged step runner used by the reservation flow

pub mod calendar;
pub mod listings;
pub mod reservation;
pub mod search;
pub mod steps;

pub use calendar::{CalendarNavigator, CalendarSelectors, CalendarTarget, NavigatorOptions, NavigatorState};
pub use listings::{ListingAnalyzer, ListingCandidate, ListingSelectors, RankingResult};
pub use reservation::{ReservationFlow, ReservationSelectors, ReservationSummary, DEFAULT_PHONE, DISCOUNT_UNAVAILABLE};
pub use search::{SearchCriteria, SearchOptions, SearchPage, SearchSelectors, SummarySelectors};
pub use steps::{run_steps, Step, StepPolicy, StepReport};
