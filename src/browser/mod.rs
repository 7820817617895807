//! Browser session management and configuration

pub mod config;
pub mod session;

pub use config::{ActionOptions, ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
