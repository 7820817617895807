use crate::{actions::ChromeActions,
            browser::config::{ActionOptions, ConnectionOptions, LaunchOptions},
            error::{PilotError, Result}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that owns a Chrome/Chromium instance and its primary tab
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab the scenario is driven from
    primary: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Keep the site from flagging the session as automated
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Default idle timeout (30s) is shorter than a full search-and-reserve scenario
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| PilotError::LaunchFailed(e.to_string()))?;

        let primary = browser
            .new_tab()
            .map_err(|e| PilotError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!("Browser launched (headless: {})", options.headless);

        Ok(Self { browser, primary })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| PilotError::ConnectionFailed(e.to_string()))?;

        let primary = browser
            .new_tab()
            .map_err(|e| PilotError::ConnectionFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, primary })
    }

    /// Get the primary tab
    pub fn tab(&self) -> Arc<Tab> {
        self.primary.clone()
    }

    /// Get all tabs currently known to the browser
    pub fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| PilotError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Build the Action Layer over the primary tab
    pub fn actions(&self, options: ActionOptions) -> ChromeActions {
        ChromeActions::new(self.primary.clone(), self.browser.get_tabs().clone(), options)
    }

    /// Close every tab
    pub fn close(&self) -> Result<()> {
        // headless_chrome closes the process when Browser is dropped; closing tabs releases pages early
        for tab in self.tabs()? {
            let _ = tab.close(false);
        }
        Ok(())
    }
}
