use crate::{browser::config::LaunchOptions,
            error::{ClipError, Result},
            picker::{PageContext, PickerSession}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// A Chrome/Chromium instance with the tab the picker runs in
pub struct BrowserSession {
    /// Kept alive for as long as the tab is used
    browser: Browser,

    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Pages behave differently when they detect automation
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Picking is interactive and can take a while
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser =
            Browser::new(launch_opts).map_err(|e| ClipError::Browser(format!("Failed to launch browser: {}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ClipError::Browser(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tab })
    }

    /// The tab pages are opened in
    pub fn tab(&self) -> Arc<Tab> {
        Arc::clone(&self.tab)
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate the tab to a URL
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| ClipError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| ClipError::Browser(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Open `url` and wait until it has loaded
    pub fn open(&self, url: &str) -> Result<()> {
        self.navigate(url)?;
        self.wait_for_navigation()
    }

    /// Run a script that returns a JSON string and parse the result
    pub fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.tab.evaluate_json(script)
    }

    /// Inject the picker into the current page and start polling it
    pub fn start_picker(&self) -> Result<PickerSession<Tab>> {
        PickerSession::start(self.tab())
    }
}

impl PageContext for Tab {
    fn evaluate_json(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .evaluate(script, false)
            .map_err(|e| ClipError::Browser(format!("Failed to execute script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| ClipError::Browser("No value returned from script".to_string()))?;

        // The script returns a JSON string, parsed in two steps
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| ClipError::Browser(format!("Script did not return a string: {}", e)))?;

        serde_json::from_str(&json_str).map_err(|e| ClipError::Browser(format!("Failed to parse script result: {}", e)))
    }
}
