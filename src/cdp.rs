//! Chrome DevTools Protocol session implementation

use crate::{Error, Result, Session, SessionConfig};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;

/// CDP-based browser session (uses the `headless_chrome` crate)
///
/// Launches a headless Chrome instance sized to the requested viewport and
/// manages a single tab. Device emulation goes through Chrome's own launch
/// switches: the window size plus a forced device scale factor reproduce
/// what the DevTools mobile emulation panel would set up, so captures come
/// back at device resolution.
pub struct CdpSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl CdpSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let viewport = config
            .device
            .as_ref()
            .map(|device| device.viewport())
            .unwrap_or(config.viewport);

        let mut switches: Vec<OsString> = vec![
            format!("--window-size={},{}", viewport.width, viewport.height).into(),
        ];
        if viewport.pixel_ratio > 1 {
            switches.push(format!("--force-device-scale-factor={}", viewport.pixel_ratio).into());
        }
        if config.device.as_ref().is_some_and(|device| device.touch) {
            switches.push("--touch-events=enabled".into());
        }
        let switch_refs: Vec<&OsStr> = switches.iter().map(OsString::as_os_str).collect();

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((viewport.width, viewport.height)))
            .args(switch_refs)
            .user_data_dir(config.user_data_dir.clone())
            .build()
            .map_err(|e| Error::Session(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Session(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Session(format!("Failed to create tab: {}", e)))?;

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| Error::Session(format!("Failed to set user agent: {}", e)))?;
        }

        debug!(
            "Launched browser session: {}x{} @{}x",
            viewport.width, viewport.height, viewport.pixel_ratio
        );

        Ok(Self { browser, tab })
    }
}

impl Session for CdpSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Session(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|_| Error::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?;

        Ok(())
    }

    fn evaluate(&self, js: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(js, false)
            .map_err(|e| Error::Session(format!("Evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    fn capture_viewport(&self) -> Result<Vec<u8>> {
        // Viewport-only capture: stitching the full page is the pipeline's
        // job, not the browser's
        let bytes = self.tab.capture_screenshot(
            Page::CaptureScreenshotFormatOption::Png,
            None,
            None,
            true,
        )?;
        Ok(bytes)
    }

    fn quit(self) -> Result<()> {
        // Drop the browser explicitly so the child process terminates
        // promptly rather than waiting for scope end.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
