//! pagestitch
//!
//! Full-page screenshots for pages taller than one viewport: drive a live
//! browser through repeated scroll-and-capture steps, crop the sticky-chrome
//! dead zone and inter-fragment overlap out of each raster fragment, and
//! composite the strips into one seamless image whose height matches the
//! page's true content height.
//!
//! # Features
//!
//! - **CDP Backend** (default): drives headless Chrome over the DevTools
//!   Protocol via the `cdp` cargo feature
//! - **Backend-agnostic core**: the planning, cropping and compositing
//!   pipeline works against any [`Session`] implementation
//! - **Profiles**: desktop, mobile and parallax capture profiles replace the
//!   constants that would otherwise be scattered through the pipeline
//!
//! # Example
//!
//! ```no_run
//! use pagestitch::{CaptureConfig, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = pagestitch::new_session(SessionConfig::default())?;
//! let path = pagestitch::capture_full_page(
//!     session,
//!     "https://example.com",
//!     &CaptureConfig::default(),
//! )?;
//! println!("Saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly browser API (worker-thread-backed abstraction)
#[cfg(feature = "cdp")]
pub mod async_api;

#[cfg(feature = "cdp")]
pub use async_api::Browser;

pub mod capture;
pub mod compose;
pub mod crop;
pub mod device;
pub mod pipeline;
pub mod plan;
pub mod probe;
pub mod store;

pub use device::DeviceProfile;
pub use pipeline::{CaptureConfig, CapturePipeline, Stage};
pub use plan::{CapturePlan, CaptureProfile, ChunkedPlan, ScrollStep};
pub use probe::PageGeometry;

/// Viewport dimensions in CSS pixels, plus the device pixel ratio.
///
/// Device pixels are CSS pixels times `pixel_ratio`. Captures come back at
/// device resolution; the stitched canvas is laid out in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_ratio: 1,
        }
    }
}

/// Configuration for creating a browser session
///
/// The defaults are a 1280x720 headless window with no device emulation and
/// the stock user agent. Setting `device` overrides the viewport with the
/// device's metrics and enables scale-factor emulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User agent override, or `None` for the browser default
    pub user_agent: Option<String>,
    /// Requested window size (ignored when `device` is set)
    pub viewport: Viewport,
    /// Device emulation profile
    pub device: Option<DeviceProfile>,
    /// Whether to run the browser headless
    pub headless: bool,
    /// Browser profile directory, reused across runs so that cookie-consent
    /// state accepted once stays accepted
    pub user_data_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            viewport: Viewport::default(),
            device: None,
            headless: true,
            user_data_dir: None,
        }
    }
}

/// A live browsing surface the pipeline can drive.
///
/// All interactions within one capture are strictly sequential: scroll
/// position is shared browser state, so concurrent fragment capture inside a
/// single session is unsound and never attempted.
pub trait Session {
    /// Navigate to a URL and wait for the load to complete
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Evaluate JavaScript in the page and return the resulting value.
    /// The pipeline only issues read-only geometry queries and scroll
    /// commands through this.
    fn evaluate(&self, js: &str) -> Result<serde_json::Value>;

    /// Scroll the page so that `y` CSS pixels are above the viewport top
    fn scroll_to(&self, y: u32) -> Result<()> {
        self.evaluate(&format!("window.scrollTo(0, {});", y)).map(|_| ())
    }

    /// Capture the currently visible viewport as PNG bytes
    fn capture_viewport(&self) -> Result<Vec<u8>>;

    /// Close the session and release browser resources
    fn quit(self) -> Result<()>;
}

/// Capture a full-page screenshot of `url` and return the output path.
///
/// The session is consumed: it is torn down on every exit path, success or
/// failure, so a navigation timeout can never leak a browser process.
pub fn capture_full_page<S: Session>(
    mut session: S,
    url: &str,
    config: &CaptureConfig,
) -> Result<PathBuf> {
    let outcome = CapturePipeline::new(config).run(&mut session, url);
    let teardown = session.quit();
    match outcome {
        Ok(path) => teardown.map(|_| path),
        Err(err) => {
            if let Err(teardown_err) = teardown {
                log::warn!("Session teardown after pipeline failure also failed: {}", teardown_err);
            }
            Err(err)
        }
    }
}

/// Create a new browser session with the default backend
#[cfg(feature = "cdp")]
pub fn new_session(config: SessionConfig) -> Result<impl Session> {
    cdp::CdpSession::new(config)
}
