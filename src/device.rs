//! Device emulation profiles
//!
//! Named device metrics for common phones, tablets and desktop resolutions.
//! Touch profiles additionally switch the browser into mobile emulation so
//! the page sees the device's pixel ratio.

use crate::Viewport;
use serde::{Deserialize, Serialize};

/// Metrics of an emulated device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: u32,
    pub touch: bool,
}

impl DeviceProfile {
    pub fn new(name: &str, width: u32, height: u32, pixel_ratio: u32, touch: bool) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            pixel_ratio,
            touch,
        }
    }

    pub fn iphone_se() -> Self {
        Self::new("iPhone SE", 375, 667, 2, true)
    }

    pub fn iphone_12_pro() -> Self {
        Self::new("iPhone 12 Pro", 390, 844, 3, true)
    }

    pub fn iphone_12_pro_max() -> Self {
        Self::new("iPhone 12 Pro Max", 430, 932, 3, true)
    }

    pub fn ipad_mini_vertical() -> Self {
        Self::new("iPad Mini - Vertical", 768, 1024, 3, true)
    }

    pub fn ipad_mini_horizontal() -> Self {
        Self::new("iPad Mini - Horizontal", 1024, 768, 3, true)
    }

    pub fn hd_720p() -> Self {
        Self::new("720p", 1280, 720, 1, false)
    }

    pub fn full_hd_1080p() -> Self {
        Self::new("1080p", 1920, 1080, 1, false)
    }

    pub fn qhd_1440p() -> Self {
        Self::new("1440p", 2560, 1440, 1, false)
    }

    pub fn uhd_4k() -> Self {
        Self::new("4K", 3840, 2160, 1, false)
    }

    pub fn uhd_5k() -> Self {
        Self::new("5K", 5120, 2880, 1, false)
    }

    pub fn uhd_8k() -> Self {
        Self::new("8K", 7680, 4320, 1, false)
    }

    /// Every built-in profile, phones first
    pub fn presets() -> Vec<DeviceProfile> {
        vec![
            Self::iphone_se(),
            Self::iphone_12_pro(),
            Self::iphone_12_pro_max(),
            Self::ipad_mini_vertical(),
            Self::ipad_mini_horizontal(),
            Self::hd_720p(),
            Self::full_hd_1080p(),
            Self::qhd_1440p(),
            Self::uhd_4k(),
            Self::uhd_5k(),
            Self::uhd_8k(),
        ]
    }

    /// The viewport this device presents to the page
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            pixel_ratio: self.pixel_ratio,
        }
    }
}
