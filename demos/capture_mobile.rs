//! Capture a full-page screenshot under mobile device emulation

use pagestitch::plan::CaptureProfile;
use pagestitch::{capture_full_page, CaptureConfig, DeviceProfile, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let device = DeviceProfile::iphone_12_pro();
    println!("pagestitch - Mobile Capture Example\n");
    println!(
        "Emulating {} ({}x{} @{}x)",
        device.name, device.width, device.height, device.pixel_ratio
    );

    let session = pagestitch::new_session(SessionConfig {
        device: Some(device),
        ..Default::default()
    })?;

    let config = CaptureConfig {
        profile: CaptureProfile::mobile(),
        ..Default::default()
    };

    let path = capture_full_page(session, &url, &config)?;
    println!("Screenshot saved to: {}", path.display());

    Ok(())
}
