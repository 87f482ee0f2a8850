//! Capture a full-page screenshot of a URL with the desktop profile

use pagestitch::{capture_full_page, CaptureConfig, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    println!("pagestitch - Full Page Capture Example\n");
    println!("Creating browser session...");
    let session = pagestitch::new_session(SessionConfig::default())?;

    let config = CaptureConfig::default();
    println!("Capturing {} with the desktop profile", url);
    println!(
        "  Chunk size: {}px, dead zone: {}px\n",
        config.profile.chunk_size_px, config.profile.dead_zone_px
    );

    let path = capture_full_page(session, &url, &config)?;
    println!("Screenshot saved to: {}", path.display());

    Ok(())
}
