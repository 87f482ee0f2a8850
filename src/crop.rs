//! Fragment cropping: dead-zone and overlap removal
//!
//! Raw fragments arrive at device resolution. The crop boxes are computed in
//! device pixels throughout; the strip's target position in the final canvas
//! is CSS pixels. A crop box that falls outside the fragment is a planning
//! bug and fails loudly instead of being clamped.

use crate::plan::{CaptureProfile, ScrollStep};
use crate::{Error, Result, Viewport};
use image::DynamicImage;
use log::debug;

/// A cropped fragment ready for pasting, plus where it goes
#[derive(Debug, Clone)]
pub struct CroppedStrip {
    pub image: DynamicImage,
    /// Vertical offset in the final canvas, CSS pixels
    pub target_y: u32,
}

/// Crop a raw fragment down to the strip it contributes to the canvas.
///
/// Non-final steps keep the band one chunk tall sitting just below the dead
/// zone: the dead zone repeats content the previous strip already shows, and
/// anything below the band belongs to later steps. The final step keeps
/// everything below the dead zone, shifted down by the overflow when the
/// scroll was clamped at the bottom of the page, so exactly the not-yet
/// covered tail of the page survives.
pub fn crop_step(
    fragment: &DynamicImage,
    step: &ScrollStep,
    viewport: &Viewport,
    profile: &CaptureProfile,
) -> Result<CroppedStrip> {
    let width = fragment.width();
    let height = fragment.height();
    let ratio = viewport.pixel_ratio;

    let dead_zone_dev = profile.dead_zone_px * ratio;
    let chunk_dev = profile.chunk_size_px * ratio;

    let (top, bottom) = if step.is_last {
        ((profile.dead_zone_px + step.overflow_px) * ratio, height)
    } else {
        (dead_zone_dev, dead_zone_dev + chunk_dev)
    };

    if top >= bottom || bottom > height {
        return Err(Error::Composition(format!(
            "crop box rows [{}, {}) outside fragment bounds {}x{} for step {}",
            top, bottom, width, height, step.index
        )));
    }

    debug!(
        "Cropping step {}: rows [{}, {}) of {}x{}",
        step.index, top, bottom, width, height
    );

    let image = fragment.crop_imm(0, top, width, bottom - top);
    let target_y = viewport.height + step.index as u32 * profile.chunk_size_px;

    Ok(CroppedStrip { image, target_y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn viewport(width: u32, height: u32, pixel_ratio: u32) -> Viewport {
        Viewport {
            width,
            height,
            pixel_ratio,
        }
    }

    fn fragment(viewport: &Viewport) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(
            viewport.width * viewport.pixel_ratio,
            viewport.height * viewport.pixel_ratio,
        ))
    }

    fn step(index: usize, is_last: bool, overflow_px: u32) -> ScrollStep {
        ScrollStep {
            index,
            scroll_offset: 0,
            is_last,
            overflow_px,
        }
    }

    #[test]
    fn non_final_strip_is_one_chunk_tall_at_any_ratio() {
        let profile = CaptureProfile::desktop();
        for ratio in [1, 2, 3] {
            let viewport = viewport(1920, 1080, ratio);
            let strip = crop_step(&fragment(&viewport), &step(2, false, 0), &viewport, &profile)
                .unwrap();
            // device rows, i.e. chunk_size_px CSS pixels once downscaled
            assert_eq!(strip.image.height(), profile.chunk_size_px * ratio);
            assert_eq!(strip.image.width(), 1920 * ratio);
            assert_eq!(strip.target_y, 1080 + 2 * profile.chunk_size_px);
        }
    }

    #[test]
    fn final_strip_without_overflow_keeps_everything_below_the_dead_zone() {
        let profile = CaptureProfile::desktop();
        let viewport = viewport(1920, 1080, 2);
        let strip =
            crop_step(&fragment(&viewport), &step(5, true, 0), &viewport, &profile).unwrap();
        assert_eq!(strip.image.height(), (1080 - 100) * 2);
    }

    #[test]
    fn final_strip_with_overflow_skips_the_already_covered_rows() {
        let profile = CaptureProfile::desktop();
        let viewport = viewport(1920, 1080, 1);
        // scenario: content 3200, step 6 clamped with 660px of overflow
        let strip =
            crop_step(&fragment(&viewport), &step(6, true, 660), &viewport, &profile).unwrap();
        assert_eq!(strip.image.height(), 1080 - 100 - 660);
        assert_eq!(strip.target_y, 1080 + 6 * 300);
    }

    #[test]
    fn oversized_crop_box_is_a_composition_error() {
        let profile = CaptureProfile::desktop();
        let viewport = viewport(1920, 1080, 1);
        // overflow so large the crop box starts below the fragment bottom
        let err = crop_step(&fragment(&viewport), &step(3, true, 1080), &viewport, &profile)
            .unwrap_err();
        assert!(matches!(err, Error::Composition(_)));
    }

    #[test]
    fn short_fragment_cannot_fit_a_chunk_band() {
        let profile = CaptureProfile::desktop();
        let viewport = viewport(1920, 1080, 1);
        // a fragment shorter than dead zone + chunk
        let short = DynamicImage::ImageRgba8(RgbaImage::new(1920, 350));
        let err = crop_step(&short, &step(0, false, 0), &viewport, &profile).unwrap_err();
        assert!(matches!(err, Error::Composition(_)));
    }
}
