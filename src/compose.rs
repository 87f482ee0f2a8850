//! Canvas assembly: paste the first frame and every strip, trim the excess
//!
//! The canvas is allocated in CSS pixels at the probed scroll height. Strips
//! arrive at device resolution and are downscaled on paste. After the last
//! paste the canvas is cropped to the running total, which discards height
//! the probe over-measured on pages with dynamic or parallax content.

use crate::crop::CroppedStrip;
use crate::{Error, Result, Viewport};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::debug;

#[derive(Debug)]
pub struct Compositor {
    canvas: RgbaImage,
    viewport: Viewport,
    running_total: u32,
}

impl Compositor {
    /// Allocate a canvas of `(viewport.width, scroll_max)` CSS pixels
    pub fn new(viewport: &Viewport, scroll_max: u32) -> Result<Self> {
        if scroll_max < viewport.height {
            return Err(Error::Composition(format!(
                "canvas height {} cannot hold a {}px viewport frame",
                scroll_max, viewport.height
            )));
        }
        Ok(Self {
            canvas: RgbaImage::new(viewport.width, scroll_max),
            viewport: *viewport,
            running_total: 0,
        })
    }

    /// Paste the pre-scroll full-viewport frame at the origin
    pub fn paste_first_frame(&mut self, frame: &DynamicImage) -> Result<()> {
        let scaled = scale_to(frame, self.viewport.width, self.viewport.height);
        imageops::replace(&mut self.canvas, &scaled.to_rgba8(), 0, 0);
        self.running_total = self.viewport.height;
        debug!("Pasted first frame, running total {}", self.running_total);
        Ok(())
    }

    /// Paste one cropped strip at its target offset
    pub fn paste_strip(&mut self, strip: &CroppedStrip) -> Result<()> {
        let height_css = strip.image.height() / self.viewport.pixel_ratio;
        if height_css == 0 {
            return Err(Error::Composition(format!(
                "strip at y {} is shorter than one CSS pixel",
                strip.target_y
            )));
        }
        if strip.target_y < self.running_total {
            return Err(Error::Composition(format!(
                "strip at y {} would overlap content already pasted up to {}",
                strip.target_y, self.running_total
            )));
        }
        if strip.target_y + height_css > self.canvas.height() {
            return Err(Error::Composition(format!(
                "strip rows [{}, {}) exceed canvas height {}",
                strip.target_y,
                strip.target_y + height_css,
                self.canvas.height()
            )));
        }

        let scaled = scale_to(&strip.image, self.viewport.width, height_css);
        imageops::replace(&mut self.canvas, &scaled.to_rgba8(), 0, strip.target_y as i64);
        self.running_total = strip.target_y + height_css;
        debug!(
            "Pasted strip at y {}, running total {}",
            strip.target_y, self.running_total
        );
        Ok(())
    }

    /// Current pasted height in CSS pixels
    pub fn running_total(&self) -> u32 {
        self.running_total
    }

    /// Crop the canvas down to the pasted height and hand back the result
    pub fn finish(self) -> Result<DynamicImage> {
        if self.running_total == 0 {
            return Err(Error::Composition(
                "nothing was pasted onto the canvas".to_string(),
            ));
        }
        let width = self.canvas.width();
        let total = self.running_total;
        let canvas = DynamicImage::ImageRgba8(self.canvas);
        Ok(canvas.crop_imm(0, 0, width, total))
    }
}

/// Resize to exact dimensions, skipping the resample when the image is
/// already the right size so same-scale pastes stay bit-identical
fn scale_to(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.width() == width && image.height() == height {
        image.clone()
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }
}
