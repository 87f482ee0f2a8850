//! Scroll-offset scheduling for chunked capture
//!
//! Given the probed geometry and a capture profile, the plan builder decides
//! how many fragments are needed and where each one is taken. A page that
//! fits in a single viewport short-circuits the whole chunking machinery.

use crate::{PageGeometry, Viewport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one capture run.
///
/// `chunk_size_px` is how much fresh content each fragment contributes to
/// the stitched image; `dead_zone_px` is the band at the top of every
/// fragment that sticky headers repaint identically into, cropped away so
/// the chrome does not repeat down the stitched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureProfile {
    pub chunk_size_px: u32,
    pub dead_zone_px: u32,
    /// Blocking wait between scrolling and capturing, for pages that repaint
    /// asynchronously after scroll (parallax and animated backgrounds)
    pub settle_delay: Duration,
}

impl CaptureProfile {
    /// Standard desktop profile: 300px chunks below a 100px dead zone
    pub fn desktop() -> Self {
        Self {
            chunk_size_px: 300,
            dead_zone_px: 100,
            settle_delay: Duration::ZERO,
        }
    }

    /// Mobile profile: smaller chunks, taller dead zone for mobile chrome
    pub fn mobile() -> Self {
        Self {
            chunk_size_px: 200,
            dead_zone_px: 200,
            settle_delay: Duration::ZERO,
        }
    }

    /// Desktop geometry with a settle delay before every capture, for pages
    /// whose backgrounds keep painting after the scroll lands
    pub fn parallax() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            ..Self::desktop()
        }
    }
}

impl Default for CaptureProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// One planned scroll-and-capture step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStep {
    pub index: usize,
    /// Scroll offset in CSS pixels
    pub scroll_offset: u32,
    /// True exactly for the final step, which uses the tail crop
    pub is_last: bool,
    /// Amount by which the naive capture window would have run past
    /// `scroll_max`; zero everywhere except possibly the final step
    pub overflow_px: u32,
}

/// Outcome of planning a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePlan {
    /// The page fits in one viewport: take a single full-viewport capture
    /// and skip chunking entirely
    ShortCircuit,
    /// The page needs scroll-and-stitch
    Chunked(ChunkedPlan),
}

/// Schedule of scroll steps for a multi-viewport page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedPlan {
    pub chunk_size_px: u32,
    pub dead_zone_px: u32,
    pub fragment_count: usize,
    pub steps: Vec<ScrollStep>,
}

/// Build the capture plan for the probed page.
///
/// Offsets follow `viewport.height + i * chunk - dead_zone`, so each
/// fragment's dead zone lands exactly on content the previous strip already
/// covered. Overflow is evaluated on the final step only: offsets are
/// monotonic, so at most one step can be clamped, and a clamped step is by
/// construction the last one needed to reach the bottom of the page.
pub fn build_plan(
    viewport: &Viewport,
    geometry: &PageGeometry,
    profile: &CaptureProfile,
) -> CapturePlan {
    if geometry.page_count <= 1 {
        return CapturePlan::ShortCircuit;
    }

    let beyond_first = geometry
        .content_height
        .saturating_sub(viewport.height)
        .saturating_sub(profile.dead_zone_px);
    let fragment_count = beyond_first.div_ceil(profile.chunk_size_px) as usize;

    let mut steps = Vec::with_capacity(fragment_count);
    for index in 0..fragment_count {
        let naive_offset = (viewport.height + index as u32 * profile.chunk_size_px)
            .saturating_sub(profile.dead_zone_px);
        let naive_end = naive_offset + viewport.height;
        let is_last = index + 1 == fragment_count;

        let (scroll_offset, overflow_px) = if is_last && naive_end > geometry.scroll_max {
            (geometry.scroll_max, naive_end - geometry.scroll_max)
        } else {
            (naive_offset, 0)
        };

        steps.push(ScrollStep {
            index,
            scroll_offset,
            is_last,
            overflow_px,
        });
    }

    CapturePlan::Chunked(ChunkedPlan {
        chunk_size_px: profile.chunk_size_px,
        dead_zone_px: profile.dead_zone_px,
        fragment_count,
        steps,
    })
}
