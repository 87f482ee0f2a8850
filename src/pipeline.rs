//! The capture-and-composite pipeline
//!
//! One state machine drives a page from navigation to the final stitched
//! image: probe geometry, build the scroll plan, capture fragments into the
//! transient store, crop each fragment into a strip, composite, save.
//! Failure during chunked capture is terminal and keeps the scratch
//! directory on disk; success tears it down.

use crate::capture::FragmentCapturer;
use crate::compose::Compositor;
use crate::crop;
use crate::plan::{self, CapturePlan, CaptureProfile};
use crate::probe;
use crate::store::TransientStore;
use crate::{Result, Session, Viewport};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a full-page capture run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub profile: CaptureProfile,
    /// Where the final image lands
    pub output_dir: PathBuf,
    /// Root under which per-page scratch directories are created
    pub scratch_root: PathBuf,
    /// Page-load budget
    pub navigation_timeout_ms: u64,
    /// Interval between layout-stability polls after navigation
    pub stability_poll_ms: u64,
    /// Give up waiting for a stable layout after this long
    pub stability_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            profile: CaptureProfile::desktop(),
            output_dir: PathBuf::from("screenshots"),
            scratch_root: PathBuf::from("var"),
            navigation_timeout_ms: 20_000,
            stability_poll_ms: 250,
            stability_timeout_ms: 10_000,
        }
    }
}

/// Pipeline stages, in the order a successful run passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Probed,
    Planned,
    ShortCircuitCapture,
    ChunkedCapture,
    Cropped,
    Composited,
    Done,
    Failed,
}

pub struct CapturePipeline<'a> {
    config: &'a CaptureConfig,
    stage: Stage,
}

impl<'a> CapturePipeline<'a> {
    pub fn new(config: &'a CaptureConfig) -> Self {
        Self {
            config,
            stage: Stage::Idle,
        }
    }

    /// Stage the pipeline last reached; `Failed` after an error
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the whole pipeline for one URL and return the output path
    pub fn run<S: Session>(&mut self, session: &mut S, url: &str) -> Result<PathBuf> {
        match self.drive(session, url) {
            Ok(path) => {
                self.advance(Stage::Done);
                Ok(path)
            }
            Err(err) => {
                self.stage = Stage::Failed;
                Err(err)
            }
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!("Pipeline stage: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn drive<S: Session>(&mut self, session: &mut S, url: &str) -> Result<PathBuf> {
        info!("Loading URL {}...", url);
        session.navigate(url, Duration::from_millis(self.config.navigation_timeout_ms))?;

        probe::wait_for_stable_layout(
            session,
            Duration::from_millis(self.config.stability_poll_ms),
            Duration::from_millis(self.config.stability_timeout_ms),
        )?;

        let viewport = probe::probe_viewport(session)?;
        let geometry = probe::probe_geometry(session, &viewport)?;
        self.advance(Stage::Probed);
        info!(
            "Page geometry: {}x{} over {} viewport page(s)",
            geometry.content_width, geometry.content_height, geometry.page_count
        );

        let plan = plan::build_plan(&viewport, &geometry, &self.config.profile);
        self.advance(Stage::Planned);

        let output_path = self.output_path(url, &viewport)?;

        let chunked = match plan {
            CapturePlan::ShortCircuit => {
                self.advance(Stage::ShortCircuitCapture);
                info!("Page fits in one viewport, taking a single capture");
                let bytes = session.capture_viewport()?;
                fs::write(&output_path, bytes)?;
                info!("Screenshot successfully saved to {}", output_path.display());
                return Ok(output_path);
            }
            CapturePlan::Chunked(chunked) => chunked,
        };

        self.advance(Stage::ChunkedCapture);
        let store = TransientStore::create(&self.config.scratch_root, url)?;
        let capturer = FragmentCapturer::new(session, &store, &self.config.profile);

        let first_frame_path = capturer.capture_first_frame()?;
        info!("Taking {} partial screenshot(s)...", chunked.fragment_count);

        let mut fragment_paths = Vec::with_capacity(chunked.steps.len());
        for step in &chunked.steps {
            info!(
                "Taking screenshot {} of {}...",
                step.index + 1,
                chunked.fragment_count
            );
            fragment_paths.push(capturer.capture_step(step)?);
        }

        info!("Chunking screenshots...");
        let mut strips = Vec::with_capacity(chunked.steps.len());
        for (step, path) in chunked.steps.iter().zip(&fragment_paths) {
            let fragment = store.read_image(path)?;
            let strip = crop::crop_step(&fragment, step, &viewport, &self.config.profile)?;
            store.write_image(&store.strip_path(step.index), &strip.image)?;
            strips.push(strip);
        }
        self.advance(Stage::Cropped);

        info!("Gluing screenshot...");
        let mut compositor = Compositor::new(&viewport, geometry.scroll_max)?;
        let first_frame = store.read_image(&first_frame_path)?;
        compositor.paste_first_frame(&first_frame)?;
        for strip in &strips {
            compositor.paste_strip(strip)?;
        }
        let composite = compositor.finish()?;
        self.advance(Stage::Composited);

        composite.save(&output_path)?;
        info!("Screenshot successfully saved to {}", output_path.display());

        if let Err(err) = store.teardown() {
            warn!("Failed to remove scratch directory: {}", err);
        }

        Ok(output_path)
    }

    fn output_path(&self, url: &str, viewport: &Viewport) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.output_dir)?;
        let digest = Sha256::digest(url.as_bytes());
        let tag = hex::encode(&digest[..4]);
        Ok(self.config.output_dir.join(format!(
            "screenshot-{}x{}-{}.png",
            viewport.width, viewport.height, tag
        )))
    }
}
