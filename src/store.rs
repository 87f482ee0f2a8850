//! Per-page scratch directory for intermediate fragments
//!
//! Each capture owns a directory keyed by a slug of the URL, holding the
//! pre-scroll frame (`page_0.png`), raw fragments (`part_{i}.png`) and
//! cropped strips (`part_{i}_chunk.png`). The directory is removed once
//! compositing succeeds and retained on failure as the recovery artifact.

use crate::Result;
use image::DynamicImage;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Derive a filesystem-safe slug from a URL: scheme dropped, path folded
/// into the name, anything exotic flattened to underscores
pub fn url_slug(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => {
            let mut raw = parsed.host_str().unwrap_or_default().to_string();
            raw.push_str(parsed.path());
            raw
        }
        Err(_) => url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string(),
    };
    raw.trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Scratch directory for one page capture
pub struct TransientStore {
    dir: PathBuf,
}

impl TransientStore {
    /// Create the scratch directory for `url` under `scratch_root`
    pub fn create(scratch_root: &Path, url: &str) -> Result<Self> {
        let dir = scratch_root.join(url_slug(url));
        fs::create_dir_all(&dir)?;
        debug!("Created scratch directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the pre-scroll full-viewport frame
    pub fn first_frame_path(&self) -> PathBuf {
        self.dir.join("page_0.png")
    }

    /// Path of the raw fragment for one scroll step
    pub fn fragment_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part_{}.png", index))
    }

    /// Path of the cropped strip for one scroll step
    pub fn strip_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part_{}_chunk.png", index))
    }

    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn write_image(&self, path: &Path, image: &DynamicImage) -> Result<()> {
        image.save(path)?;
        Ok(())
    }

    pub fn read_image(&self, path: &Path) -> Result<DynamicImage> {
        Ok(image::open(path)?)
    }

    /// Remove the scratch directory and everything in it.
    ///
    /// Only called after compositing succeeds; on failure the store is
    /// simply dropped and the directory stays on disk for inspection.
    pub fn teardown(self) -> Result<()> {
        debug!("Removing scratch directory {}", self.dir.display());
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }
}
