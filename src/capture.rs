//! Fragment capture: scroll, settle, shoot, persist, verify
//!
//! Capture failures are hard faults. A fragment that is not observable on
//! disk right after the capture call means the session is gone, so the
//! pipeline halts without retrying and leaves the scratch directory behind
//! for diagnosis.

use crate::plan::{CaptureProfile, ScrollStep};
use crate::store::TransientStore;
use crate::{Error, Result, Session};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::thread;

pub struct FragmentCapturer<'a, S: Session> {
    session: &'a S,
    store: &'a TransientStore,
    profile: &'a CaptureProfile,
}

impl<'a, S: Session> FragmentCapturer<'a, S> {
    pub fn new(session: &'a S, store: &'a TransientStore, profile: &'a CaptureProfile) -> Self {
        Self {
            session,
            store,
            profile,
        }
    }

    /// Capture the pre-scroll full-viewport frame.
    ///
    /// This frame anchors the top of the stitched image and is not part of
    /// the indexed fragment sequence.
    pub fn capture_first_frame(&self) -> Result<PathBuf> {
        let path = self.store.first_frame_path();
        let bytes = self.session.capture_viewport()?;
        self.store.write_bytes(&path, &bytes)?;
        Ok(path)
    }

    /// Scroll to the step's offset, wait out the settle delay, capture the
    /// viewport and persist it keyed by the step index.
    pub fn capture_step(&self, step: &ScrollStep) -> Result<PathBuf> {
        debug!(
            "Scroll offset: {} (step {}, overflow {})",
            step.scroll_offset, step.index, step.overflow_px
        );
        self.session.scroll_to(step.scroll_offset)?;

        if !self.profile.settle_delay.is_zero() {
            thread::sleep(self.profile.settle_delay);
        }

        let path = self.store.fragment_path(step.index);
        let bytes = self.session.capture_viewport()?;
        self.store.write_bytes(&path, &bytes)?;

        let observed = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if !observed {
            return Err(Error::CaptureMissing {
                index: step.index,
                path,
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::cell::Cell;
    use std::env;
    use std::path::Path;
    use std::time::Duration;

    /// Session that records scroll offsets and can be told to return an
    /// empty capture, simulating a session lost mid-pipeline
    struct RecordingSession {
        last_scroll: Cell<u32>,
        fail_captures: bool,
    }

    impl RecordingSession {
        fn new(fail_captures: bool) -> Self {
            Self {
                last_scroll: Cell::new(0),
                fail_captures,
            }
        }
    }

    impl Session for RecordingSession {
        fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        fn evaluate(&self, js: &str) -> Result<Value> {
            if let Some(rest) = js.strip_prefix("window.scrollTo(0, ") {
                let y: u32 = rest.trim_end_matches(");").parse().unwrap();
                self.last_scroll.set(y);
            }
            Ok(Value::Null)
        }

        fn capture_viewport(&self) -> Result<Vec<u8>> {
            if self.fail_captures {
                Ok(Vec::new())
            } else {
                Ok(b"fake png bytes".to_vec())
            }
        }

        fn quit(self) -> Result<()> {
            Ok(())
        }
    }

    fn store(tag: &str) -> TransientStore {
        let root = env::temp_dir().join(format!(
            "pagestitch-capture-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        TransientStore::create(&root, "https://example.com/capture").unwrap()
    }

    fn cleanup(store: TransientStore) {
        let parent = store.dir().parent().map(Path::to_path_buf);
        let _ = store.teardown();
        if let Some(parent) = parent {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn capture_step_scrolls_then_persists_by_index() {
        let session = RecordingSession::new(false);
        let store = store("persists");
        let profile = CaptureProfile::desktop();
        let capturer = FragmentCapturer::new(&session, &store, &profile);

        let step = ScrollStep {
            index: 4,
            scroll_offset: 2180,
            is_last: false,
            overflow_px: 0,
        };
        let path = capturer.capture_step(&step).unwrap();

        assert_eq!(session.last_scroll.get(), 2180);
        assert!(path.ends_with("part_4.png"));
        assert!(path.exists());
        cleanup(store);
    }

    #[test]
    fn empty_capture_is_reported_missing_with_its_index() {
        let session = RecordingSession::new(true);
        let store = store("missing");
        let profile = CaptureProfile::desktop();
        let capturer = FragmentCapturer::new(&session, &store, &profile);

        let step = ScrollStep {
            index: 3,
            scroll_offset: 1880,
            is_last: false,
            overflow_px: 0,
        };
        let err = capturer.capture_step(&step).unwrap_err();
        match err {
            Error::CaptureMissing { index, .. } => assert_eq!(index, 3),
            other => panic!("expected CaptureMissing, got {:?}", other),
        }
        cleanup(store);
    }

    #[test]
    fn first_frame_is_not_part_of_the_indexed_sequence() {
        let session = RecordingSession::new(false);
        let store = store("first");
        let profile = CaptureProfile::desktop();
        let capturer = FragmentCapturer::new(&session, &store, &profile);

        let path = capturer.capture_first_frame().unwrap();
        assert!(path.ends_with("page_0.png"));
        // no scroll was issued for the first frame
        assert_eq!(session.last_scroll.get(), 0);
        cleanup(store);
    }
}
