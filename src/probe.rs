//! Read-only geometry queries against a live page session
//!
//! The probe takes one immutable snapshot of the viewport and page geometry
//! before any planning happens. Geometry is never refreshed mid-capture: a
//! page that resizes itself during the session is a stated limitation, not
//! something the pipeline detects.

use crate::{Error, Result, Session, Viewport};
use log::debug;
use std::thread;
use std::time::{Duration, Instant};

/// Scrollable content geometry, captured once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub content_width: u32,
    pub content_height: u32,
    /// `document.body.scrollHeight` at probe time
    pub scroll_max: u32,
    /// Number of viewport-sized pages the content spans
    pub page_count: u32,
}

fn query_dimension(session: &impl Session, js: &str, what: &str) -> Result<u32> {
    let value = session.evaluate(js)?;
    let n = value
        .as_f64()
        .ok_or_else(|| Error::Probe(format!("{} query returned non-numeric value: {}", what, value)))?;
    if n <= 0.0 {
        return Err(Error::Probe(format!(
            "{} query returned non-positive value: {}",
            what, n
        )));
    }
    Ok(n.round() as u32)
}

/// Query the viewport size and device pixel ratio.
///
/// Fractional pixel ratios are rounded to the nearest integer; every device
/// profile this crate emulates reports an integral ratio.
pub fn probe_viewport(session: &impl Session) -> Result<Viewport> {
    let width = query_dimension(session, "window.innerWidth", "viewport width")?;
    let height = query_dimension(session, "window.innerHeight", "viewport height")?;
    let pixel_ratio = query_dimension(session, "window.devicePixelRatio || 1", "device pixel ratio")?;
    debug!("Probed viewport: {}x{} @{}x", width, height, pixel_ratio);
    Ok(Viewport {
        width,
        height,
        pixel_ratio,
    })
}

/// Query the scrollable content geometry of the loaded page
pub fn probe_geometry(session: &impl Session, viewport: &Viewport) -> Result<PageGeometry> {
    let content_width = query_dimension(session, "document.body.clientWidth", "content width")?;
    let content_height = query_dimension(session, "document.body.clientHeight", "content height")?;
    let scroll_max = query_dimension(session, "document.body.scrollHeight", "scroll height")?;
    let page_count = content_height.div_ceil(viewport.height);
    debug!(
        "Probed geometry: {}x{}, scroll_max {}, {} page(s)",
        content_width, content_height, scroll_max, page_count
    );
    Ok(PageGeometry {
        content_width,
        content_height,
        scroll_max,
        page_count,
    })
}

/// Wait until the page layout is stable: poll the scroll height until two
/// consecutive reads agree, bounded by `timeout`.
///
/// Returns the stable scroll height. Pages that keep growing past the
/// deadline fail with a probe error rather than being captured mid-layout.
pub fn wait_for_stable_layout(
    session: &impl Session,
    poll: Duration,
    timeout: Duration,
) -> Result<u32> {
    let deadline = Instant::now() + timeout;
    let mut last = query_dimension(session, "document.body.scrollHeight", "scroll height")?;
    loop {
        thread::sleep(poll);
        let next = query_dimension(session, "document.body.scrollHeight", "scroll height")?;
        if next == last {
            debug!("Layout stable at scroll height {}", next);
            return Ok(next);
        }
        if Instant::now() >= deadline {
            return Err(Error::Probe(format!(
                "layout did not stabilize within {}ms (scroll height still moving: {} -> {})",
                timeout.as_millis(),
                last,
                next
            )));
        }
        last = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers geometry queries from a canned table; `scrollHeight` reads
    /// are popped from a queue to simulate a page that is still settling.
    struct StubSession {
        width: u32,
        height: u32,
        pixel_ratio: u32,
        content_height: u32,
        scroll_heights: RefCell<VecDeque<u32>>,
    }

    impl StubSession {
        fn settled(width: u32, height: u32, pixel_ratio: u32, content_height: u32) -> Self {
            Self {
                width,
                height,
                pixel_ratio,
                content_height,
                scroll_heights: RefCell::new(VecDeque::new()),
            }
        }
    }

    impl Session for StubSession {
        fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        fn evaluate(&self, js: &str) -> Result<Value> {
            let value = if js.contains("innerWidth") {
                json!(self.width)
            } else if js.contains("innerHeight") {
                json!(self.height)
            } else if js.contains("devicePixelRatio") {
                json!(self.pixel_ratio)
            } else if js.contains("clientWidth") {
                json!(self.width)
            } else if js.contains("clientHeight") {
                json!(self.content_height)
            } else if js.contains("scrollHeight") {
                let next = self.scroll_heights.borrow_mut().pop_front();
                json!(next.unwrap_or(self.content_height))
            } else {
                Value::Null
            };
            Ok(value)
        }

        fn capture_viewport(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn quit(self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn probes_viewport_and_geometry() {
        let session = StubSession::settled(1920, 1080, 1, 3200);
        let viewport = probe_viewport(&session).unwrap();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
        assert_eq!(viewport.pixel_ratio, 1);

        let geometry = probe_geometry(&session, &viewport).unwrap();
        assert_eq!(geometry.content_height, 3200);
        assert_eq!(geometry.scroll_max, 3200);
        assert_eq!(geometry.page_count, 3);
    }

    #[test]
    fn single_viewport_page_counts_as_one() {
        let session = StubSession::settled(390, 844, 3, 844);
        let viewport = probe_viewport(&session).unwrap();
        let geometry = probe_geometry(&session, &viewport).unwrap();
        assert_eq!(geometry.page_count, 1);
    }

    #[test]
    fn non_positive_dimension_is_a_probe_error() {
        let session = StubSession {
            scroll_heights: RefCell::new(VecDeque::from([0])),
            ..StubSession::settled(1920, 1080, 1, 3200)
        };
        let err =
            query_dimension(&session, "document.body.scrollHeight", "scroll height").unwrap_err();
        assert!(matches!(err, Error::Probe(_)));

        let err = query_dimension(&session, "void 0", "bogus").unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }

    #[test]
    fn layout_wait_returns_once_two_reads_agree() {
        let session = StubSession {
            scroll_heights: RefCell::new(VecDeque::from([1000, 2600, 3200, 3200])),
            ..StubSession::settled(1920, 1080, 1, 3200)
        };
        let stable = wait_for_stable_layout(
            &session,
            Duration::from_millis(1),
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(stable, 3200);
    }

    #[test]
    fn layout_wait_times_out_on_growing_page() {
        let session = StubSession {
            scroll_heights: RefCell::new(VecDeque::from_iter((0..10_000u32).map(|i| 1000 + i))),
            ..StubSession::settled(1920, 1080, 1, 3200)
        };
        let err = wait_for_stable_layout(
            &session,
            Duration::from_millis(1),
            Duration::from_millis(20),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }
}
