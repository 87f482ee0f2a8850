//! Async-friendly capture API backed by a dedicated worker thread
//!
//! The worker thread owns a synchronous [`CdpSession`] and executes commands
//! sent from async tasks, so callers get an async interface without the
//! session having to be `Send`. Commands drain strictly in order: scroll
//! position is shared browser state, so one session never interleaves two
//! captures. Parallel page capture means parallel [`Browser`] instances,
//! each with its own scratch directory keyed by URL slug.

use crate::cdp::CdpSession;
use crate::pipeline::{CaptureConfig, CapturePipeline};
use crate::{Error, Result, Session, SessionConfig};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Capture(String, Box<CaptureConfig>, oneshot::Sender<Result<PathBuf>>),
    Close(oneshot::Sender<Result<()>>),
}

/// A browser session usable from async code
#[derive(Clone)]
pub struct Browser {
    cmd_tx: Sender<Command>,
}

/// A handle for capturing pages in the browser
#[derive(Clone)]
pub struct Page {
    cmd_tx: Sender<Command>,
}

impl Browser {
    /// Create a new browser (spawns a background thread that owns the session)
    pub async fn new(config: Option<SessionConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize the session on the worker thread
            let mut session = match CdpSession::new(config) {
                Ok(session) => session,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Capture(url, capture_config, resp) => {
                        let res =
                            CapturePipeline::new(&capture_config).run(&mut session, &url);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let res = session.quit();
                        let _ = resp.send(res);
                        break;
                    }
                }
            }
        });

        let init_res = init_rx
            .await
            .map_err(|e| Error::Session(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Open a page handle backed by the same worker thread
    pub async fn new_page(&self) -> Result<Page> {
        Ok(Page {
            cmd_tx: self.cmd_tx.clone(),
        })
    }

    /// Convenience: capture a page without creating a handle first
    pub async fn capture_full_page(&self, url: &str, config: CaptureConfig) -> Result<PathBuf> {
        let page = self.new_page().await?;
        page.capture_full_page(url, config).await
    }

    /// Shut down the background worker and close the browser
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Session(format!("Close canceled: {}", e)))?
    }
}

impl Page {
    /// Capture a full-page screenshot of `url` and return the output path
    pub async fn capture_full_page(&self, url: &str, config: CaptureConfig) -> Result<PathBuf> {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(Command::Capture(url.to_string(), Box::new(config), tx));
        rx.await
            .map_err(|e| Error::Session(format!("Capture canceled: {}", e)))?
    }
}
