//! Background consumer of the peak sample publisher.
//!
//! Mirrors what an XY scope display does: poll the latest pair at a fixed
//! frame rate, independent of the audio block rate.

use allhaas_core::PeakSamplePublisher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Polling rate of the scope thread.
pub const SCOPE_FPS: f64 = 60.0;

/// Handle to a running scope thread. Dropping it stops the thread.
pub struct ScopePoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl ScopePoller {
    /// Start polling `publisher` at [`SCOPE_FPS`].
    pub fn spawn(publisher: Arc<PeakSamplePublisher>) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let interval = Duration::from_secs_f64(1.0 / SCOPE_FPS);

        let handle = std::thread::Builder::new()
            .name("allhaas-scope".into())
            .spawn(move || {
                let mut frames = 0u64;
                while !thread_stop.load(Ordering::Relaxed) {
                    let (x, y) = publisher.load();
                    tracing::debug!(frame = frames, x, y, "scope");
                    frames += 1;
                    std::thread::sleep(interval);
                }
                frames
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the thread and return how many frames it drew.
    pub fn finish(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.stop.store(true, Ordering::Relaxed);
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for ScopePoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
