//! Display frame-signal source.
//!
//! The render thread subscribes one-shot callbacks and receives a monotonic
//! nanosecond timestamp per signal. Idempotent-resubscribe bookkeeping lives
//! on the render thread; sources only deliver.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// One-shot frame callback carrying a monotonic timestamp in nanoseconds.
pub type FrameCallback = Box<dyn FnOnce(i64) + Send>;

/// External per-display-refresh notification used to pace draw attempts.
pub trait FrameSource: Send + 'static {
    /// Register a single-shot callback for the next frame boundary. The
    /// callback may fire on any thread.
    fn request_frame(&mut self, callback: FrameCallback);
}

/// Timer-backed frame source for hosts without a native vsync callback.
///
/// A dedicated thread collects pending requests and fires them on a fixed
/// refresh cadence. Requests arriving between ticks coalesce onto the next
/// tick; an idle source sleeps on its channel.
pub struct IntervalFrameSource {
    tx: Option<mpsc::Sender<FrameCallback>>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalFrameSource {
    pub fn new(refresh_rate: f64) -> Self {
        let interval = Duration::from_secs_f64(1.0 / refresh_rate.max(1.0));
        let (tx, rx) = mpsc::channel::<FrameCallback>();

        let handle = thread::Builder::new()
            .name("frame-clock".into())
            .spawn(move || {
                debug!("frame clock started ({:?} interval)", interval);
                let epoch = Instant::now();
                let mut next_tick = epoch + interval;
                loop {
                    // Block until at least one subscriber wants a frame.
                    let first = match rx.recv() {
                        Ok(cb) => cb,
                        Err(_) => break,
                    };
                    let mut pending = vec![first];
                    while let Ok(cb) = rx.try_recv() {
                        pending.push(cb);
                    }

                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    }
                    next_tick += interval;
                    if next_tick < Instant::now() {
                        next_tick = Instant::now() + interval;
                    }

                    let ts = epoch.elapsed().as_nanos() as i64;
                    for cb in pending {
                        cb(ts);
                    }
                }
                debug!("frame clock finished");
            })
            .expect("failed to spawn frame clock thread");

        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }
}

impl FrameSource for IntervalFrameSource {
    fn request_frame(&mut self, callback: FrameCallback) {
        let Some(ref tx) = self.tx else {
            warn!("frame clock sender already dropped");
            return;
        };
        if tx.send(callback).is_err() {
            warn!("frame clock thread disconnected");
        }
    }
}

impl Drop for IntervalFrameSource {
    fn drop(&mut self) {
        // Drop the sender first so recv() unblocks, then join.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
