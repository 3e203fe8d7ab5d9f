//! Render thread health monitoring and diagnostics.

use std::time::{Duration, Instant};

use tracing::debug;

/// Counters for render thread health, reported periodically at debug level.
#[derive(Debug, Clone)]
pub(super) struct RenderMetrics {
    /// Frames drawn and presented
    pub frames_drawn: u64,
    /// Frame signals dropped inside the suppression window
    pub frames_dropped: u64,
    /// Render events executed as part of a frame
    pub events_executed: u64,
    /// Snapshot tasks executed
    pub snapshots_executed: u64,
    /// Non-context-loss presentation failures
    pub swap_failures: u64,
    /// Context losses detected at presentation
    pub context_losses: u64,
    /// Preparation passes that ended in a scheduled retry
    pub prepare_retries: u64,
    /// Average full draw-pass time (microseconds)
    pub avg_frame_time_us: f64,
    /// Timestamp of last metrics log
    pub last_log_time: Instant,
    /// Logging cadence
    pub interval: Duration,
}

impl RenderMetrics {
    pub fn new(interval: Duration) -> Self {
        Self {
            frames_drawn: 0,
            frames_dropped: 0,
            events_executed: 0,
            snapshots_executed: 0,
            swap_failures: 0,
            context_losses: 0,
            prepare_retries: 0,
            avg_frame_time_us: 0.0,
            last_log_time: Instant::now(),
            interval,
        }
    }

    /// Fold one draw-pass duration into the running average.
    pub fn record_frame_time(&mut self, elapsed_us: f64) {
        self.avg_frame_time_us = 0.1 * elapsed_us + 0.9 * self.avg_frame_time_us;
    }

    /// Log and reset interval counters if enough time has passed.
    pub fn maybe_log(&mut self) {
        if self.last_log_time.elapsed() < self.interval {
            return;
        }

        debug!(
            "RENDER METRICS [tid={:?}]: drawn={}, dropped={}, events={}, snapshots={}, \
             swap_failures={}, context_losses={}, retries={}, avg_frame={:.2}μs",
            std::thread::current().id(),
            self.frames_drawn,
            self.frames_dropped,
            self.events_executed,
            self.snapshots_executed,
            self.swap_failures,
            self.context_losses,
            self.prepare_retries,
            self.avg_frame_time_us
        );

        // Reset counters for next interval (show per-interval rates)
        self.frames_drawn = 0;
        self.frames_dropped = 0;
        self.events_executed = 0;
        self.snapshots_executed = 0;
        self.swap_failures = 0;
        self.context_losses = 0;
        self.prepare_retries = 0;
        self.last_log_time = Instant::now();
    }
}
