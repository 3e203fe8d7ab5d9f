//! Frame pacing.
//!
//! Converts a maximum frame rate into a minimum inter-frame interval and
//! enforces it with a suppression window: after a fast frame, signals landing
//! inside the window are dropped outright (no queued work is consumed) so the
//! effective rate stays below the display's native refresh without missing
//! the next eligible frame.

use std::time::{Duration, Instant};

use tracing::warn;

/// Observer for instantaneous frame-rate reports.
pub type FrameRateObserver = Box<dyn Fn(f64) + Send>;

pub(crate) struct FrameScheduler {
    target_interval: Option<Duration>,
    suppress_until: Option<Instant>,
    /// Frame-signal timestamp of the last presented frame, for the fps delta.
    last_present_ns: Option<i64>,
    observer: Option<FrameRateObserver>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            target_interval: None,
            suppress_until: None,
            last_present_ns: None,
            observer: None,
        }
    }

    /// Cap the frame rate; takes effect at the next frame decision.
    /// Non-positive values remove the cap.
    pub fn set_maximum_fps(&mut self, fps: f64) {
        if fps > 0.0 {
            self.target_interval = Some(Duration::from_nanos((1e9 / fps) as u64));
        } else {
            if fps < 0.0 {
                warn!(fps, "ignoring negative frame-rate cap");
            }
            self.target_interval = None;
        }
    }

    /// Whether a signal at `now` falls inside the suppression window left by
    /// the previous frame. A suppressed signal drops the whole pass.
    pub fn in_suppression_window(&mut self, now: Instant) -> bool {
        match self.suppress_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.suppress_until = None;
                false
            }
            None => false,
        }
    }

    /// Record a presented frame: arm the suppression window if the pass beat
    /// the target interval, and report instantaneous fps to the observer
    /// (skipped for the first frame after a gap).
    pub fn frame_presented(&mut self, started: Instant, signal_ts_ns: i64) {
        if let Some(target) = self.target_interval
            && started.elapsed() < target
        {
            self.suppress_until = Some(started + target);
        }

        if let Some(prev) = self.last_present_ns {
            let delta = signal_ts_ns.saturating_sub(prev);
            if delta > 0
                && let Some(observer) = &self.observer
            {
                observer(1e9 / delta as f64);
            }
        }
        self.last_present_ns = Some(signal_ts_ns);
    }

    /// Forget pacing history across pauses, teardowns, and failed presents so
    /// the next presented frame is treated as first-after-gap.
    pub fn reset_pacing(&mut self) {
        self.suppress_until = None;
        self.last_present_ns = None;
    }

    pub fn set_observer(&mut self, observer: Option<FrameRateObserver>) {
        self.observer = observer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fast_frames_arm_the_suppression_window() {
        let mut scheduler = FrameScheduler::new();
        scheduler.set_maximum_fps(30.0);

        let start = Instant::now();
        scheduler.frame_presented(start, 0);
        // ~33ms window: 1ms later is suppressed, 40ms later is not.
        assert!(scheduler.in_suppression_window(start + Duration::from_millis(1)));
        assert!(!scheduler.in_suppression_window(start + Duration::from_millis(40)));
    }

    #[test]
    fn uncapped_scheduler_never_suppresses() {
        let mut scheduler = FrameScheduler::new();
        let start = Instant::now();
        scheduler.frame_presented(start, 0);
        assert!(!scheduler.in_suppression_window(start + Duration::from_nanos(1)));
    }

    #[test]
    fn observer_skips_first_frame_after_gap() {
        let mut scheduler = FrameScheduler::new();
        let reports: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        scheduler.set_observer(Some(Box::new(move |fps| {
            sink.lock().unwrap().push(fps);
        })));

        let start = Instant::now();
        scheduler.frame_presented(start, 0);
        assert!(reports.lock().unwrap().is_empty());

        scheduler.frame_presented(start, 16_666_667);
        let seen = reports.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!((seen[0] - 60.0).abs() < 1.0);

        scheduler.reset_pacing();
        scheduler.frame_presented(start, 33_333_334);
        assert_eq!(reports.lock().unwrap().len(), 1);
    }
}
