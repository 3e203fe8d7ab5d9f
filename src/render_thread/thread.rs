//! Render thread implementation.
//!
//! Owns the graphics context, lifecycle state, and frame pacing; everything
//! here executes inside task closures pulled off the serial [`TaskQueue`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::clock::FrameSource;
use crate::config::RendererConfig;
use crate::context::{GraphicsContext, SwapResult};
use crate::delegate::RenderDelegate;

use super::executor::{ClearMode, TaskKey, TaskQueue, TaskTag};
use super::lifecycle::{PrepareOutcome, SurfaceLifecycle};
use super::metrics::RenderMetrics;
use super::queue::{EventQueue, SnapshotQueue};
use super::scheduler::{FrameRateObserver, FrameScheduler};

/// Worker-owned render state. One instance lives for the whole thread; tasks
/// receive `&mut self` and run strictly in submission order.
pub(crate) struct RenderThread<C: GraphicsContext> {
    queue: Arc<TaskQueue<RenderThread<C>>>,
    events: Arc<EventQueue>,
    snapshots: Arc<SnapshotQueue>,

    lifecycle: SurfaceLifecycle<C>,
    scheduler: FrameScheduler,
    metrics: RenderMetrics,
    delegate: Box<dyn RenderDelegate>,
    frame_source: Box<dyn FrameSource>,

    /// Single-slot frame subscription: true while a signal is outstanding.
    frame_pending: bool,
    /// Bumped when `frame_pending` is force-cleared so a signal from an
    /// already-outstanding subscription of the previous surface generation
    /// is ignored instead of driving a duplicate pass.
    frame_epoch: u64,
    retry_delay: Duration,
}

impl<C: GraphicsContext> RenderThread<C> {
    /// Spawn the render thread. All further interaction goes through `queue`.
    pub fn spawn(
        context: C,
        delegate: Box<dyn RenderDelegate>,
        frame_source: Box<dyn FrameSource>,
        config: &RendererConfig,
        queue: Arc<TaskQueue<RenderThread<C>>>,
        events: Arc<EventQueue>,
        snapshots: Arc<SnapshotQueue>,
    ) -> JoinHandle<()> {
        let mut scheduler = FrameScheduler::new();
        scheduler.set_maximum_fps(config.max_fps);
        let metrics = RenderMetrics::new(Duration::from_secs(config.metrics_interval_secs.max(1)));
        let lifecycle = SurfaceLifecycle::new(context, config.teardown);
        let retry_delay = Duration::from_millis(config.retry_delay_ms);

        thread::Builder::new()
            .name("map-render".into())
            .spawn(move || {
                let mut rt = RenderThread {
                    queue,
                    events,
                    snapshots,
                    lifecycle,
                    scheduler,
                    metrics,
                    delegate,
                    frame_source,
                    frame_pending: false,
                    frame_epoch: 0,
                    retry_delay,
                };
                rt.run();
            })
            .expect("failed to spawn map render thread")
    }

    fn run(&mut self) {
        debug!("map render thread started");
        while let Some(task) = self.queue.clone().take_next() {
            task.execute(self);
            self.metrics.maybe_log();
        }
        debug!("map render thread finished");
    }

    /// Subscribe to the next frame signal if none is outstanding.
    pub fn request_render(&mut self) {
        if self.frame_pending {
            return;
        }
        self.frame_pending = true;
        let queue = Arc::clone(&self.queue);
        let epoch = self.frame_epoch;
        self.frame_source.request_frame(Box::new(move |ts| {
            // Frame signals jump the queue so pacing stays accurate even
            // under a backlog of ordinary tasks.
            queue.post_front(TaskTag::Internal, move |rt: &mut RenderThread<C>| {
                rt.on_frame_signal(ts, epoch)
            });
        }));
    }

    /// Entry point for each frame signal: run the preparation path until the
    /// surface is bound, then one draw pass.
    pub fn on_frame_signal(&mut self, ts_ns: i64, epoch: u64) {
        if epoch != self.frame_epoch {
            trace!("ignoring frame signal from a superseded subscription");
            return;
        }
        self.frame_pending = false;
        match self.lifecycle.prepare(self.delegate.as_mut()) {
            PrepareOutcome::Ready => self.draw_pass(ts_ns),
            PrepareOutcome::Aborted => {
                self.scheduler.reset_pacing();
            }
            PrepareOutcome::Retry => {
                self.metrics.prepare_retries += 1;
                self.scheduler.reset_pacing();
                self.schedule_retry();
            }
        }
    }

    fn draw_pass(&mut self, ts_ns: i64) {
        let start = Instant::now();
        if self.scheduler.in_suppression_window(start) {
            // Dropped, not queued: leave all queued work for the next
            // eligible frame.
            self.metrics.frames_dropped += 1;
            self.request_render();
            return;
        }

        self.delegate.on_draw_frame();

        // Commands may touch the graphics context, so they run after the draw
        // call and before presentation to land in this frame.
        for event in self.events.drain() {
            (event.runnable)();
            self.metrics.events_executed += 1;
        }
        // Snapshots read back pixels, which some backends invalidate right
        // after presentation.
        for snapshot in self.snapshots.drain() {
            snapshot();
            self.metrics.snapshots_executed += 1;
        }

        match self.lifecycle.swap_buffers() {
            SwapResult::Success => {
                self.metrics.frames_drawn += 1;
                self.scheduler.frame_presented(start, ts_ns);
            }
            SwapResult::ContextLost => {
                warn!("context lost at presentation; releasing for lazy reacquire");
                self.metrics.context_losses += 1;
                self.lifecycle.on_context_lost();
                self.scheduler.reset_pacing();
            }
            SwapResult::Other(code) => {
                warn!(code, "buffer presentation failed; releasing surface binding");
                self.metrics.swap_failures += 1;
                self.lifecycle.on_swap_failure();
                self.scheduler.reset_pacing();
            }
        }

        self.metrics
            .record_frame_time(start.elapsed().as_micros() as f64);

        // While a surface is attached, the platform's per-frame callback is
        // modeled as continuous resubscription.
        self.request_render();
    }

    fn schedule_retry(&mut self) {
        debug!("surface not ready; retrying in {:?}", self.retry_delay);
        // Deduped by key: a retry already in flight absorbs this one.
        self.queue.post_delayed(
            TaskKey::PrepareRetry,
            self.retry_delay,
            TaskTag::Internal,
            |rt| rt.request_render(),
        );
    }

    pub fn handle_surface_created(&mut self, surface: C::Surface, width: u32, height: u32) {
        debug!(width, height, "surface created");
        // Engine-internal work queued against the old surface is stale;
        // caller-enqueued ordinary events survive the swap.
        self.events.clear_internal();
        self.snapshots.clear();
        self.queue.clear(ClearMode::InternalOnly);
        self.frame_pending = false;
        self.frame_epoch = self.frame_epoch.wrapping_add(1);
        self.scheduler.reset_pacing();
        self.lifecycle.adopt_surface(surface, width, height);
        self.request_render();
    }

    pub fn handle_surface_destroyed(&mut self) {
        debug!("surface destroyed");
        self.queue.clear(ClearMode::InternalOnly);
        self.frame_pending = false;
        self.frame_epoch = self.frame_epoch.wrapping_add(1);
        self.lifecycle.surface_destroyed(self.delegate.as_mut());
        self.scheduler.reset_pacing();
    }

    pub fn handle_size_changed(&mut self, width: u32, height: u32) {
        if self.lifecycle.size_changed(width, height) {
            debug!(width, height, "surface size changed");
            self.request_render();
        }
    }

    pub fn handle_pause(&mut self) {
        debug!("render paused");
        self.lifecycle.pause();
        self.scheduler.reset_pacing();
    }

    pub fn handle_resume(&mut self) {
        debug!("render resumed");
        if self.lifecycle.resume() {
            self.request_render();
        }
    }

    pub fn handle_set_maximum_fps(&mut self, fps: f64) {
        self.scheduler.set_maximum_fps(fps);
    }

    pub fn handle_set_observer(&mut self, observer: Option<FrameRateObserver>) {
        self.scheduler.set_observer(observer);
    }

    /// Final teardown: release everything, drop all queued work (including
    /// caller-enqueued events), and stop the worker.
    pub fn handle_destroy(&mut self) {
        debug!("render thread destroy requested");
        self.lifecycle.destroy(self.delegate.as_mut());
        self.events.clear_all();
        self.snapshots.clear();
        self.queue.clear(ClearMode::All);
        self.queue.stop();
    }
}
