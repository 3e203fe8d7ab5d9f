//! UI-facing renderer handle.
//!
//! All methods only enqueue work for the render thread; the blocking calls
//! (`on_surface_created`, `on_surface_destroyed`, `destroy`) additionally
//! wait on a completion handshake so the caller never observes a surface in
//! use after being told it is gone.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::warn;

use crate::clock::FrameSource;
use crate::config::RendererConfig;
use crate::context::GraphicsContext;
use crate::delegate::RenderDelegate;

use super::executor::{Completion, CompletionGuard, TaskQueue, TaskTag};
use super::queue::{EventKind, EventQueue, RenderEvent, SnapshotQueue};
use super::scheduler::FrameRateObserver;
use super::thread::RenderThread;

/// Handle to the render thread for a live map surface.
///
/// Shareable across threads (`&self` everywhere); operations submitted from
/// one thread execute on the render thread in submission order.
pub struct MapRenderer<C: GraphicsContext> {
    queue: Arc<TaskQueue<RenderThread<C>>>,
    events: Arc<EventQueue>,
    snapshots: Arc<SnapshotQueue>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl<C: GraphicsContext> MapRenderer<C> {
    /// Spawn the render thread. Nothing draws until a surface arrives via
    /// [`on_surface_created`](Self::on_surface_created).
    pub fn new(
        context: C,
        delegate: Box<dyn RenderDelegate>,
        frame_source: Box<dyn FrameSource>,
        config: RendererConfig,
    ) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let events = Arc::new(EventQueue::new());
        let snapshots = Arc::new(SnapshotQueue::new());
        let join = RenderThread::spawn(
            context,
            delegate,
            frame_source,
            &config,
            Arc::clone(&queue),
            Arc::clone(&events),
            Arc::clone(&snapshots),
        );
        Self {
            queue,
            events,
            snapshots,
            join: Mutex::new(Some(join)),
        }
    }

    /// A platform surface became available. Blocks until the render thread
    /// has adopted it; a surface differing from the current one replaces it.
    pub fn on_surface_created(&self, surface: C::Surface, width: u32, height: u32) {
        self.run_blocking(move |rt| rt.handle_surface_created(surface, width, height));
    }

    pub fn on_surface_size_changed(&self, width: u32, height: u32) {
        self.queue
            .post(TaskTag::External, move |rt| rt.handle_size_changed(width, height));
    }

    /// The platform surface is going away. Blocks until the render thread
    /// has released it; the surface must not be used once this returns.
    pub fn on_surface_destroyed(&self) {
        self.run_blocking(|rt| rt.handle_surface_destroyed());
    }

    pub fn pause(&self) {
        self.queue.post(TaskTag::External, |rt| rt.handle_pause());
    }

    pub fn resume(&self) {
        self.queue.post(TaskTag::External, |rt| rt.handle_resume());
    }

    /// Cap the frame rate; effective from the next frame decision.
    pub fn set_maximum_fps(&self, fps: f64) {
        self.queue
            .post(TaskTag::External, move |rt| rt.handle_set_maximum_fps(fps));
    }

    /// Observe instantaneous frame rate, computed from presented-frame
    /// timestamp deltas. Pass `None` to remove the observer.
    pub fn set_frame_rate_observer(&self, observer: Option<FrameRateObserver>) {
        self.queue
            .post(TaskTag::External, move |rt| rt.handle_set_observer(observer));
    }

    /// Queue a unit of work. Events with `need_render` execute during the
    /// next frame, between the draw call and presentation; others run
    /// out-of-band on the render thread.
    pub fn queue_render_event(&self, event: RenderEvent) {
        if self.queue.is_stopped() {
            warn!("render thread already stopped; dropping render event");
            return;
        }
        if event.need_render {
            self.events.push(event);
            self.queue.post(TaskTag::Internal, |rt| rt.request_render());
        } else {
            let RenderEvent { runnable, kind, .. } = event;
            let run = move |_rt: &mut RenderThread<C>| runnable();
            match kind {
                EventKind::Priority => self.queue.post_front(TaskTag::External, run),
                EventKind::Ordinary => self.queue.post(TaskTag::External, run),
            };
        }
    }

    /// Capture a snapshot: `task` runs on the render thread before the next
    /// buffer presentation, exactly once.
    pub fn queue_snapshot(&self, task: impl FnOnce() + Send + 'static) {
        if self.queue.is_stopped() {
            warn!("render thread already stopped; dropping snapshot request");
            return;
        }
        self.snapshots.push(Box::new(task));
        self.queue.post(TaskTag::Internal, |rt| rt.request_render());
    }

    /// Tear everything down and stop the render thread. Blocks until the
    /// teardown completed; safe to call more than once and from multiple
    /// threads concurrently.
    pub fn destroy(&self) {
        self.run_blocking(|rt| rt.handle_destroy());
        let handle = self.join.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Post `f` and wait for it to run. If the task is discarded by a
    /// concurrent teardown (or the worker is already stopped), the completion
    /// guard still fires and the wait returns — after that teardown finished.
    fn run_blocking(&self, f: impl FnOnce(&mut RenderThread<C>) + Send + 'static) {
        let completion = Completion::new();
        let guard = CompletionGuard::new(Arc::clone(&completion));
        self.queue.post(TaskTag::External, move |rt| {
            let _guard = guard;
            f(rt);
        });
        completion.wait();
    }
}

impl<C: GraphicsContext> Drop for MapRenderer<C> {
    fn drop(&mut self) {
        self.destroy();
    }
}
