//! Surface lifecycle state machine.
//!
//! Tracks one surface generation at a time:
//! `NO_SURFACE → CONTEXT_PENDING → SURFACE_BOUND → (LOST ⇄ SURFACE_BOUND) →
//! DESTROYED`, expressed through flags rather than an explicit state enum.
//! Every method runs on the render thread; the UI thread reaches this state
//! only through queued tasks.

use tracing::{debug, trace, warn};

use crate::config::TeardownPolicy;
use crate::context::{Dimensions, GraphicsContext, NativeSurface};
use crate::delegate::RenderDelegate;

/// Result of one preparation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrepareOutcome {
    /// Surface bound and current; drawing may proceed.
    Ready,
    /// Preparation is not allowed right now (paused, exiting, unsupported,
    /// or no surface). No retry is scheduled.
    Aborted,
    /// Transient failure; retry after the configured delay.
    Retry,
}

pub(crate) struct SurfaceLifecycle<C: GraphicsContext> {
    context: C,
    surface: Option<C::Surface>,
    dims: Dimensions,
    policy: TeardownPolicy,

    context_prepared: bool,
    native_created: bool,
    /// Whether the delegate was notified for the current binding. Cleared
    /// whenever the binding is released so a rebind re-notifies, and only set
    /// after a fully successful pass: a bind whose make-current still fails
    /// must not count as notified.
    bind_notified: bool,
    render_not_supported: bool,
    paused: bool,
    exiting: bool,
    size_changed: bool,
    /// One-generation bypass of the paused/exiting gates, set when a new
    /// surface arrives while the previous generation may still be winding
    /// down. Cleared on the first successful preparation pass.
    creating: bool,
    render_requested_while_paused: bool,
}

impl<C: GraphicsContext> SurfaceLifecycle<C> {
    pub fn new(context: C, policy: TeardownPolicy) -> Self {
        Self {
            context,
            surface: None,
            dims: Dimensions::default(),
            policy,
            context_prepared: false,
            native_created: false,
            bind_notified: false,
            render_not_supported: false,
            paused: false,
            exiting: false,
            size_changed: false,
            creating: false,
            render_requested_while_paused: false,
        }
    }

    /// Adopt a (possibly replacement) surface. A differing surface releases
    /// the existing binding but keeps the shared context.
    pub fn adopt_surface(&mut self, surface: C::Surface, width: u32, height: u32) {
        let differing = self
            .surface
            .as_ref()
            .map(|s| s.surface_id() != surface.surface_id())
            .unwrap_or(true);
        if differing {
            trace!(id = surface.surface_id(), "adopting replacement surface");
            self.context.make_nothing_current();
            self.context.release_surface_binding();
            self.bind_notified = false;
            if let Some(mut old) = self.surface.take() {
                old.release();
            }
        }
        self.surface = Some(surface);
        self.dims = Dimensions::new(width, height);
        // A fresh surface generation may try preparation again even after a
        // permanent failure on the previous one.
        self.render_not_supported = false;
        self.creating = true;
    }

    /// Run one preparation pass. Called on every requested frame until the
    /// surface is bound; cheap once bound.
    pub fn prepare(&mut self, delegate: &mut dyn RenderDelegate) -> PrepareOutcome {
        if !self.creating {
            if self.exiting || self.render_not_supported {
                return PrepareOutcome::Aborted;
            }
            if self.paused {
                self.render_requested_while_paused = true;
                return PrepareOutcome::Aborted;
            }
        }
        let Some(surface) = self.surface.as_ref() else {
            return PrepareOutcome::Aborted;
        };

        if !self.context_prepared {
            match self.context.prepare() {
                Ok(()) => self.context_prepared = true,
                Err(e) if e.is_permanent() => {
                    warn!("context preparation failed permanently: {e}");
                    self.render_not_supported = true;
                    return PrepareOutcome::Aborted;
                }
                Err(e) => {
                    debug!("context not ready: {e}");
                    return PrepareOutcome::Retry;
                }
            }
        }

        if !surface.is_valid() {
            trace!("surface not yet valid");
            return PrepareOutcome::Retry;
        }

        let fresh_bind = !self.context.has_surface_binding();
        if fresh_bind {
            if let Err(e) = self.context.create_surface_binding(surface, self.dims) {
                debug!("surface binding failed: {e}");
                return PrepareOutcome::Retry;
            }
        }
        if !self.context.make_current() {
            debug!("make_current failed");
            return PrepareOutcome::Retry;
        }

        if !self.bind_notified || self.size_changed {
            if self.size_changed && !fresh_bind {
                self.context.reconfigure(self.dims);
            }
            self.size_changed = false;
            if !self.native_created {
                self.native_created = true;
                delegate.on_surface_created();
            }
            delegate.on_surface_changed(self.dims.width, self.dims.height);
            self.bind_notified = true;
        }

        self.creating = false;
        self.exiting = false;
        PrepareOutcome::Ready
    }

    /// Apply a size change from the UI thread. Returns whether the size
    /// actually differed.
    pub fn size_changed(&mut self, width: u32, height: u32) -> bool {
        let dims = Dimensions::new(width, height);
        if dims == self.dims {
            return false;
        }
        self.dims = dims;
        self.size_changed = true;
        true
    }

    /// The platform surface is going away. What survives depends on the
    /// teardown policy.
    pub fn surface_destroyed(&mut self, delegate: &mut dyn RenderDelegate) {
        self.exiting = true;
        match self.policy {
            TeardownPolicy::ReleaseAll if self.native_created => {
                self.full_release(delegate);
            }
            _ => {
                // Keep the shared context alive for fast reattachment.
                self.context.make_nothing_current();
                self.context.release_surface_binding();
                self.bind_notified = false;
                if let Some(mut surface) = self.surface.take() {
                    surface.release();
                }
            }
        }
    }

    /// Final teardown, run at most once effectively.
    pub fn destroy(&mut self, delegate: &mut dyn RenderDelegate) {
        self.exiting = true;
        if self.native_created {
            self.full_release(delegate);
        } else {
            self.context.make_nothing_current();
            self.context.release_surface_binding();
            self.context.release();
            self.context_prepared = false;
            self.bind_notified = false;
            if let Some(mut surface) = self.surface.take() {
                surface.release();
            }
        }
    }

    fn full_release(&mut self, delegate: &mut dyn RenderDelegate) {
        delegate.on_surface_destroyed();
        self.native_created = false;
        self.bind_notified = false;
        self.context.make_nothing_current();
        self.context.release_surface_binding();
        self.context.release();
        self.context_prepared = false;
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
    }

    /// Presentation reported a lost context: drop everything GPU-side and let
    /// the next preparation pass reacquire lazily. The delegate only sees a
    /// gap in draw calls.
    pub fn on_context_lost(&mut self) {
        self.context.make_nothing_current();
        self.context.release_surface_binding();
        self.context.release();
        self.context_prepared = false;
        self.bind_notified = false;
    }

    /// Presentation failed without losing the context: drop only the binding.
    pub fn on_swap_failure(&mut self) {
        self.context.release_surface_binding();
        self.bind_notified = false;
    }

    pub fn swap_buffers(&mut self) -> crate::context::SwapResult {
        self.context.swap_buffers()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clear the pause flag; returns whether a render was requested while
    /// paused and should be re-triggered now.
    pub fn resume(&mut self) -> bool {
        self.paused = false;
        std::mem::take(&mut self.render_requested_while_paused)
    }
}
