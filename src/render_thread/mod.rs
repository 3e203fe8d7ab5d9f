//! Threaded map rendering
//!
//! Decouples surface lifecycle and frame production from the UI thread.
//! A single worker owns the graphics context; the UI thread never touches
//! GPU state directly.
//!
//! # Architecture
//!
//! ```text
//! UI Thread                        Render Thread              Frame Source
//!     │                                 │                          │
//! [surfaceCreated / resize /
//!  pause / events]───(task queue)───►[Execute]                    │
//!     │                              [Prepare surface]            │
//!     │                              [request_frame]──────────────►
//!     │                                 │                    [next vsync]
//!     │                              [on_frame_signal]◄───(task)──┘
//!     │                              [draw → events → snapshots → swap]
//! ```
//!
//! Blocking lifecycle calls (`on_surface_created`, `on_surface_destroyed`,
//! `destroy`) wait on a completion handshake; everything else is
//! fire-and-forget. The event and snapshot queues are appendable from any
//! thread and drained only by the worker.
//!
//! # Usage
//!
//! ```ignore
//! let renderer = MapRenderer::new(context, delegate, frame_source, config);
//!
//! // from the UI thread, as the host surface comes and goes:
//! renderer.on_surface_created(surface, 1280, 720);
//! renderer.queue_render_event(RenderEvent::render(|| { /* touch GL state */ }));
//! renderer.on_surface_destroyed();
//! renderer.destroy();
//! ```

mod executor;
mod handle;
mod lifecycle;
mod metrics;
mod queue;
mod scheduler;
mod thread;

// Re-export public API
pub use handle::MapRenderer;
pub use queue::{EventKind, RenderEvent, Runnable, SnapshotTask};
pub use scheduler::FrameRateObserver;
