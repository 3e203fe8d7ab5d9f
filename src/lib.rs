//! maprender - Render-thread synchronization engine for live map surfaces
//!
//! The host UI layer creates, resizes, and destroys the display surface
//! asynchronously relative to rendering. This crate owns the hard part in
//! between: a dedicated render thread that holds the graphics context,
//! coordinates surface lifecycle transitions with the UI thread without
//! deadlocking, paces frame production against the display's frame signal,
//! and offers thread-safe queues for render commands and snapshot capture.
//!
//! The actual drawing engine, the platform surface, and the graphics driver
//! are collaborators behind the [`RenderDelegate`], [`NativeSurface`], and
//! [`GraphicsContext`] traits. A production wgpu/winit implementation lives
//! in [`backend`].

pub mod backend;
pub mod clock;
pub mod config;
pub mod context;
pub mod delegate;
pub mod error;
pub mod render_thread;

pub use clock::{FrameCallback, FrameSource, IntervalFrameSource};
pub use config::{RendererConfig, TeardownPolicy};
pub use context::{Dimensions, GraphicsContext, NativeSurface, SwapResult};
pub use delegate::RenderDelegate;
pub use error::ContextError;
pub use render_thread::{EventKind, FrameRateObserver, MapRenderer, RenderEvent};
