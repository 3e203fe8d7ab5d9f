//! Concrete graphics backends.

mod wgpu_context;

pub use wgpu_context::{WgpuContext, WindowSurface};
