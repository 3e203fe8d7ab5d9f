//! Graphics context and native surface contracts.
//!
//! The render thread drives these traits exclusively from its own thread;
//! implementations may keep thread-affine driver state. The surface binding
//! (the context-specific object tied to a platform surface) lives inside the
//! [`GraphicsContext`] implementation and moves through three states: absent,
//! present-valid, and present-invalid after a loss. All transitions are
//! initiated by the render thread.

use crate::error::ContextError;

/// Last known surface size, mutated only on the render thread and read back
/// when the context needs reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Outcome of presenting a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapResult {
    Success,
    /// The whole context was invalidated by the platform. Recovery releases
    /// context and binding and lazily reacquires on the next preparation pass.
    ContextLost,
    /// Any other presentation failure; only the surface binding is released
    /// and preparation retries.
    Other(i32),
}

/// A platform drawing surface, exclusively owned by the lifecycle controller
/// while active and released on replacement or destroy.
pub trait NativeSurface: Send + 'static {
    /// Stable identity used to detect surface replacement. Two handles for
    /// the same platform surface must report the same id.
    fn surface_id(&self) -> u64;

    /// Whether the platform surface can currently back a context binding.
    fn is_valid(&self) -> bool;

    fn release(&mut self);
}

/// Low-level rendering context primitives.
///
/// `prepare` failures are classified via
/// [`ContextError::is_permanent`](crate::error::ContextError::is_permanent):
/// permanent ones end attempts for the current surface generation, transient
/// ones are retried. Binding and make-current failures are always transient.
pub trait GraphicsContext: Send + 'static {
    type Surface: NativeSurface;

    /// Acquire the shared rendering context. Idempotent.
    fn prepare(&mut self) -> Result<(), ContextError>;

    /// Create the context-specific binding for `surface` at `dims`.
    fn create_surface_binding(
        &mut self,
        surface: &Self::Surface,
        dims: Dimensions,
    ) -> Result<(), ContextError>;

    fn has_surface_binding(&self) -> bool;

    /// Bind the context to the calling thread. Returns false on transient
    /// failure.
    fn make_current(&mut self) -> bool;

    fn make_nothing_current(&mut self);

    /// Apply a size change to the existing binding.
    fn reconfigure(&mut self, dims: Dimensions);

    /// Present the current frame.
    fn swap_buffers(&mut self) -> SwapResult;

    fn release_surface_binding(&mut self);

    /// Release the binding and the shared context.
    fn release(&mut self);
}
