//! Error taxonomy for the graphics context boundary.

use thiserror::Error;

/// Failures reported by a [`GraphicsContext`](crate::context::GraphicsContext).
///
/// `Unsupported` is permanent for the current surface generation: the
/// lifecycle controller stops preparation attempts until a new surface
/// arrives. `SurfaceUnready` is transient and retried on a fixed delay.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("graphics backend unsupported: {0}")]
    Unsupported(String),
    #[error("surface not ready: {0}")]
    SurfaceUnready(String),
}

impl ContextError {
    /// Whether this failure ends preparation attempts for the current
    /// surface generation.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ContextError::Unsupported(_))
    }
}
