//! Drawing collaborator contract.

/// The external drawing engine (the native map renderer producing pixels).
///
/// All methods are invoked on the render thread. `on_surface_created` and
/// `on_surface_destroyed` are each called at most once per surface generation
/// and always alternate; `on_surface_changed` and `on_draw_frame` are called
/// zero or more times in between.
pub trait RenderDelegate: Send + 'static {
    fn on_surface_created(&mut self);

    fn on_surface_changed(&mut self, width: u32, height: u32);

    fn on_draw_frame(&mut self);

    fn on_surface_destroyed(&mut self);
}
