//! Abstract gesture surface.
//!
//! The engine never sees DOM or window events; whatever input binding the
//! embedding uses translates into these calls. Screen deltas are pixels,
//! wheel deltas follow the convention that negative means zoom in.

pub trait GestureHandler {
    fn on_drag_start(&mut self);
    fn on_drag_move(&mut self, dx_px: f64, dy_px: f64);
    fn on_drag_end(&mut self);

    /// One wheel notch; `delta_y < 0` zooms in.
    fn on_wheel(&mut self, delta_y: f64);

    /// Two-finger gesture anchored at the distance recorded on start.
    fn on_pinch_start(&mut self, distance_px: f64);
    fn on_pinch_move(&mut self, distance_px: f64);
}
