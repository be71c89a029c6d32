//! Gesture-to-projection translation.
//!
//! Three mutually exclusive modes: idle, dragging, and programmatic
//! animation. Wheel and pinch zoom are ignored while dragging or while a
//! tween is in flight; drag is ignored during a tween; a tween cannot start
//! while another runs. Every accepted gesture mutates the shared projection
//! directly: no inertia, no deferred application.

use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use foundation::time::Time;
use layers::cache::PathCache;
use runtime::animation::{CameraPose, Sequencer};
use tracing::debug;

/// Drag sensitivity numerator: degrees of rotation per pixel equal
/// `k / scale`, so control gets finer as the globe gets larger.
pub const DRAG_SENSITIVITY: f64 = 75.0;

/// Latitudinal rotation clamp, keeping the globe from flipping over a pole.
pub const MAX_PITCH_DEG: f64 = 90.0;

/// Scale change per wheel step beyond which the path cache is cleared.
pub const CACHE_CLEAR_SCALE_DELTA: f64 = 20.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Dragging,
    Animating,
}

/// Outcome of one animation tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tween in flight; nothing changed.
    Idle,
    /// The tween advanced; dependent layers must recompute.
    Advanced,
    /// The tween finished this tick; the controller is idle again.
    Completed,
}

#[derive(Debug)]
pub struct InteractionController {
    mode: GestureMode,
    min_scale: f64,
    max_scale: f64,
    zoom_speed: f64,
    wheel_enabled: bool,
    sequencer: Sequencer,
    pinch_anchor: Option<PinchAnchor>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PinchAnchor {
    distance_px: f64,
    scale: f64,
}

impl InteractionController {
    pub fn new(min_scale: f64, max_scale: f64, zoom_speed: f64, wheel_enabled: bool) -> Self {
        Self {
            mode: GestureMode::Idle,
            min_scale,
            max_scale,
            zoom_speed,
            wheel_enabled,
            sequencer: Sequencer::new(),
            pinch_anchor: None,
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Begin a drag. Refused while a tween is in flight.
    pub fn drag_start(&mut self) -> bool {
        if self.mode != GestureMode::Idle {
            return false;
        }
        self.mode = GestureMode::Dragging;
        true
    }

    /// Apply one drag delta.
    ///
    /// Longitude follows the pointer; latitude is clamped to ±90°; roll
    /// never changes. Sensitivity is inversely proportional to scale.
    pub fn drag_move(&mut self, dx_px: f64, dy_px: f64, projection: &mut Orthographic) -> bool {
        if self.mode != GestureMode::Dragging {
            return false;
        }
        let k = DRAG_SENSITIVITY / projection.scale();
        let rotate = projection.rotate_deg();
        projection.set_rotate_deg([
            rotate[0] + dx_px * k,
            (rotate[1] - dy_px * k).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG),
            rotate[2],
        ]);
        true
    }

    /// End a drag, re-enabling zoom.
    pub fn drag_end(&mut self) -> bool {
        if self.mode != GestureMode::Dragging {
            return false;
        }
        self.mode = GestureMode::Idle;
        true
    }

    /// One wheel step: the scale multiplies by `speed^sign(-delta_y)`,
    /// clamped to the configured limits.
    ///
    /// A step that moves the scale further than the clear threshold flushes
    /// the path cache, bounding memory growth under rapid zoom sequences.
    pub fn wheel(
        &mut self,
        delta_y: f64,
        projection: &mut Orthographic,
        cache: &mut PathCache,
    ) -> bool {
        if !self.wheel_enabled || self.mode != GestureMode::Idle || delta_y == 0.0 {
            return false;
        }
        let factor = if delta_y < 0.0 {
            self.zoom_speed
        } else {
            1.0 / self.zoom_speed
        };
        self.apply_zoom_factor(factor, projection, cache)
    }

    /// A zoom button press behaves exactly like one wheel notch.
    pub fn zoom_step(
        &mut self,
        zoom_in: bool,
        projection: &mut Orthographic,
        cache: &mut PathCache,
    ) -> bool {
        if self.mode != GestureMode::Idle {
            return false;
        }
        let factor = if zoom_in {
            self.zoom_speed
        } else {
            1.0 / self.zoom_speed
        };
        self.apply_zoom_factor(factor, projection, cache)
    }

    /// Anchor a pinch at the current touch distance and scale.
    pub fn pinch_start(&mut self, distance_px: f64, projection: &Orthographic) {
        if self.mode != GestureMode::Idle || distance_px <= 0.0 {
            return;
        }
        self.pinch_anchor = Some(PinchAnchor {
            distance_px,
            scale: projection.scale(),
        });
    }

    /// Map the current touch distance onto the anchored scale.
    pub fn pinch_move(&mut self, distance_px: f64, projection: &mut Orthographic) -> bool {
        if self.mode != GestureMode::Idle || distance_px <= 0.0 {
            return false;
        }
        let Some(anchor) = self.pinch_anchor else {
            return false;
        };
        let target = anchor.scale * (distance_px / anchor.distance_px);
        let clamped = target.clamp(self.min_scale, self.max_scale);
        if clamped == projection.scale() {
            return false;
        }
        projection.set_scale(clamped);
        true
    }

    pub fn pinch_end(&mut self) {
        self.pinch_anchor = None;
    }

    /// Start a programmatic transition to `to` over `duration_s`.
    ///
    /// Refused while another tween is in flight; a drag in progress is
    /// abandoned in favor of the transition.
    pub fn start_transition(
        &mut self,
        projection: &Orthographic,
        to: CameraPose,
        now: Time,
        duration_s: f64,
    ) -> bool {
        if self.mode == GestureMode::Animating {
            return false;
        }
        let from = CameraPose::new(projection.rotate_deg(), projection.scale());
        if self.sequencer.start(from, to, now, duration_s).is_err() {
            return false;
        }
        self.mode = GestureMode::Animating;
        self.pinch_anchor = None;
        debug!(?to, duration_s, "camera transition started");
        true
    }

    /// Advance the in-flight tween, writing the sampled pose through.
    pub fn tick(&mut self, now: Time, projection: &mut Orthographic) -> TickOutcome {
        if self.mode != GestureMode::Animating {
            return TickOutcome::Idle;
        }
        let Some(pose) = self.sequencer.sample(now) else {
            self.mode = GestureMode::Idle;
            return TickOutcome::Idle;
        };
        projection.set_rotate_deg(pose.rotate_deg);
        projection.set_scale(pose.scale.clamp(self.min_scale, self.max_scale));
        if self.sequencer.is_active() {
            TickOutcome::Advanced
        } else {
            self.mode = GestureMode::Idle;
            TickOutcome::Completed
        }
    }

    /// Abandon whatever is in flight, e.g. on surface teardown.
    pub fn interrupt(&mut self) {
        self.sequencer.interrupt();
        self.pinch_anchor = None;
        self.mode = GestureMode::Idle;
    }

    fn apply_zoom_factor(
        &mut self,
        factor: f64,
        projection: &mut Orthographic,
        cache: &mut PathCache,
    ) -> bool {
        let current = projection.scale();
        let next = (current * factor).clamp(self.min_scale, self.max_scale);
        if next == current {
            return false;
        }
        projection.set_scale(next);
        if (next - current).abs() > CACHE_CLEAR_SCALE_DELTA {
            cache.clear();
            debug!(from = current, to = next, "zoom step cleared the path cache");
        }
        true
    }
}

/// Convenience screen-center translation for a surface.
pub fn surface_center(width: f64, height: f64) -> Vec2 {
    Vec2::new(width / 2.0, height / 2.0)
}

#[cfg(test)]
mod tests {
    use super::{GestureMode, InteractionController, TickOutcome};
    use foundation::math::Vec2;
    use foundation::math::ortho::Orthographic;
    use foundation::time::Time;
    use layers::cache::PathCache;
    use runtime::animation::CameraPose;

    fn projection(scale: f64) -> Orthographic {
        Orthographic::new([0.0, -25.0, 0.0], scale, Vec2::new(400.0, 300.0))
    }

    fn controller() -> InteractionController {
        InteractionController::new(50.0, 200.0, 1.2, true)
    }

    #[test]
    fn drag_rotates_inversely_to_scale() {
        let mut c = controller();
        let mut p = projection(75.0);
        assert!(c.drag_start());
        assert!(c.drag_move(10.0, 0.0, &mut p));
        // k = 75 / 75 = 1 degree per pixel.
        assert_eq!(p.rotate_deg()[0], 10.0);

        let mut p2 = projection(150.0);
        c.drag_move(10.0, 0.0, &mut p2);
        assert_eq!(p2.rotate_deg()[0], 5.0);
    }

    #[test]
    fn latitude_clamps_at_ninety_degrees() {
        let mut c = controller();
        let mut p = projection(75.0);
        c.drag_start();
        c.drag_move(0.0, -500.0, &mut p);
        assert_eq!(p.rotate_deg()[1], 90.0);
        c.drag_move(0.0, 1000.0, &mut p);
        assert_eq!(p.rotate_deg()[1], -90.0);
    }

    #[test]
    fn wheel_is_ignored_while_dragging() {
        let mut c = controller();
        let mut p = projection(100.0);
        let mut cache = PathCache::new();
        c.drag_start();
        assert!(!c.wheel(-1.0, &mut p, &mut cache));
        assert_eq!(p.scale(), 100.0);

        c.drag_end();
        assert!(c.wheel(-1.0, &mut p, &mut cache));
        assert!((p.scale() - 120.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_zoom_clamps_at_max_scale() {
        let mut c = controller();
        let mut p = projection(100.0);
        let mut cache = PathCache::new();
        for _ in 0..6 {
            c.wheel(-1.0, &mut p, &mut cache);
        }
        // 100 × 1.2^6 would be ≈ 298.6; the limit wins.
        assert_eq!(p.scale(), 200.0);
    }

    #[test]
    fn large_zoom_step_clears_the_cache() {
        let mut c = controller();
        let mut p = projection(150.0);
        let mut cache = PathCache::new();
        let key = layers::cache::ArcKey::new(
            scene::flow::GeoPoint::new(
                foundation::math::sphere::LonLat::new(0.0, 0.0),
                "o",
                foundation::ids::ElementId(0),
            )
            .coord_key(),
            scene::flow::GeoPoint::new(
                foundation::math::sphere::LonLat::new(1.0, 1.0),
                "d",
                foundation::ids::ElementId(1),
            )
            .coord_key(),
            &p,
        );
        cache.put(key, layers::cache::CachedArc::NoVisibleSegment);

        // 150 → 180: a 30-unit jump exceeds the 20-unit threshold.
        assert!(c.wheel(-1.0, &mut p, &mut cache));
        assert!(cache.is_empty());
    }

    #[test]
    fn small_zoom_step_keeps_the_cache() {
        let mut c = InteractionController::new(50.0, 200.0, 1.1, true);
        let mut p = projection(100.0);
        let mut cache = PathCache::new();
        let key = layers::cache::ArcKey::new(
            scene::flow::GeoPoint::new(
                foundation::math::sphere::LonLat::new(0.0, 0.0),
                "o",
                foundation::ids::ElementId(0),
            )
            .coord_key(),
            scene::flow::GeoPoint::new(
                foundation::math::sphere::LonLat::new(1.0, 1.0),
                "d",
                foundation::ids::ElementId(1),
            )
            .coord_key(),
            &p,
        );
        cache.put(key, layers::cache::CachedArc::NoVisibleSegment);

        // 100 → 110: inside the threshold.
        assert!(c.wheel(-1.0, &mut p, &mut cache));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn pinch_maps_distance_ratio_onto_scale() {
        let mut c = controller();
        let mut p = projection(100.0);
        c.pinch_start(50.0, &p);
        assert!(c.pinch_move(100.0, &mut p));
        assert_eq!(p.scale(), 200.0);
        // Further spread clamps at the limit.
        assert!(!c.pinch_move(400.0, &mut p));
        assert_eq!(p.scale(), 200.0);
        c.pinch_end();
        assert!(!c.pinch_move(100.0, &mut p));
    }

    #[test]
    fn animation_excludes_drag_and_wheel_until_done() {
        let mut c = controller();
        let mut p = projection(100.0);
        let mut cache = PathCache::new();
        assert!(c.start_transition(&p, CameraPose::new([0.0, -25.0, 0.0], 150.0), Time(0.0), 1.0));
        assert_eq!(c.mode(), GestureMode::Animating);

        assert!(!c.drag_start());
        assert!(!c.wheel(-1.0, &mut p, &mut cache));
        assert!(!c.start_transition(&p, CameraPose::new([10.0, 0.0, 0.0], 100.0), Time(0.1), 1.0));

        assert_eq!(c.tick(Time(0.5), &mut p), TickOutcome::Advanced);
        assert_eq!(c.tick(Time(1.5), &mut p), TickOutcome::Completed);
        assert_eq!(c.mode(), GestureMode::Idle);
        assert_eq!(p.scale(), 150.0);
        assert!(c.drag_start());
    }

    #[test]
    fn transition_pose_is_written_through_each_tick() {
        let mut c = controller();
        let mut p = projection(100.0);
        c.start_transition(&p, CameraPose::new([40.0, -25.0, 0.0], 100.0), Time(0.0), 2.0);
        c.tick(Time(1.0), &mut p);
        assert_eq!(p.rotate_deg()[0], 20.0);
    }
}
