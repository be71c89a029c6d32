//! Programmatic camera transitions.
//!
//! A `Sequencer` holds at most one in-flight tween; starting another while
//! one is active is an error, which is how the interaction layer keeps
//! programmatic motion and gestures mutually exclusive.

use foundation::time::Time;

use crate::easing::cubic_in_out;

/// A camera pose: rotation triple in degrees plus projection scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub rotate_deg: [f64; 3],
    pub scale: f64,
}

impl CameraPose {
    pub fn new(rotate_deg: [f64; 3], scale: f64) -> Self {
        Self { rotate_deg, scale }
    }
}

/// A timed interpolation between two camera poses.
///
/// Rotation components interpolate independently, matching how the globe
/// rotation triple is authored (λ drag, φ drag, fixed γ).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTween {
    pub from: CameraPose,
    pub to: CameraPose,
    pub start: Time,
    pub duration_s: f64,
}

impl CameraTween {
    /// Pose at `now`, and whether the tween has run to completion.
    ///
    /// Sampling past the end clamps to the target pose.
    pub fn sample(&self, now: Time) -> (CameraPose, bool) {
        let elapsed = (now.0 - self.start.0).max(0.0);
        let raw = if self.duration_s > 0.0 {
            elapsed / self.duration_s
        } else {
            1.0
        };
        let done = raw >= 1.0;
        let t = cubic_in_out(raw);

        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let pose = CameraPose {
            rotate_deg: [
                lerp(self.from.rotate_deg[0], self.to.rotate_deg[0]),
                lerp(self.from.rotate_deg[1], self.to.rotate_deg[1]),
                lerp(self.from.rotate_deg[2], self.to.rotate_deg[2]),
            ],
            scale: lerp(self.from.scale, self.to.scale),
        };
        (pose, done)
    }
}

/// Returned when a tween is requested while another is still in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TweenInFlight;

impl std::fmt::Display for TweenInFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a camera tween is already in flight")
    }
}

impl std::error::Error for TweenInFlight {}

/// Single-slot camera tween scheduler.
#[derive(Debug, Default)]
pub struct Sequencer {
    active: Option<CameraTween>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        start: Time,
        duration_s: f64,
    ) -> Result<(), TweenInFlight> {
        if self.active.is_some() {
            return Err(TweenInFlight);
        }
        self.active = Some(CameraTween {
            from,
            to,
            start,
            duration_s,
        });
        Ok(())
    }

    /// Sample the active tween; the slot frees itself on completion.
    pub fn sample(&mut self, now: Time) -> Option<CameraPose> {
        let tween = self.active?;
        let (pose, done) = tween.sample(now);
        if done {
            self.active = None;
        }
        Some(pose)
    }

    /// Drop the active tween without sampling, e.g. on surface teardown.
    pub fn interrupt(&mut self) {
        self.active = None;
    }
}
