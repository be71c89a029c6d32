//! Orthographic globe projection.
//!
//! `Orthographic` is a pure coordinate transform: three-axis rotation in
//! degrees, a scale in pixels per globe radius, and a screen translation.
//! It enforces no limits of its own; scale clamping and rotation clamping
//! belong to the interaction layer that mutates it.

use super::sphere::LonLat;
use super::vec::Vec2;

/// Orthographic projection state.
///
/// Rotation follows the usual geographic convention: `[λ, φ, γ]` brings the
/// coordinate (-λ, -φ) to the center of view, with γ rolling about the view
/// axis. Screen y grows downward.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    rotate_deg: [f64; 3],
    scale: f64,
    translate: Vec2,
}

impl Orthographic {
    pub fn new(rotate_deg: [f64; 3], scale: f64, translate: Vec2) -> Self {
        Self {
            rotate_deg,
            scale,
            translate,
        }
    }

    pub fn rotate_deg(&self) -> [f64; 3] {
        self.rotate_deg
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    pub fn set_rotate_deg(&mut self, rotate_deg: [f64; 3]) {
        self.rotate_deg = rotate_deg;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Rotated view-space direction of a coordinate.
    ///
    /// Returns `(toward_viewer, right, up)`: the first component is the
    /// cosine of the angular distance from the view center, the second and
    /// third are the in-screen-plane offsets before scaling.
    fn view_direction(&self, p: LonLat) -> (f64, f64, f64) {
        let d_lambda = self.rotate_deg[0].to_radians();
        let d_phi = self.rotate_deg[1].to_radians();
        let d_gamma = self.rotate_deg[2].to_radians();

        let lon = p.lon.to_radians() + d_lambda;
        let lat = p.lat.to_radians();

        let x = lon.cos() * lat.cos();
        let y = lon.sin() * lat.cos();
        let z = lat.sin();

        // φ rotation in the x/z plane, then γ roll in the y/z plane.
        let k = z * d_phi.cos() + x * d_phi.sin();
        let vx = x * d_phi.cos() - z * d_phi.sin();
        let vy = y * d_gamma.cos() - k * d_gamma.sin();
        let vz = k * d_gamma.cos() + y * d_gamma.sin();

        (vx, vy, vz)
    }

    /// Forward projection to screen coordinates.
    ///
    /// Back-hemisphere points still project (mirrored onto the disc);
    /// visibility is decided by `sphere::is_front_facing`, not here. `None`
    /// means the input or result was not numerically meaningful.
    pub fn project(&self, p: LonLat) -> Option<Vec2> {
        if !p.lon.is_finite() || !p.lat.is_finite() {
            return None;
        }
        let (_, vy, vz) = self.view_direction(p);
        let screen = Vec2::new(
            self.translate.x + self.scale * vy,
            self.translate.y - self.scale * vz,
        );
        screen.is_finite().then_some(screen)
    }

    /// Inverse projection from screen coordinates.
    ///
    /// `None` outside the globe disc or on non-finite input. Within the
    /// disc, the front-hemisphere solution is returned, so
    /// `invert(project(p)) ≈ p` for every front-facing `p`.
    pub fn invert(&self, screen: Vec2) -> Option<LonLat> {
        if !screen.is_finite() || self.scale <= 0.0 {
            return None;
        }
        let vy = (screen.x - self.translate.x) / self.scale;
        let vz = (self.translate.y - screen.y) / self.scale;
        let rho2 = vy * vy + vz * vz;
        if rho2 > 1.0 {
            return None;
        }
        let vx = (1.0 - rho2).sqrt();

        let d_lambda = self.rotate_deg[0].to_radians();
        let d_phi = self.rotate_deg[1].to_radians();
        let d_gamma = self.rotate_deg[2].to_radians();

        // Undo the γ roll, then the φ rotation, then the λ offset.
        let y1 = vy * d_gamma.cos() + vz * d_gamma.sin();
        let k = vz * d_gamma.cos() - vy * d_gamma.sin();

        let x = vx * d_phi.cos() + k * d_phi.sin();
        let z = k * d_phi.cos() - vx * d_phi.sin();

        let lon = (y1.atan2(x) - d_lambda).to_degrees();
        let lat = z.clamp(-1.0, 1.0).asin().to_degrees();

        let out = LonLat::new(normalize_lon(lon), lat);
        (out.lon.is_finite() && out.lat.is_finite()).then_some(out)
    }
}

fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon % 360.0;
    if l > 180.0 {
        l -= 360.0;
    } else if l < -180.0 {
        l += 360.0;
    }
    l
}

#[cfg(test)]
mod tests {
    use super::{Orthographic, normalize_lon};
    use crate::math::sphere::{LonLat, is_front_facing};
    use crate::math::vec::Vec2;
    use approx::assert_relative_eq;

    fn proj(rotate: [f64; 3], scale: f64) -> Orthographic {
        Orthographic::new(rotate, scale, Vec2::new(400.0, 300.0))
    }

    #[test]
    fn center_of_view_projects_to_translation() {
        let p = proj([30.0, -20.0, 0.0], 150.0);
        let screen = p.project(LonLat::new(-30.0, 20.0)).unwrap();
        assert_relative_eq!(screen.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(screen.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn east_offset_moves_right_north_moves_up() {
        let p = proj([0.0, 0.0, 0.0], 100.0);
        let east = p.project(LonLat::new(10.0, 0.0)).unwrap();
        let north = p.project(LonLat::new(0.0, 10.0)).unwrap();
        assert!(east.x > 400.0);
        assert_relative_eq!(east.y, 300.0, epsilon = 1e-9);
        assert!(north.y < 300.0);
        assert_relative_eq!(north.x, 400.0, epsilon = 1e-9);
    }

    #[test]
    fn invert_rejects_points_outside_disc() {
        let p = proj([0.0, 0.0, 0.0], 100.0);
        assert!(p.invert(Vec2::new(400.0 + 101.0, 300.0)).is_none());
        assert!(p.invert(Vec2::new(400.0 + 99.0, 300.0)).is_some());
    }

    #[test]
    fn non_finite_input_projects_to_none() {
        let p = proj([0.0, 0.0, 0.0], 100.0);
        assert!(p.project(LonLat::new(f64::NAN, 10.0)).is_none());
        assert!(p.invert(Vec2::new(f64::INFINITY, 0.0)).is_none());
    }

    #[test]
    fn round_trip_across_scales_and_rotations() {
        let rotations = [
            [0.0, -25.0, 0.0],
            [90.0, -25.0, 0.0],
            [-140.0, 60.0, 15.0],
        ];
        let points = [
            LonLat::new(0.0, 0.0),
            LonLat::new(12.0, 48.0),
            LonLat::new(-73.0, -41.0),
            LonLat::new(151.0, -33.0),
        ];
        for rotate in rotations {
            for scale in [60.0, 100.0, 150.0, 300.0] {
                let p = proj(rotate, scale);
                for point in points {
                    if !is_front_facing(point, rotate) {
                        continue;
                    }
                    let screen = p.project(point).unwrap();
                    let back = p.invert(screen).unwrap();
                    assert_relative_eq!(back.lon, point.lon, epsilon = 1e-6);
                    assert_relative_eq!(back.lat, point.lat, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn normalize_lon_wraps() {
        assert_relative_eq!(normalize_lon(190.0), -170.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_lon(-190.0), 170.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_lon(0.0), 0.0, epsilon = 1e-12);
    }
}
