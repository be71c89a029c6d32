//! Spherical geometry for the globe: coordinate validation, hemisphere
//! visibility, and great-circle interpolation.
//!
//! All public angles are degrees; radians stay internal.

use super::Vec3;

/// A longitude/latitude pair in degrees.
///
/// Valid range is longitude ∈ [-180, 180], latitude ∈ [-90, 90]. Values are
/// not normalized on construction; call `is_valid` before trusting them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && self.lon.abs() <= 180.0
            && self.lat.abs() <= 90.0
    }

    /// The geographic antipode.
    pub fn antipode(self) -> Self {
        let lon = if self.lon > 0.0 {
            self.lon - 180.0
        } else {
            self.lon + 180.0
        };
        Self::new(lon, -self.lat)
    }

    /// Unit direction on the sphere.
    pub fn to_unit(self) -> Vec3 {
        let lon = self.lon.to_radians();
        let lat = self.lat.to_radians();
        Vec3::new(
            lat.cos() * lon.cos(),
            lat.cos() * lon.sin(),
            lat.sin(),
        )
    }

    /// Back from a unit direction; the result is always in valid range.
    pub fn from_unit(v: Vec3) -> Self {
        let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = v.y.atan2(v.x).to_degrees();
        Self::new(lon, lat)
    }
}

/// Cosine of the angular distance between `point` and the center of view
/// implied by a (λ, φ) rotation in degrees.
///
/// The view center for rotation `[λ, φ, γ]` is (-λ, -φ); the roll axis γ
/// spins about the view axis and cannot change distance from center.
pub fn cos_center_distance(point: LonLat, rotate_deg: [f64; 3]) -> f64 {
    let center_lon = (-rotate_deg[0]).to_radians();
    let center_lat = (-rotate_deg[1]).to_radians();
    let lon = point.lon.to_radians();
    let lat = point.lat.to_radians();

    center_lat.sin() * lat.sin() + center_lat.cos() * lat.cos() * (center_lon - lon).cos()
}

/// Hemisphere visibility test.
///
/// True iff the point lies strictly on the viewer-facing half of the globe.
/// This is the single visibility predicate for the whole engine; callers
/// must not re-derive it from projected coordinates.
pub fn is_front_facing(point: LonLat, rotate_deg: [f64; 3]) -> bool {
    cos_center_distance(point, rotate_deg) > 0.0
}

/// Great-circle interpolator between two coordinates.
///
/// Notes:
/// - Construction fails when either endpoint is out of valid range.
/// - `at(0)` and `at(1)` reproduce the endpoints up to rounding.
/// - Coincident (and numerically antipodal) endpoints degenerate to a
///   constant interpolator at the start point, deterministically.
#[derive(Debug, Copy, Clone)]
pub struct GreatCircle {
    a: Vec3,
    b: Vec3,
    start: LonLat,
    /// Central angle between the endpoints (radians).
    angle: f64,
}

const DEGENERATE_SIN: f64 = 1e-9;

impl GreatCircle {
    pub fn between(a: LonLat, b: LonLat) -> Option<Self> {
        if !a.is_valid() || !b.is_valid() {
            return None;
        }
        let ua = a.to_unit();
        let ub = b.to_unit();
        let angle = ua.cross(ub).length().atan2(ua.dot(ub));
        Some(Self {
            a: ua,
            b: ub,
            start: a,
            angle,
        })
    }

    /// Central angle between the endpoints, in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Point at parameter `t` ∈ [0, 1] along the arc.
    pub fn at(&self, t: f64) -> LonLat {
        let sin_angle = self.angle.sin();
        if sin_angle.abs() < DEGENERATE_SIN {
            return self.start;
        }
        let wa = ((1.0 - t) * self.angle).sin() / sin_angle;
        let wb = (t * self.angle).sin() / sin_angle;
        let v = (self.a.scale(wa) + self.b.scale(wb)).normalize();
        LonLat::from_unit(v)
    }
}
