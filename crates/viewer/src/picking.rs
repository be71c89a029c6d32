//! Deterministic screen-space hit testing.
//!
//! Click routing checks, in order: point symbols, then arcs, then country
//! surfaces, then background. The order encodes the z-order the frame is
//! drawn in, smallest targets first.
//!
//! Ordering contract:
//! - Among points (and among arcs), the closest hit wins; exact distance
//!   ties go to the lower index.
//! - Hidden points never hit.

use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use foundation::math::precision::stable_total_cmp_f64;
use scene::countries::CountryCollection;

use crate::frame::RenderFrame;

#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    /// Index into the frame's point list.
    Point(usize),
    /// Index into the frame's arc list.
    Arc(usize),
    Country(String),
    Background,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickSettings {
    /// Extra pixels around a point's radius that still count as a hit.
    pub point_slop_px: f64,
    /// Extra pixels around an arc's half-width that still count as a hit.
    pub arc_slop_px: f64,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self {
            point_slop_px: 2.0,
            arc_slop_px: 3.0,
        }
    }
}

pub fn pick(
    frame: &RenderFrame,
    projection: &Orthographic,
    countries: &CountryCollection,
    at: Vec2,
    settings: PickSettings,
) -> Hit {
    let mut best_point: Option<(f64, usize)> = None;
    for (i, point) in frame.points.iter().enumerate() {
        if !point.visible {
            continue;
        }
        let d = (point.screen - at).length();
        if d > point.radius + settings.point_slop_px {
            continue;
        }
        if best_point.is_none_or(|(bd, _)| stable_total_cmp_f64(d, bd).is_lt()) {
            best_point = Some((d, i));
        }
    }
    if let Some((_, i)) = best_point {
        return Hit::Point(i);
    }

    let mut best_arc: Option<(f64, usize)> = None;
    for (i, arc) in frame.arcs.iter().enumerate() {
        let reach = arc.width / 2.0 + settings.arc_slop_px;
        let Some(d) = polyline_distance(&arc.path.points, at) else {
            continue;
        };
        if d > reach {
            continue;
        }
        if best_arc.is_none_or(|(bd, _)| stable_total_cmp_f64(d, bd).is_lt()) {
            best_arc = Some((d, i));
        }
    }
    if let Some((_, i)) = best_arc {
        return Hit::Arc(i);
    }

    if let Some(lon_lat) = projection.invert(at)
        && let Some(country) = countries.containing(lon_lat)
    {
        return Hit::Country(country.name.clone());
    }

    Hit::Background
}

/// Distance from `at` to the nearest segment of the polyline.
fn polyline_distance(points: &[Vec2], at: Vec2) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    if points.len() == 1 {
        return Some((points[0] - at).length());
    }
    let mut best = f64::INFINITY;
    for pair in points.windows(2) {
        let d = segment_distance(pair[0], pair[1], at);
        if d < best {
            best = d;
        }
    }
    Some(best)
}

fn segment_distance(a: Vec2, b: Vec2, p: Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 <= 0.0 {
        return (p - a).length();
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
    let closest = a + ab.scale(t);
    (p - closest).length()
}
