//! Flow arcs: the visible portion of each great circle, projected and
//! smoothed.

use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use foundation::math::sphere::{GreatCircle, is_front_facing};
use scene::flow::FlowRecord;

use crate::cache::{ArcKey, ArcPath, CachedArc, PathCache};
use crate::layer::{Layer, LayerId};

/// Fixed sampling resolution along the great circle.
pub const ARC_SAMPLES: usize = 100;

/// Bundle tightness: 0 collapses onto the chord, 1 keeps the raw circle.
pub const BUNDLE_BETA: f64 = 0.3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FlowArcLayer {
    id: LayerId,
}

impl FlowArcLayer {
    pub fn new(id: u64) -> Self {
        Self { id: LayerId(id) }
    }

    /// Build the visible arc for one flow under the current projection.
    ///
    /// Returns `None` (silently, never an error) when:
    /// - either endpoint is out of coordinate range,
    /// - neither endpoint is front-facing (cheap prefilter; the cache is
    ///   not even consulted),
    /// - no interpolation sample survives hemisphere culling (the miss is
    ///   cached as `NoVisibleSegment`).
    pub fn build_arc(
        &self,
        flow: &FlowRecord,
        projection: &Orthographic,
        cache: &mut PathCache,
    ) -> Option<ArcPath> {
        let origin = flow.origin.position;
        let destination = flow.destination.position;
        if !origin.is_valid() || !destination.is_valid() {
            return None;
        }

        let rotate = projection.rotate_deg();
        if !is_front_facing(origin, rotate) && !is_front_facing(destination, rotate) {
            return None;
        }

        let key = ArcKey::new(flow.origin.coord_key(), flow.destination.coord_key(), projection);
        if let Some(cached) = cache.get(&key) {
            return match cached {
                CachedArc::Path(path) => Some(path.clone()),
                CachedArc::NoVisibleSegment => None,
            };
        }

        let circle = GreatCircle::between(origin, destination)?;
        let mut screen: Vec<Vec2> = Vec::new();
        for i in 0..ARC_SAMPLES {
            let t = i as f64 / (ARC_SAMPLES - 1) as f64;
            let sample = circle.at(t);
            if !is_front_facing(sample, rotate) {
                continue;
            }
            if let Some(p) = projection.project(sample) {
                screen.push(p);
            }
        }

        if screen.is_empty() {
            cache.put(key, CachedArc::NoVisibleSegment);
            return None;
        }

        let path = ArcPath {
            points: bundle(&screen, BUNDLE_BETA),
        };
        cache.put(key, CachedArc::Path(path.clone()));
        Some(path)
    }
}

impl Layer for FlowArcLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

/// Pull interior points toward the first–last chord by `1 - beta`.
///
/// This is the curvature model of the bundled-curve renderer the arcs are
/// drawn with: endpoints stay fixed, the belly flattens.
fn bundle(points: &[Vec2], beta: f64) -> Vec<Vec2> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[n - 1];
    let chord = last - first;

    points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let t = i as f64 / (n - 1) as f64;
            let on_chord = first + chord.scale(t);
            on_chord.scale(1.0 - beta) + p.scale(beta)
        })
        .collect()
}
