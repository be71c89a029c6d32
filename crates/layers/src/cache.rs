//! Memoized arc geometry.
//!
//! Great-circle sampling plus per-sample visibility filtering is O(samples)
//! trigonometry per arc; with hundreds of flows it dominates a redraw. An
//! exact-match cache keyed by (endpoints, rotation, scale) turns the
//! repeated no-op redraws of hover and selection changes into lookups.
//!
//! Notes on policy:
//! - Keys embed the full projection state, so a rotation or scale change
//!   simply stops hitting old entries; they are not purged eagerly.
//! - Eviction is a bulk clear past a size threshold rather than LRU:
//!   within one gesture the projection state barely revisits old keys, so
//!   tracking recency would buy nothing.

use std::collections::BTreeMap;

use foundation::math::Vec2;
use foundation::math::key_bits;
use foundation::math::ortho::Orthographic;
use scene::flow::CoordKey;

/// Exact projection state an arc was computed under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArcKey {
    origin: CoordKey,
    destination: CoordKey,
    rotate_bits: [u64; 3],
    scale_bits: u64,
}

impl ArcKey {
    pub fn new(origin: CoordKey, destination: CoordKey, projection: &Orthographic) -> Self {
        let r = projection.rotate_deg();
        Self {
            origin,
            destination,
            rotate_bits: [key_bits(r[0]), key_bits(r[1]), key_bits(r[2])],
            scale_bits: key_bits(projection.scale()),
        }
    }
}

/// Screen-space polyline of one arc's visible portion.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    pub points: Vec<Vec2>,
}

/// A memoized result, including the negative case.
///
/// Caching `NoVisibleSegment` matters: arcs fully on the far side are the
/// common case on a globe, and recomputing their 100-sample walk every
/// frame would defeat the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedArc {
    Path(ArcPath),
    NoVisibleSegment,
}

pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug)]
pub struct PathCache {
    entries: BTreeMap<ArcKey, CachedArc>,
    max_entries: usize,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ArcKey) -> Option<&CachedArc> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: ArcKey, value: CachedArc) {
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Bulk clear once the resident size exceeds the bound.
    ///
    /// Returns whether a clear happened.
    pub fn clear_if_over_bound(&mut self) -> bool {
        if self.entries.len() > self.max_entries {
            self.entries.clear();
            true
        } else {
            false
        }
    }
}
