//! Flow records and the derived point entities.

use std::collections::HashMap;

use foundation::ids::ElementId;
use foundation::math::key_bits;
use foundation::math::sphere::LonLat;

/// A labeled coordinate from one row cell pair.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub position: LonLat,
    pub name: String,
    pub element: ElementId,
}

impl GeoPoint {
    pub fn new(position: LonLat, name: impl Into<String>, element: ElementId) -> Self {
        Self {
            position,
            name: name.into(),
            element,
        }
    }

    /// Coordinate identity at source precision.
    ///
    /// Two records at the same latitude/longitude are the same point, so
    /// the key is the exact bit pattern of both components.
    pub fn coord_key(&self) -> CoordKey {
        CoordKey {
            lat: key_bits(self.position.lat),
            lon: key_bits(self.position.lon),
        }
    }
}

/// Exact-match coordinate key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordKey {
    lat: u64,
    lon: u64,
}

/// One origin→destination flow, immutable for the duration of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// Flow magnitude; the decoder substitutes 1 when the measure is absent.
    pub value: f64,
    /// Optional destination-sizing measure.
    pub destination_value: Option<f64>,
}

/// A deduplicated, renderable point.
///
/// Origin status is sticky: once a coordinate has been seen as an origin it
/// is never demoted, even if later rows use it as a destination.
/// `aggregated_value` is only meaningful for non-origins.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEntity {
    pub point: GeoPoint,
    pub is_origin: bool,
    pub aggregated_value: Option<f64>,
}

/// Deduplicate flow endpoints into point entities.
///
/// Ordering contract:
/// - Entities appear in first-seen order over `flows`, origins before the
///   destination of the same record.
///
/// Aggregation: destination values sum across every flow sharing the
/// destination coordinate; a missing destination value contributes 0.
pub fn build_point_entities(flows: &[FlowRecord]) -> Vec<PointEntity> {
    let mut order: Vec<PointEntity> = Vec::new();
    let mut index: HashMap<CoordKey, usize> = HashMap::new();

    for flow in flows {
        let origin_key = flow.origin.coord_key();
        match index.get(&origin_key).copied() {
            Some(i) => {
                if !order[i].is_origin {
                    // Promotion to origin: sizing no longer applies.
                    order[i].is_origin = true;
                    order[i].aggregated_value = None;
                }
            }
            None => {
                index.insert(origin_key, order.len());
                order.push(PointEntity {
                    point: flow.origin.clone(),
                    is_origin: true,
                    aggregated_value: None,
                });
            }
        }

        let dest_key = flow.destination.coord_key();
        let contribution = flow.destination_value.unwrap_or(0.0);
        match index.get(&dest_key).copied() {
            Some(i) => {
                if !order[i].is_origin {
                    let total = order[i].aggregated_value.unwrap_or(0.0) + contribution;
                    order[i].aggregated_value = Some(total);
                }
            }
            None => {
                index.insert(dest_key, order.len());
                order.push(PointEntity {
                    point: flow.destination.clone(),
                    is_origin: false,
                    aggregated_value: Some(contribution),
                });
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::{FlowRecord, GeoPoint, build_point_entities};
    use foundation::ids::ElementId;
    use foundation::math::sphere::LonLat;

    fn point(lon: f64, lat: f64, name: &str, el: u32) -> GeoPoint {
        GeoPoint::new(LonLat::new(lon, lat), name, ElementId(el))
    }

    fn flow(origin: GeoPoint, dest: GeoPoint, dest_value: Option<f64>) -> FlowRecord {
        FlowRecord {
            origin,
            destination: dest,
            value: 1.0,
            destination_value: dest_value,
        }
    }

    #[test]
    fn duplicate_destinations_aggregate() {
        let flows = vec![
            flow(
                point(0.0, 0.0, "a", 0),
                point(10.0, 10.0, "x", 10),
                Some(5.0),
            ),
            flow(
                point(1.0, 1.0, "b", 1),
                point(10.0, 10.0, "x", 10),
                Some(7.0),
            ),
        ];
        let points = build_point_entities(&flows);
        assert_eq!(points.len(), 3);
        let x = points.iter().find(|p| p.point.name == "x").unwrap();
        assert!(!x.is_origin);
        assert_eq!(x.aggregated_value, Some(12.0));
    }

    #[test]
    fn origin_status_is_sticky() {
        // Seen as origin first, then as destination: stays an origin.
        let flows = vec![
            flow(point(0.0, 0.0, "hub", 0), point(10.0, 0.0, "x", 1), Some(3.0)),
            flow(point(20.0, 0.0, "b", 2), point(0.0, 0.0, "hub", 3), Some(9.0)),
        ];
        let points = build_point_entities(&flows);
        let hub = points.iter().find(|p| p.point.name == "hub").unwrap();
        assert!(hub.is_origin);
        assert_eq!(hub.aggregated_value, None);
    }

    #[test]
    fn destination_later_seen_as_origin_is_promoted() {
        let flows = vec![
            flow(point(20.0, 0.0, "a", 0), point(0.0, 0.0, "hub", 1), Some(9.0)),
            flow(point(0.0, 0.0, "hub", 2), point(10.0, 0.0, "x", 3), Some(3.0)),
        ];
        let points = build_point_entities(&flows);
        let hub = points.iter().find(|p| p.point.name == "hub").unwrap();
        assert!(hub.is_origin);
        assert_eq!(hub.aggregated_value, None);
    }

    #[test]
    fn missing_destination_value_counts_as_zero() {
        let flows = vec![
            flow(point(0.0, 0.0, "a", 0), point(10.0, 10.0, "x", 1), None),
            flow(point(1.0, 1.0, "b", 2), point(10.0, 10.0, "x", 1), Some(4.0)),
        ];
        let points = build_point_entities(&flows);
        let x = points.iter().find(|p| p.point.name == "x").unwrap();
        assert_eq!(x.aggregated_value, Some(4.0));
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let flows = vec![
            flow(point(0.0, 0.0, "a", 0), point(1.0, 0.0, "x", 1), None),
            flow(point(2.0, 0.0, "b", 2), point(3.0, 0.0, "y", 3), None),
        ];
        let names: Vec<_> = build_point_entities(&flows)
            .into_iter()
            .map(|p| p.point.name)
            .collect();
        assert_eq!(names, vec!["a", "x", "b", "y"]);
    }
}
