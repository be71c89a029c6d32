//! Positioned point symbols for origins and destinations.

use foundation::ids::ElementId;
use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use foundation::math::sphere::is_front_facing;
use scene::flow::PointEntity;

use crate::layer::{Layer, LayerId};
use crate::symbology::RadiusScale;

/// Sizing inputs for the point layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointSizing {
    /// Radius for origins, and for destinations when magnitude sizing is off.
    pub base_radius: f64,
    pub magnitude_sizing: bool,
    pub min_radius: f64,
    pub max_radius: f64,
}

/// One drawable point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSymbol {
    /// Index of the source entity in the extraction input.
    pub entity_index: usize,
    pub screen: Vec2,
    pub radius: f64,
    pub is_origin: bool,
    pub visible: bool,
    pub name: String,
    pub element: ElementId,
    pub aggregated_value: Option<f64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PointLayer {
    id: LayerId,
}

impl PointLayer {
    pub fn new(id: u64) -> Self {
        Self { id: LayerId(id) }
    }

    /// Project every entity; hidden ones keep their symbol with
    /// `visible: false` so hit testing and re-renders stay aligned with the
    /// entity list. Entities that fail to project are dropped.
    ///
    /// Ordering contract:
    /// - Output order equals input entity order.
    pub fn extract(
        &self,
        entities: &[PointEntity],
        projection: &Orthographic,
        sizing: PointSizing,
    ) -> Vec<PointSymbol> {
        let scale = self.destination_scale(entities, sizing);
        let rotate = projection.rotate_deg();

        let mut out = Vec::with_capacity(entities.len());
        for (entity_index, entity) in entities.iter().enumerate() {
            if !entity.point.position.is_valid() {
                continue;
            }
            let Some(screen) = projection.project(entity.point.position) else {
                continue;
            };

            let radius = match (&scale, entity.is_origin, entity.aggregated_value) {
                (Some(s), false, Some(value)) => s.radius(value),
                _ => sizing.base_radius,
            };

            out.push(PointSymbol {
                entity_index,
                screen,
                radius,
                is_origin: entity.is_origin,
                visible: is_front_facing(entity.point.position, rotate),
                name: entity.point.name.clone(),
                element: entity.point.element,
                aggregated_value: entity.aggregated_value,
            });
        }
        out
    }

    /// Observed destination-value span, when magnitude sizing is on and
    /// there is at least one destination.
    fn destination_scale(
        &self,
        entities: &[PointEntity],
        sizing: PointSizing,
    ) -> Option<RadiusScale> {
        if !sizing.magnitude_sizing {
            return None;
        }
        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        let mut seen = false;
        for entity in entities {
            if entity.is_origin {
                continue;
            }
            let Some(v) = entity.aggregated_value else {
                continue;
            };
            min_value = min_value.min(v);
            max_value = max_value.max(v);
            seen = true;
        }
        seen.then(|| RadiusScale::new(min_value, max_value, sizing.min_radius, sizing.max_radius))
    }
}

impl Layer for PointLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
