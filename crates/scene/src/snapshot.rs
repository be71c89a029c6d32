//! External snapshot of the selection state.
//!
//! The host may persist this across paints and hand it back at session
//! start; restore is verbatim, no recomputation happens until the next
//! interaction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use foundation::ids::ElementId;
use foundation::math::sphere::LonLat;

use crate::flow::{GeoPoint, PointEntity};
use crate::selection::{SelectionMachine, SelectionSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub name: String,
    pub element: u32,
    pub is_origin: bool,
    pub aggregated_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub selected_origin: Option<u32>,
    /// Ascending element ids.
    pub selected_destinations: Vec<u32>,
    pub affected_countries: Vec<String>,
    pub last_point: Option<SnapshotPoint>,
}

impl SelectionSnapshot {
    pub fn capture(machine: &SelectionMachine) -> Self {
        Self {
            selected_origin: machine.selected_origin().map(|e| e.0),
            selected_destinations: machine.destinations().iter().map(|e| e.0).collect(),
            affected_countries: machine.affected_countries().iter().cloned().collect(),
            last_point: machine.last_point().map(|p| SnapshotPoint {
                longitude: p.point.position.lon,
                latitude: p.point.position.lat,
                name: p.point.name.clone(),
                element: p.point.element.0,
                is_origin: p.is_origin,
                aggregated_value: p.aggregated_value,
            }),
        }
    }

    pub fn restore_into(&self, machine: &mut SelectionMachine) {
        let mut destinations = SelectionSet::new();
        for &el in &self.selected_destinations {
            destinations.insert(ElementId(el));
        }
        let countries: BTreeSet<String> = self.affected_countries.iter().cloned().collect();
        let last_point = self.last_point.as_ref().map(|p| PointEntity {
            point: GeoPoint::new(
                LonLat::new(p.longitude, p.latitude),
                p.name.clone(),
                ElementId(p.element),
            ),
            is_origin: p.is_origin,
            aggregated_value: p.aggregated_value,
        });

        machine.restore_parts(
            self.selected_origin.map(ElementId),
            destinations,
            countries,
            last_point,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSnapshot;
    use crate::countries::CountryCollection;
    use crate::flow::{GeoPoint, PointEntity};
    use crate::selection::SelectionMachine;
    use foundation::ids::ElementId;
    use foundation::math::sphere::LonLat;

    fn machine_with_selection() -> SelectionMachine {
        let mut m = SelectionMachine::new();
        let countries = CountryCollection::default();
        m.click_point(
            &PointEntity {
                point: GeoPoint::new(LonLat::new(5.0, 5.0), "a", ElementId(1)),
                is_origin: true,
                aggregated_value: None,
            },
            &countries,
        );
        m.click_point(
            &PointEntity {
                point: GeoPoint::new(LonLat::new(15.0, 5.0), "x", ElementId(4)),
                is_origin: false,
                aggregated_value: Some(2.0),
            },
            &countries,
        );
        m
    }

    #[test]
    fn capture_restore_round_trip() {
        let m = machine_with_selection();
        let snap = SelectionSnapshot::capture(&m);

        let mut restored = SelectionMachine::new();
        snap.restore_into(&mut restored);
        assert_eq!(restored, m);
    }

    #[test]
    fn snapshot_survives_json() {
        let m = machine_with_selection();
        let snap = SelectionSnapshot::capture(&m);
        let text = serde_json::to_string(&snap).unwrap();
        let back: SelectionSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn empty_snapshot_restores_empty_state() {
        let mut m = machine_with_selection();
        SelectionSnapshot::default().restore_into(&mut m);
        assert!(!m.has_selection());
        assert!(m.destinations().is_empty());
        assert!(m.last_point().is_none());
    }
}
