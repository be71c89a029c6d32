//! The fixed-width wire row.
//!
//! The data source supplies pages of 8-column rows: origin latitude,
//! origin longitude, origin label, destination latitude, destination
//! longitude, destination label, flow measure, optional destination-sizing
//! measure. Transport is the host's business; this module only gives the
//! row a shape and a conversion into the scene model.

use serde::{Deserialize, Serialize};

use foundation::ids::ElementId;
use foundation::math::sphere::LonLat;
use scene::flow::{FlowRecord, GeoPoint};

/// One cell of a row. Numeric, textual, and element parts are all
/// optional; absent numerics surface as NaN downstream and fall out at
/// geometry build, per the malformed-coordinate policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub num: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub element: Option<u32>,
}

impl Cell {
    pub fn number(v: f64) -> Self {
        Self {
            num: Some(v),
            ..Self::default()
        }
    }

    pub fn label(text: impl Into<String>, element: u32) -> Self {
        Self {
            num: None,
            text: Some(text.into()),
            element: Some(element),
        }
    }
}

pub const ROW_WIDTH: usize = 8;

/// A full 8-cell row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRow(pub [Cell; ROW_WIDTH]);

impl FlowRow {
    /// Convert to the immutable scene record.
    ///
    /// This never fails: missing coordinates become NaN (and the affected
    /// geometry is silently skipped later), a missing flow measure defaults
    /// to 1, and negative magnitudes clamp to 0.
    pub fn to_record(&self) -> FlowRecord {
        let cells = &self.0;
        let num = |i: usize| cells[i].num.unwrap_or(f64::NAN);
        let label = |i: usize| cells[i].text.clone().unwrap_or_default();
        let element = |i: usize| ElementId(cells[i].element.unwrap_or(0));

        FlowRecord {
            origin: GeoPoint::new(LonLat::new(num(1), num(0)), label(2), element(2)),
            destination: GeoPoint::new(LonLat::new(num(4), num(3)), label(5), element(5)),
            value: cells[6].num.unwrap_or(1.0).max(0.0),
            destination_value: cells[7].num,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, FlowRow};

    fn row(
        o_lat: Option<f64>,
        o_lon: Option<f64>,
        d_lat: Option<f64>,
        d_lon: Option<f64>,
        value: Option<f64>,
        dest_value: Option<f64>,
    ) -> FlowRow {
        FlowRow([
            o_lat.map(Cell::number).unwrap_or_default(),
            o_lon.map(Cell::number).unwrap_or_default(),
            Cell::label("origin", 2),
            d_lat.map(Cell::number).unwrap_or_default(),
            d_lon.map(Cell::number).unwrap_or_default(),
            Cell::label("destination", 5),
            value.map(Cell::number).unwrap_or_default(),
            dest_value.map(Cell::number).unwrap_or_default(),
        ])
    }

    #[test]
    fn decodes_coordinates_labels_and_measures() {
        let record = row(
            Some(48.0),
            Some(2.0),
            Some(-33.0),
            Some(151.0),
            Some(42.0),
            Some(7.0),
        )
        .to_record();
        assert_eq!(record.origin.position.lat, 48.0);
        assert_eq!(record.origin.position.lon, 2.0);
        assert_eq!(record.origin.name, "origin");
        assert_eq!(record.origin.element.0, 2);
        assert_eq!(record.destination.position.lat, -33.0);
        assert_eq!(record.value, 42.0);
        assert_eq!(record.destination_value, Some(7.0));
    }

    #[test]
    fn missing_measure_defaults_to_one() {
        let record = row(Some(0.0), Some(0.0), Some(1.0), Some(1.0), None, None).to_record();
        assert_eq!(record.value, 1.0);
        assert_eq!(record.destination_value, None);
    }

    #[test]
    fn negative_measure_clamps_to_zero() {
        let record = row(Some(0.0), Some(0.0), Some(1.0), Some(1.0), Some(-4.0), None).to_record();
        assert_eq!(record.value, 0.0);
    }

    #[test]
    fn missing_coordinate_becomes_invalid_not_an_error() {
        let record = row(None, Some(0.0), Some(1.0), Some(1.0), None, None).to_record();
        assert!(!record.origin.position.is_valid());
        assert!(record.destination.position.is_valid());
    }

    #[test]
    fn rows_round_trip_through_json() {
        let r = row(Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), None);
        let text = serde_json::to_string(&r).unwrap();
        let back: FlowRow = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
    }
}
