//! Country boundary outlines under the current projection.

use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use foundation::math::sphere::is_front_facing;
use scene::countries::CountryCollection;

use crate::layer::{Layer, LayerId};

/// The projected outline of one country: a polyline segment per visible
/// stretch of each ring.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinePath {
    pub name: String,
    pub segments: Vec<Vec<Vec2>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OutlineLayer {
    id: LayerId,
}

impl OutlineLayer {
    pub fn new(id: u64) -> Self {
        Self { id: LayerId(id) }
    }

    /// Re-project every country boundary.
    ///
    /// Rings are split into segments wherever they dip behind the
    /// terminator; a country entirely on the far side yields an entry with
    /// no segments, so shading still has a row per polygon.
    pub fn extract(&self, countries: &CountryCollection, projection: &Orthographic) -> Vec<OutlinePath> {
        let rotate = projection.rotate_deg();
        let mut out = Vec::with_capacity(countries.len());

        for country in countries.iter() {
            let mut segments: Vec<Vec<Vec2>> = Vec::new();
            for ring in &country.rings {
                let mut current: Vec<Vec2> = Vec::new();
                for &vertex in ring {
                    if vertex.is_valid()
                        && is_front_facing(vertex, rotate)
                        && let Some(p) = projection.project(vertex)
                    {
                        current.push(p);
                        continue;
                    }
                    if current.len() >= 2 {
                        segments.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
                if current.len() >= 2 {
                    segments.push(current);
                }
            }
            out.push(OutlinePath {
                name: country.name.clone(),
                segments,
            });
        }
        out
    }
}

impl Layer for OutlineLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::OutlineLayer;
    use foundation::math::Vec2;
    use foundation::math::ortho::Orthographic;
    use scene::countries::{CountryCollection, CountryPolygon};
    use foundation::math::sphere::LonLat;

    fn projection(lambda: f64) -> Orthographic {
        Orthographic::new([lambda, 0.0, 0.0], 100.0, Vec2::new(400.0, 300.0))
    }

    fn box_country(name: &str, lon0: f64) -> CountryPolygon {
        CountryPolygon::new(
            name,
            vec![vec![
                LonLat::new(lon0, 0.0),
                LonLat::new(lon0 + 10.0, 0.0),
                LonLat::new(lon0 + 10.0, 10.0),
                LonLat::new(lon0, 10.0),
                LonLat::new(lon0, 0.0),
            ]],
        )
    }

    #[test]
    fn front_country_projects_far_country_has_no_segments() {
        let layer = OutlineLayer::new(1);
        let countries = CountryCollection::new(vec![
            box_country("near", 0.0),
            box_country("far", 170.0),
        ]);
        let outlines = layer.extract(&countries, &projection(0.0));
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].name, "near");
        assert_eq!(outlines[0].segments.len(), 1);
        assert_eq!(outlines[0].segments[0].len(), 5);
        assert!(outlines[1].segments.is_empty());
    }

    #[test]
    fn rotation_changes_the_projected_outline() {
        let layer = OutlineLayer::new(1);
        let countries = CountryCollection::new(vec![box_country("near", 0.0)]);
        let a = layer.extract(&countries, &projection(0.0));
        let b = layer.extract(&countries, &projection(20.0));
        assert_ne!(a, b);
    }

    #[test]
    fn ring_straddling_the_terminator_splits() {
        let layer = OutlineLayer::new(1);
        // A wide band: vertices walk from the visible side to the far side
        // and back.
        let countries = CountryCollection::new(vec![CountryPolygon::new(
            "band",
            vec![vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(40.0, 0.0),
                LonLat::new(140.0, 0.0),
                LonLat::new(-140.0, 0.0),
                LonLat::new(-40.0, 0.0),
                LonLat::new(0.0, 0.0),
            ]],
        )]);
        let outlines = layer.extract(&countries, &projection(0.0));
        assert_eq!(outlines[0].segments.len(), 2);
    }
}
