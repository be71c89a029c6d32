//! The fully recomputed frame snapshot handed to the embedding.
//!
//! Nothing in here is incremental: every mutation of the projection or
//! selection rebuilds the whole visible set, which is what keeps layers,
//! readouts, and selection shading from drifting apart.

use foundation::math::Vec2;
use layers::cache::ArcPath;
use layers::points::PointSymbol;
use layers::symbology::CountryShade;
use scene::selection::ArcEmphasis;

/// One drawable arc with its resolved styling.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcRender {
    /// Index into the session's flow list.
    pub flow_index: usize,
    pub path: ArcPath,
    pub width: f64,
    pub opacity: f64,
    pub emphasis: ArcEmphasis,
}

/// One country with its projected outline and fill class.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub name: String,
    pub segments: Vec<Vec<Vec2>>,
    pub shade: CountryShade,
}

/// Everything the embedding needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    /// Radius of the ocean disc in pixels (equals the projection scale).
    pub ocean_radius: f64,
    /// Zoom readout: scale over surface radius, in percent.
    pub zoom_percent: u32,
    pub countries: Vec<CountryShape>,
    pub arcs: Vec<ArcRender>,
    pub points: Vec<PointSymbol>,
    /// Truncation warning, when the point limit cut the data short.
    pub warning: Option<String>,
    /// User-visible data failure, when the last load ended in an error.
    pub error: Option<String>,
}
