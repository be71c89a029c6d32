//! Styling policy as pure functions of data and selection.
//!
//! Everything here returns numbers or shade classes; colors themselves are
//! configuration strings the embedding applies.

use scene::selection::ArcEmphasis;

/// Stroke width for a flow of the given magnitude.
///
/// Square-root scaling keeps visual width sub-linear in magnitude, so a
/// single outlier cannot drown the rest of the picture.
pub fn flow_width(value: f64, base_width: f64, width_scale: f64) -> f64 {
    base_width * value.max(0.0).sqrt() * width_scale
}

/// Arc opacity under the current selection emphasis.
///
/// With a selected origin: full configured opacity on selected paths, ×0.8
/// on that origin's other arcs, ×0.5 on unrelated arcs. No selection means
/// every arc uses the configured default.
pub fn arc_opacity(emphasis: ArcEmphasis, base_opacity: f64) -> f64 {
    match emphasis {
        ArcEmphasis::Default | ArcEmphasis::SelectedPath => base_opacity,
        ArcEmphasis::FromSelectedOrigin => base_opacity * 0.8,
        ArcEmphasis::Unrelated => base_opacity * 0.5,
    }
}

/// Linear magnitude→radius mapping over an observed value span.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadiusScale {
    min_value: f64,
    max_value: f64,
    min_radius: f64,
    max_radius: f64,
}

impl RadiusScale {
    pub fn new(min_value: f64, max_value: f64, min_radius: f64, max_radius: f64) -> Self {
        Self {
            min_value,
            max_value,
            min_radius,
            max_radius,
        }
    }

    /// Radius for `value`, clamped to the radius range.
    ///
    /// A degenerate span (all observed values equal) collapses to the
    /// midpoint radius instead of dividing by zero.
    pub fn radius(&self, value: f64) -> f64 {
        let span = self.max_value - self.min_value;
        if span <= 0.0 {
            return 0.5 * (self.min_radius + self.max_radius);
        }
        let t = ((value - self.min_value) / span).clamp(0.0, 1.0);
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}

/// Fill class for one country polygon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CountryShade {
    Base,
    Highlighted,
}

pub fn country_shade(highlighted: bool) -> CountryShade {
    if highlighted {
        CountryShade::Highlighted
    } else {
        CountryShade::Base
    }
}
