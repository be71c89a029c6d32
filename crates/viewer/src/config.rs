//! The flat configuration surface.
//!
//! Every option is optional and resolution never fails: absent options take
//! the documented default, numeric options outside their domain clamp to
//! the nearest bound. Colors are opaque strings applied by the embedding.

use serde::Deserialize;

/// Raw options as supplied by the host, all optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeOptions {
    pub country_color: Option<String>,
    pub country_hover_color: Option<String>,
    pub country_select_color: Option<String>,
    pub ocean_color: Option<String>,
    pub enable_country_selection: Option<bool>,

    pub point_color: Option<String>,
    pub point_opacity: Option<f64>,
    pub point_size: Option<f64>,
    pub destination_sizing: Option<bool>,
    pub min_destination_point_size: Option<f64>,
    pub max_destination_point_size: Option<f64>,

    pub flow_color: Option<String>,
    pub flow_opacity: Option<f64>,
    pub base_line_width: Option<f64>,
    pub line_width_scale: Option<f64>,

    pub min_zoom_scale: Option<f64>,
    pub max_zoom_scale: Option<f64>,
    pub initial_zoom: Option<f64>,
    pub zoom_speed: Option<f64>,
    pub wheel_zoom_enabled: Option<bool>,

    pub point_limit: Option<usize>,
    pub show_point_limit_warning: Option<bool>,
    pub warning_message: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConfig {
    pub country_color: String,
    pub country_hover_color: String,
    pub country_select_color: String,
    pub ocean_color: String,
    pub enable_country_selection: bool,

    pub point_color: String,
    pub point_opacity: f64,
    pub point_size: f64,
    pub destination_sizing: bool,
    pub min_destination_point_size: f64,
    pub max_destination_point_size: f64,

    pub flow_color: String,
    pub flow_opacity: f64,
    pub base_line_width: f64,
    pub line_width_scale: f64,

    /// Zoom limits and initial zoom are factors of the surface radius.
    pub min_zoom_scale: f64,
    pub max_zoom_scale: f64,
    pub initial_zoom: f64,
    pub zoom_speed: f64,
    pub wheel_zoom_enabled: bool,

    pub point_limit: usize,
    pub show_point_limit_warning: bool,
    pub warning_message: String,
}

pub const DEFAULT_WARNING_MESSAGE: &str =
    "Data limited to {limit} points. Consider applying filters for complete view.";

impl GlobeOptions {
    /// Resolve against defaults and clamp every numeric domain.
    pub fn resolve(&self) -> GlobeConfig {
        let clamp = |v: Option<f64>, default: f64, lo: f64, hi: f64| {
            let value = v.filter(|x| x.is_finite()).unwrap_or(default);
            value.clamp(lo, hi)
        };

        let min_zoom_scale = clamp(self.min_zoom_scale, 0.5, 0.1, 1.0);
        let max_zoom_scale = clamp(self.max_zoom_scale, 2.5, 1.0, 10.0).max(min_zoom_scale);
        let min_dest = clamp(self.min_destination_point_size, 2.0, 1.0, 8.0);
        let max_dest = clamp(self.max_destination_point_size, 10.0, 4.0, 20.0).max(min_dest);

        GlobeConfig {
            country_color: self.country_color.clone().unwrap_or_else(|| "#d4dadc".into()),
            country_hover_color: self
                .country_hover_color
                .clone()
                .unwrap_or_else(|| "#b8bfc2".into()),
            country_select_color: self
                .country_select_color
                .clone()
                .unwrap_or_else(|| "#9ca6aa".into()),
            ocean_color: self.ocean_color.clone().unwrap_or_else(|| "#e6f3ff".into()),
            enable_country_selection: self.enable_country_selection.unwrap_or(true),

            point_color: self.point_color.clone().unwrap_or_else(|| "#000075".into()),
            point_opacity: clamp(self.point_opacity, 1.0, 0.0, 1.0),
            point_size: clamp(self.point_size, 3.0, 1.0, 10.0),
            destination_sizing: self.destination_sizing.unwrap_or(false),
            min_destination_point_size: min_dest,
            max_destination_point_size: max_dest,

            flow_color: self.flow_color.clone().unwrap_or_else(|| "#000075".into()),
            flow_opacity: clamp(self.flow_opacity, 0.2, 0.0, 1.0),
            base_line_width: clamp(self.base_line_width, 1.0, 0.5, 10.0),
            line_width_scale: clamp(self.line_width_scale, 1.0, 0.1, 5.0),

            min_zoom_scale,
            max_zoom_scale,
            initial_zoom: clamp(self.initial_zoom, 1.0, min_zoom_scale, max_zoom_scale),
            zoom_speed: clamp(self.zoom_speed, 1.2, 1.1, 2.0),
            wheel_zoom_enabled: self.wheel_zoom_enabled.unwrap_or(true),

            point_limit: self.point_limit.unwrap_or(1000).clamp(100, 10_000),
            show_point_limit_warning: self.show_point_limit_warning.unwrap_or(false),
            warning_message: self
                .warning_message
                .clone()
                .unwrap_or_else(|| DEFAULT_WARNING_MESSAGE.into()),
        }
    }
}

impl GlobeConfig {
    /// Warning text with the `{limit}` placeholder substituted.
    pub fn warning_text(&self) -> String {
        self.warning_message
            .replace("{limit}", &self.point_limit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeConfig, GlobeOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_options_resolve_to_documented_defaults() {
        let config = GlobeOptions::default().resolve();
        assert_eq!(config.country_color, "#d4dadc");
        assert_eq!(config.point_size, 3.0);
        assert_eq!(config.flow_opacity, 0.2);
        assert_eq!(config.base_line_width, 1.0);
        assert_eq!(config.line_width_scale, 1.0);
        assert_eq!(config.min_zoom_scale, 0.5);
        assert_eq!(config.max_zoom_scale, 2.5);
        assert_eq!(config.initial_zoom, 1.0);
        assert_eq!(config.zoom_speed, 1.2);
        assert_eq!(config.point_limit, 1000);
        assert!(config.wheel_zoom_enabled);
        assert!(!config.destination_sizing);
        assert!(!config.show_point_limit_warning);
    }

    #[test]
    fn out_of_domain_numerics_clamp_instead_of_failing() {
        let options = GlobeOptions {
            flow_opacity: Some(-0.4),
            point_opacity: Some(7.0),
            zoom_speed: Some(95.0),
            point_limit: Some(5),
            ..GlobeOptions::default()
        };
        let config = options.resolve();
        assert_eq!(config.flow_opacity, 0.0);
        assert_eq!(config.point_opacity, 1.0);
        assert_eq!(config.zoom_speed, 2.0);
        assert_eq!(config.point_limit, 100);
    }

    #[test]
    fn non_finite_numerics_fall_back_to_defaults() {
        let options = GlobeOptions {
            flow_opacity: Some(f64::NAN),
            initial_zoom: Some(f64::INFINITY),
            ..GlobeOptions::default()
        };
        let config = options.resolve();
        assert_eq!(config.flow_opacity, 0.2);
        assert_eq!(config.initial_zoom, 1.0);
    }

    #[test]
    fn inverted_ranges_are_repaired() {
        let options = GlobeOptions {
            min_zoom_scale: Some(1.0),
            max_zoom_scale: Some(1.0),
            min_destination_point_size: Some(8.0),
            max_destination_point_size: Some(4.0),
            ..GlobeOptions::default()
        };
        let config = options.resolve();
        assert!(config.max_zoom_scale >= config.min_zoom_scale);
        assert!(config.max_destination_point_size >= config.min_destination_point_size);
    }

    #[test]
    fn options_deserialize_from_partial_json() {
        let options: GlobeOptions =
            serde_json::from_str(r##"{"zoom_speed": 1.5, "flow_color": "#ff9900"}"##).unwrap();
        let config = options.resolve();
        assert_eq!(config.zoom_speed, 1.5);
        assert_eq!(config.flow_color, "#ff9900");
        assert_eq!(config.point_size, 3.0);
    }

    #[test]
    fn warning_text_substitutes_limit() {
        let config: GlobeConfig = GlobeOptions {
            point_limit: Some(500),
            ..GlobeOptions::default()
        }
        .resolve();
        assert_eq!(
            config.warning_text(),
            "Data limited to 500 points. Consider applying filters for complete view."
        );
    }
}
