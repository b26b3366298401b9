//! Interactive web map assembled from tile overlays and rendered to HTML.

use serde::Serialize;

use crate::compute::MapId;
use crate::error::GeoLayerError;

mod html;
pub mod legend;

pub use legend::{Legend, LegendAccumulator};

/// Attribution shown for overlays computed by Earth Engine.
pub const EARTH_ENGINE_ATTRIBUTION: &str =
    r#"Map Data &copy; <a href="https://earthengine.google.com/">Google Earth Engine</a>"#;

const FULL_SIZE: &str = "100%";

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl LatLon {
    /// Creates a coordinate.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// What part of the world the map shows and how large it is on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Map center.
    pub center: LatLon,
    /// Zoom level.
    pub zoom: u8,
    /// CSS height of the map element.
    pub height: String,
    /// CSS width of the map element.
    pub width: String,
}

impl MapView {
    /// Full page view centered at the given point.
    pub fn new(center: LatLon, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            height: FULL_SIZE.to_string(),
            width: FULL_SIZE.to_string(),
        }
    }

    /// Sets the height in pixels.
    pub fn with_height_px(mut self, height: u32) -> Self {
        self.height = format!("{height}px");
        self
    }

    /// Sets the CSS width.
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = width.into();
        self
    }
}

/// Raster layer drawn from a tile url template.
#[derive(Debug, Clone, PartialEq)]
pub struct TileOverlay {
    /// Name shown in the layer control.
    pub name: String,
    /// Url template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Attribution html.
    pub attribution: String,
    /// Drawn over the base layer rather than replacing it.
    pub overlay: bool,
    /// Listed in the layer control.
    pub control: bool,
}

impl TileOverlay {
    /// Toggleable overlay for a tile source computed by Earth Engine.
    pub fn earth_engine(name: impl Into<String>, map_id: &MapId) -> Self {
        Self {
            name: name.into(),
            url_template: map_id.url_format.clone(),
            attribution: EARTH_ENGINE_ATTRIBUTION.to_string(),
            overlay: true,
            control: true,
        }
    }
}

/// Map document under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WebMap {
    view: MapView,
    overlays: Vec<TileOverlay>,
    legend: Option<Legend>,
    layer_control: bool,
}

impl WebMap {
    /// Creates an empty map with the given view.
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            overlays: vec![],
            legend: None,
            layer_control: false,
        }
    }

    /// Current view.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Overlays in drawing order.
    pub fn overlays(&self) -> &[TileOverlay] {
        &self.overlays
    }

    /// Legend, if one was set.
    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// True if the layer toggle control is attached.
    pub fn has_layer_control(&self) -> bool {
        self.layer_control
    }

    /// Adds an overlay on top of the existing ones.
    pub fn add_tile_overlay(&mut self, overlay: TileOverlay) {
        self.overlays.push(overlay);
    }

    /// Changes the view, keeping the overlays.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
    }

    /// Starts over with a new view: all overlays are removed.
    ///
    /// Returns the number of removed overlays.
    pub fn reset(&mut self, view: MapView) -> usize {
        let dropped = self.overlays.len();
        self.overlays.clear();
        self.view = view;
        dropped
    }

    /// Sets the legend, replacing the previous one.
    pub fn set_legend(&mut self, legend: Legend) {
        self.legend = Some(legend);
    }

    /// Attaches the layer toggle control.
    pub fn add_layer_control(&mut self) {
        self.layer_control = true;
    }

    /// Serializes the map into a standalone HTML document.
    pub fn to_html(&self) -> Result<String, GeoLayerError> {
        html::render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(name: &str) -> TileOverlay {
        TileOverlay::earth_engine(
            name,
            &MapId {
                name: format!("projects/p/maps/{name}"),
                url_format: format!("https://tiles.example/{name}/{{z}}/{{x}}/{{y}}"),
            },
        )
    }

    #[test]
    fn reset_drops_overlays() {
        let mut map = WebMap::new(MapView::new(LatLon::new(-9.26, -55.4), 4));
        map.add_tile_overlay(overlay("a"));
        map.add_tile_overlay(overlay("b"));

        let dropped = map.reset(MapView::new(LatLon::new(-21.1767, -47.8208), 10));
        assert_eq!(dropped, 2);
        assert!(map.overlays().is_empty());
        assert_eq!(map.view().zoom, 10);
    }

    #[test]
    fn set_view_keeps_overlays() {
        let mut map = WebMap::new(MapView::new(LatLon::new(0.0, 0.0), 2));
        map.add_tile_overlay(overlay("a"));
        map.set_view(MapView::new(LatLon::new(1.0, 1.0), 3).with_height_px(500));

        assert_eq!(map.overlays().len(), 1);
        assert_eq!(map.view().height, "500px");
    }

    #[test]
    fn html_contains_layers_legend_and_control() {
        let mut map = WebMap::new(MapView::new(LatLon::new(-9.26, -55.4), 4));
        map.add_tile_overlay(overlay("burned"));
        let mut legend = LegendAccumulator::default();
        legend.push("Burned Area", "4e0400");
        map.set_legend(legend.into_legend(""));
        map.add_layer_control();

        let html = map.to_html().expect("renders");
        assert!(html.contains(r#"L.tileLayer("https://tiles.example/burned/{z}/{x}/{y}""#));
        assert!(html.contains(r#"overlays["burned"] = tile_layer_0;"#));
        assert!(html.contains("background: #4e0400;"));
        assert!(html.contains("Burned Area"));
        assert!(html.contains("center: [-9.26, -55.4], zoom: 4"));
        assert!(html.contains("L.control.layers(base_layers, overlays)"));
    }

    #[test]
    fn html_without_control_or_legend() {
        let map = WebMap::new(MapView::new(LatLon::new(0.0, 0.0), 2));
        let html = map.to_html().expect("renders");
        assert!(!html.contains("L.control.layers"));
        assert!(!html.contains(r#"class="geolayer-legend-title""#));
        assert!(!html.contains(r#"<div class="geolayer-legend">"#));
    }

    #[test]
    fn html_is_deterministic() {
        let mut map = WebMap::new(MapView::new(LatLon::new(-9.26, -55.4), 4));
        map.add_tile_overlay(overlay("a"));
        assert_eq!(map.to_html().ok(), map.to_html().ok());
    }
}
