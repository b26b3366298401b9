//! Serialization of a [`WebMap`] into a standalone Leaflet document.

use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::Value;

use super::legend::Legend;
use super::WebMap;
use crate::error::GeoLayerError;

const TEMPLATE_NAME: &str = "map";
const TEMPLATE: &str = include_str!("map.html.hbs");
const MAP_ELEMENT_ID: &str = "geolayer_map";

#[derive(Serialize)]
struct MapContext<'a> {
    map_id: &'static str,
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    width: &'a str,
    height: &'a str,
    overlays: Vec<OverlayContext<'a>>,
    legend: Option<LegendContext<'a>>,
    layer_control: bool,
}

#[derive(Serialize)]
struct OverlayContext<'a> {
    var_name: String,
    name: &'a str,
    url_template: &'a str,
    attribution: &'a str,
    overlay: bool,
    control: bool,
}

#[derive(Serialize)]
struct LegendContext<'a> {
    title: &'a str,
    entries: Vec<LegendEntryContext<'a>>,
}

#[derive(Serialize)]
struct LegendEntryContext<'a> {
    label: &'a str,
    color: String,
}

fn handlebars() -> Result<Handlebars<'static>, GeoLayerError> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(json: |v: Value| v.to_string());
    handlebars.register_helper("json", Box::new(json));

    handlebars
        .register_template_string(TEMPLATE_NAME, TEMPLATE)
        .map_err(Box::new)?;
    Ok(handlebars)
}

pub(super) fn render(map: &WebMap) -> Result<String, GeoLayerError> {
    let view = map.view();
    let context = MapContext {
        map_id: MAP_ELEMENT_ID,
        center_lat: view.center.lat,
        center_lon: view.center.lon,
        zoom: view.zoom,
        width: &view.width,
        height: &view.height,
        overlays: map
            .overlays()
            .iter()
            .enumerate()
            .map(|(index, overlay)| OverlayContext {
                var_name: format!("tile_layer_{index}"),
                name: &overlay.name,
                url_template: &overlay.url_template,
                attribution: &overlay.attribution,
                overlay: overlay.overlay,
                control: overlay.control,
            })
            .collect(),
        legend: map.legend().map(legend_context),
        layer_control: map.has_layer_control(),
    };

    Ok(handlebars()?.render(TEMPLATE_NAME, &context)?)
}

fn legend_context(legend: &Legend) -> LegendContext<'_> {
    LegendContext {
        title: legend.title(),
        entries: legend
            .entries()
            .iter()
            .map(|(label, color)| LegendEntryContext {
                label,
                color: Legend::css_color(color),
            })
            .collect(),
    }
}
