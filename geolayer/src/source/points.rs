//! Wildfire prediction points stored as a JSON array of `{"latitude", "longitude"}` records.

use std::path::Path;

use geojson::{Feature, Geometry, JsonObject, Value as GeoValue};
use log::warn;
use serde_json::{json, Value};

use crate::error::GeoLayerError;

const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";
const STYLE_PROPERTY: &str = "style";

/// Marker style attached to every prediction feature.
///
/// The tile request paints collections in a single color, so this annotation does not affect the
/// rendered layer.
pub fn prediction_marker_style() -> Value {
    json!({
        "icon": {
            "color": "red",
            "glyph": "circle",
            "glyphColor": "white",
        }
    })
}

/// Loads prediction points as point features.
///
/// Records without both a `latitude` and a `longitude` key are skipped.
pub fn load_prediction_points(path: &Path) -> Result<Vec<Feature>, GeoLayerError> {
    let content = std::fs::read_to_string(path).map_err(|err| GeoLayerError::io(path, err))?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    Ok(points_from_records(&records))
}

fn points_from_records(records: &[Value]) -> Vec<Feature> {
    records
        .iter()
        .filter_map(Value::as_object)
        .filter(|record| record.contains_key(LATITUDE) && record.contains_key(LONGITUDE))
        .filter_map(|record| {
            let lat = record.get(LATITUDE).and_then(Value::as_f64);
            let lon = record.get(LONGITUDE).and_then(Value::as_f64);
            match (lat, lon) {
                (Some(lat), Some(lon)) => Some(point_feature(lat, lon)),
                _ => {
                    warn!("Skipping prediction record with non-numeric coordinates: {record:?}");
                    None
                }
            }
        })
        .collect()
}

fn point_feature(lat: f64, lon: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(STYLE_PROPERTY.to_string(), prediction_marker_style());

    Feature {
        geometry: Some(Geometry::new(GeoValue::Point(vec![lon, lat]))),
        properties: Some(properties),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn records_without_both_keys_are_skipped() {
        let records = json!([
            { "latitude": -9.5, "longitude": -55.0 },
            { "latitude": -10.0 },
            { "longitude": -50.0 },
            { "latitude": -3.1, "longitude": -60.2, "probability": 0.8 },
            "not a record",
        ]);
        let features = points_from_records(records.as_array().expect("array"));

        assert_eq!(features.len(), 2);
        let coordinates = features[1].geometry.as_ref().map(|g| g.value.clone());
        assert_eq!(coordinates, Some(GeoValue::Point(vec![-60.2, -3.1])));
    }

    #[test]
    fn features_carry_marker_style() {
        let features = points_from_records(&[json!({ "latitude": 1.0, "longitude": 2.0 })]);
        let style = features[0]
            .properties
            .as_ref()
            .and_then(|p| p.get(STYLE_PROPERTY));
        assert_eq!(style, Some(&prediction_marker_style()));
    }

    #[test]
    fn loads_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"[{{"latitude": -9.26, "longitude": -55.4}}, {{"lat": 0, "lon": 0}}]"#
        )?;

        let features = load_prediction_points(file.path())?;
        assert_eq!(features.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_prediction_points(Path::new("/nonexistent/output.json"));
        assert!(matches!(result, Err(GeoLayerError::Io { .. })));
    }
}
