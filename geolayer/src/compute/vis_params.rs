//! Visualization records sent along with tile requests.

use serde::{Deserialize, Serialize};

/// How a raster is turned into colors. Unset fields use the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    /// Value mapped to the first palette color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Value mapped to the last palette color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Colors as hex strings, with or without a leading `#`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub palette: Vec<String>,
    /// Layer opacity in `0..=1`. Fully opaque when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Bands to visualize.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bands: Vec<String>,
}

impl VisParams {
    /// Sets the value range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the palette.
    pub fn with_palette<S: Into<String>>(mut self, palette: impl IntoIterator<Item = S>) -> Self {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Sets the band selection.
    pub fn with_bands<S: Into<String>>(mut self, bands: impl IntoIterator<Item = S>) -> Self {
        self.bands = bands.into_iter().map(Into::into).collect();
        self
    }

    /// True when nothing is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outline and fill used to paint vector features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    /// Outline color.
    pub color: String,
    /// Interior color. A trailing byte is the alpha channel (`0000ff60`).
    pub fill_color: String,
    /// Outline width in pixels.
    pub width: f64,
}

impl FeatureStyle {
    /// Creates a style.
    pub fn new(color: impl Into<String>, fill_color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            fill_color: fill_color.into(),
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let params = VisParams::default().with_range(0.0, 50.0);
        let json = serde_json::to_value(&params).expect("serializable");
        assert_eq!(json, serde_json::json!({ "min": 0.0, "max": 50.0 }));
        assert!(VisParams::default().is_empty());
        assert!(!params.is_empty());
    }
}
