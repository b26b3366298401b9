//! Access to the remote earth observation compute service.
//!
//! The service is asked for renderable tile sources. All filtering, masking, clipping and styling
//! happens server side, described by the [`expression`] graphs sent with each request.

use std::collections::HashMap;

use crate::error::GeoLayerError;

pub mod earth_engine;
pub mod expression;
pub mod vis_params;

pub use earth_engine::{Credentials, EarthEngineClient};
pub use expression::{Expression, FeatureCollection, Image, ImageCollection, ValueNode};
pub use vis_params::{FeatureStyle, VisParams};

/// Color used to paint feature collections when the visualization record has no palette.
pub const DEFAULT_DRAW_COLOR: &str = "000000";

/// Product that can be turned into a tile source.
#[derive(Debug, Clone, PartialEq)]
pub enum EeObject {
    /// Single raster.
    Image(Image),
    /// Raster stack. Rendered as its per pixel median.
    ImageCollection(ImageCollection),
    /// Vector features. Rendered by painting them in a single color.
    FeatureCollection(FeatureCollection),
}

impl EeObject {
    /// Image that is actually rendered for this product.
    pub fn to_renderable(&self, vis_params: &VisParams) -> Image {
        match self {
            Self::Image(image) => image.clone(),
            Self::ImageCollection(collection) => collection.clone().median(),
            Self::FeatureCollection(collection) => {
                let color = vis_params
                    .palette
                    .first()
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_DRAW_COLOR);
                collection.clone().draw(color)
            }
        }
    }
}

impl From<Image> for EeObject {
    fn from(value: Image) -> Self {
        Self::Image(value)
    }
}

impl From<ImageCollection> for EeObject {
    fn from(value: ImageCollection) -> Self {
        Self::ImageCollection(value)
    }
}

impl From<FeatureCollection> for EeObject {
    fn from(value: FeatureCollection) -> Self {
        Self::FeatureCollection(value)
    }
}

/// Tile source handed out by the compute service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapId {
    /// Resource name of the map on the service side.
    pub name: String,
    /// Tile url template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_format: String,
}

impl MapId {
    /// Expands the url template for one tile.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> Result<String, GeoLayerError> {
        let vars = HashMap::from([
            ("z".to_string(), z),
            ("x".to_string(), x),
            ("y".to_string(), y),
        ]);
        strfmt::strfmt(&self.url_format, &vars)
            .map_err(|err| GeoLayerError::UrlTemplate(err.to_string()))
    }
}

/// Remote compute service producing tile sources for computed products.
#[async_trait::async_trait]
pub trait ComputeService: Send + Sync {
    /// Authenticates against the service. Must succeed before any other call.
    async fn initialize(&self) -> Result<(), GeoLayerError>;

    /// Requests a tile source for the product styled with the given parameters.
    async fn get_map_id(
        &self,
        object: &EeObject,
        vis_params: &VisParams,
    ) -> Result<MapId, GeoLayerError>;
}
