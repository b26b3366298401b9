//! Local inputs: vector boundaries and prediction points.

use std::path::Path;

use geojson::{Feature, Geometry};
use log::debug;
use shapefile::Shape;

use crate::error::GeoLayerError;

pub mod points;

pub use points::{load_prediction_points, prediction_marker_style};

/// Reader of vector features from local files.
pub trait VectorSource: Send + Sync {
    /// Reads all features of the file.
    fn read_features(&self, path: &Path) -> Result<Vec<Feature>, GeoLayerError>;
}

/// Reads geometries of ESRI shapefiles. Attributes are not read.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShapefileSource;

impl VectorSource for ShapefileSource {
    fn read_features(&self, path: &Path) -> Result<Vec<Feature>, GeoLayerError> {
        if !path.exists() {
            return Err(GeoLayerError::io(
                path,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let shapes = shapefile::read_shapes(path)?;
        debug!("Read {} shapes from {}", shapes.len(), path.display());

        let mut features = Vec::with_capacity(shapes.len());
        for shape in shapes {
            if matches!(shape, Shape::NullShape) {
                continue;
            }

            let geometry = geo_types::Geometry::<f64>::try_from(shape)
                .map_err(|err| GeoLayerError::UnsupportedShape(err.to_string()))?;
            features.push(Feature {
                geometry: Some(Geometry::new(geojson::Value::from(&geometry))),
                ..Default::default()
            });
        }

        Ok(features)
    }
}
