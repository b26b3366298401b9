//! Builds one map from a list of layer tokens.
//!
//! Every token is turned into a product of the compute service plus visualization parameters,
//! the service is asked for a tile source, and the source is added to the map as an overlay.
//! Legend entries are collected along the way and attached at the end.

use std::path::Path;

use log::{debug, error, warn};

use crate::compute::{
    ComputeService, EeObject, FeatureCollection, FeatureStyle, Image, ImageCollection, VisParams,
};
use crate::config::Config;
use crate::error::GeoLayerError;
use crate::layer::{LandCoverClass, LayerToken};
use crate::render::{LatLon, LegendAccumulator, MapView, TileOverlay, WebMap};
use crate::source::{load_prediction_points, ShapefileSource, VectorSource};

/// Country level view the map starts with.
pub const START_CENTER: LatLon = LatLon::new(-9.26, -55.4);
const START_ZOOM: u8 = 4;

/// Center of the close up view used by the urban layer.
pub const URBAN_CENTER: LatLon = LatLon::new(-21.1767, -47.8208);
const URBAN_ZOOM: u8 = 10;

const PREDICTION_ZOOM: u8 = 5;
const RESET_HEIGHT_PX: u32 = 500;

const LAND_COVER_BAND: &str = "LC_Type1";
const LAND_COVER_OPACITY: f64 = 0.6;

const POPULATION_DATASET: &str = "WorldPop/GP/100m/pop";
const POPULATION_BAND: &str = "population";
const POPULATION_PALETTE: [&str; 3] = ["24126c", "1fff4f", "d4ff50"];

const BURN_DATASET: &str = "MODIS/061/MCD64A1";
const BURN_BAND: &str = "BurnDate";
const BURN_PALETTE: [&str; 4] = ["4e0400", "951003", "c61503", "ff1901"];
// Day of year of the burn.
const BURN_RANGE: (f64, f64) = (30.0, 341.0);
const BORDERS_DATASET: &str = "USDOS/LSIB_SIMPLE/2017";
const BORDERS_COUNTRY_FIELD: &str = "country_na";
const COUNTRY_NAME: &str = "Brazil";

const URBAN_PALETTE: &str = "69fff8";
const URBAN_LEGEND_COLOR: &str = "ffc0cb";
const URBAN_OPACITY: f64 = 0.7;

const PREDICTIONS_LAYER: &str = "Points";
const PREDICTIONS_LEGEND: (&str, &str) = ("Wildfire Predictions", "000000");

/// What happens when a remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole map.
    Propagate,
    /// Log the error and continue without the result.
    LogAndSkip,
}

impl FailurePolicy {
    /// Applies the policy to a result. `Ok(None)` means the failure was skipped.
    pub fn apply<T>(
        self,
        result: Result<T, GeoLayerError>,
        context: &str,
    ) -> Result<Option<T>, GeoLayerError> {
        match (self, result) {
            (_, Ok(value)) => Ok(Some(value)),
            (Self::Propagate, Err(err)) => Err(err),
            (Self::LogAndSkip, Err(err)) => {
                error!("Failed to add layer {context}: {err}");
                Ok(None)
            }
        }
    }
}

/// Everything needed to add one layer, computed from its token.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlan {
    /// Overlay name.
    pub name: String,
    /// Product to render.
    pub object: EeObject,
    /// Styling of the product.
    pub vis_params: VisParams,
    /// Legend pairs contributed by the layer.
    pub legend: Vec<(String, String)>,
    /// View the map is reset to before the layer is added.
    pub reset_view: Option<MapView>,
}

/// Map and legend threaded through the token fold.
#[derive(Debug)]
pub struct MapState {
    map: WebMap,
    legend: LegendAccumulator,
}

impl MapState {
    /// Creates the state with an empty map.
    pub fn new(view: MapView) -> Self {
        Self {
            map: WebMap::new(view),
            legend: LegendAccumulator::default(),
        }
    }

    /// Map built so far.
    pub fn map(&self) -> &WebMap {
        &self.map
    }

    /// Legend pairs collected so far.
    pub fn legend(&self) -> &LegendAccumulator {
        &self.legend
    }

    /// Replaces the map with an empty one showing `view`. Collected legend pairs are kept.
    pub fn reset_view(&mut self, view: MapView) {
        let dropped = self.map.reset(view);
        if dropped > 0 {
            warn!("View reset discarded {dropped} previously added overlay(s)");
        }
    }

    /// Attaches the legend and the layer control.
    pub fn finish(mut self) -> WebMap {
        self.map.set_legend(self.legend.into_legend(""));
        self.map.add_layer_control();
        self.map
    }
}

/// Turns layer tokens into a rendered map.
pub struct LayerDispatcher<S> {
    service: S,
    config: Config,
    vector_source: Box<dyn VectorSource>,
}

impl<S: ComputeService> LayerDispatcher<S> {
    /// Creates a dispatcher reading boundaries from shapefiles.
    pub fn new(service: S, config: Config) -> Self {
        Self {
            service,
            config,
            vector_source: Box::new(ShapefileSource),
        }
    }

    /// Replaces the reader of the boundary files.
    pub fn with_vector_source(mut self, source: impl VectorSource + 'static) -> Self {
        self.vector_source = Box::new(source);
        self
    }

    /// Compute service used for the tile requests.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Builds the map for the tokens and returns it as HTML.
    pub async fn render_layers<T: AsRef<str>>(
        &self,
        tokens: &[T],
    ) -> Result<String, GeoLayerError> {
        self.build_map(tokens).await?.to_html()
    }

    /// Builds the map for the tokens.
    ///
    /// All tokens are parsed before anything else happens, so a malformed token fails the call
    /// without any remote request.
    pub async fn build_map<T: AsRef<str>>(&self, tokens: &[T]) -> Result<WebMap, GeoLayerError> {
        let tokens = tokens
            .iter()
            .map(|token| LayerToken::parse(token.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        self.service.initialize().await?;
        let boundary = self.read_collection(&self.config.boundary_path)?;

        let mut state = MapState::new(MapView::new(START_CENTER, START_ZOOM));
        for token in tokens {
            debug!("Adding layer {token}");
            self.dispatch(&mut state, token, &boundary).await?;
        }

        Ok(state.finish())
    }

    async fn dispatch(
        &self,
        state: &mut MapState,
        token: LayerToken,
        boundary: &FeatureCollection,
    ) -> Result<(), GeoLayerError> {
        if token == LayerToken::Predictions {
            return self.add_predictions(state).await;
        }

        let plan = self.plan(token, boundary)?;
        if let Some(view) = plan.reset_view {
            state.reset_view(view);
        }
        state.legend.extend(plan.legend);

        self.add_overlay(
            state,
            &plan.name,
            &plan.object,
            &plan.vis_params,
            FailurePolicy::LogAndSkip,
        )
        .await
    }

    /// Computes the product, styling and legend of a token.
    ///
    /// Prediction points are not planned: they are read from a file and added by a separate path.
    pub fn plan(
        &self,
        token: LayerToken,
        boundary: &FeatureCollection,
    ) -> Result<LayerPlan, GeoLayerError> {
        let plan = match token {
            LayerToken::LandCoverCategory { class, year } => {
                let color = class
                    .color()
                    .ok_or_else(|| GeoLayerError::UncoloredCategory(class.label().into()))?;
                LayerPlan {
                    name: class.label().to_string(),
                    object: masked_land_cover(year, class, boundary).into(),
                    vis_params: VisParams::default().with_palette([color]),
                    legend: vec![(class.label().into(), color.into())],
                    reset_view: None,
                }
            }
            LayerToken::LandCover { year } => LayerPlan {
                name: format!("Land Cover {year}"),
                object: land_cover(year).clip_to_collection(boundary).into(),
                vis_params: VisParams::default()
                    .with_range(1.0, 17.0)
                    .with_palette(LandCoverClass::palette())
                    .with_opacity(LAND_COVER_OPACITY),
                legend: LandCoverClass::colored()
                    .map(|(class, color)| (class.label().into(), color.into()))
                    .collect(),
                reset_view: None,
            },
            LayerToken::Population => LayerPlan {
                name: "Population".into(),
                object: ImageCollection::load(POPULATION_DATASET)
                    .mean()
                    .clip_to_collection(boundary)
                    .into(),
                vis_params: VisParams::default()
                    .with_bands([POPULATION_BAND])
                    .with_range(0.0, 50.0)
                    .with_palette(POPULATION_PALETTE),
                legend: vec![("Population".into(), POPULATION_PALETTE[0].into())],
                reset_view: None,
            },
            LayerToken::BurnedArea { year } => {
                let (start, end) = burn_date_range(year);
                let borders = FeatureCollection::load(BORDERS_DATASET)
                    .filter_eq(BORDERS_COUNTRY_FIELD, COUNTRY_NAME);
                LayerPlan {
                    name: "Burned Area".into(),
                    object: ImageCollection::load(BURN_DATASET)
                        .filter_date(&start, &end)
                        .select(BURN_BAND)
                        .clip_to_collection(&borders)
                        .into(),
                    vis_params: VisParams::default()
                        .with_range(BURN_RANGE.0, BURN_RANGE.1)
                        .with_palette(BURN_PALETTE),
                    legend: vec![("Burned Area".into(), BURN_PALETTE[0].into())],
                    reset_view: None,
                }
            }
            LayerToken::RegionBoundary => {
                let style = FeatureStyle::new("00ff00", "0000ff60", 2.0);
                LayerPlan {
                    name: COUNTRY_NAME.into(),
                    object: boundary.clone().style(&style).into(),
                    vis_params: VisParams::default(),
                    legend: vec![(COUNTRY_NAME.into(), style.fill_color)],
                    reset_view: None,
                }
            }
            LayerToken::Biomes => {
                let style = FeatureStyle::new("05450a", "05450a", 1.0);
                let biomes = self.read_collection(&self.config.biomes_path)?;
                LayerPlan {
                    name: "Biomes".into(),
                    object: biomes.style(&style).into(),
                    vis_params: VisParams::default(),
                    legend: vec![("Biomes".into(), style.fill_color)],
                    reset_view: None,
                }
            }
            LayerToken::Urban { year } => {
                let name = format!("Urban and Built-up Land Cover {year}");
                LayerPlan {
                    object: masked_land_cover(year, LandCoverClass::UrbanAndBuiltUp, boundary)
                        .into(),
                    vis_params: VisParams::default()
                        .with_range(1.0, 1.0)
                        .with_palette([URBAN_PALETTE])
                        .with_opacity(URBAN_OPACITY),
                    legend: vec![(name.clone(), URBAN_LEGEND_COLOR.into())],
                    reset_view: Some(
                        MapView::new(URBAN_CENTER, URBAN_ZOOM).with_height_px(RESET_HEIGHT_PX),
                    ),
                    name,
                }
            }
            LayerToken::Predictions => return Err(GeoLayerError::UnknownLayer(token.to_string())),
        };

        Ok(plan)
    }

    async fn add_predictions(&self, state: &mut MapState) -> Result<(), GeoLayerError> {
        let features = load_prediction_points(&self.config.predictions_path)?;
        debug!("Loaded {} prediction points", features.len());
        let points = FeatureCollection::from_features(&features);

        state.reset_view(
            MapView::new(START_CENTER, PREDICTION_ZOOM)
                .with_height_px(RESET_HEIGHT_PX)
                .with_width("100%"),
        );
        self.add_overlay(
            state,
            PREDICTIONS_LAYER,
            &points.into(),
            &VisParams::default(),
            FailurePolicy::Propagate,
        )
        .await?;
        state.legend.push(PREDICTIONS_LEGEND.0, PREDICTIONS_LEGEND.1);

        Ok(())
    }

    async fn add_overlay(
        &self,
        state: &mut MapState,
        name: &str,
        object: &EeObject,
        vis_params: &VisParams,
        policy: FailurePolicy,
    ) -> Result<(), GeoLayerError> {
        let result = self.service.get_map_id(object, vis_params).await;
        if let Some(map_id) = policy.apply(result, name)? {
            state.map.add_tile_overlay(TileOverlay::earth_engine(name, &map_id));
        }

        Ok(())
    }

    fn read_collection(&self, path: &Path) -> Result<FeatureCollection, GeoLayerError> {
        let features = self.vector_source.read_features(path)?;
        Ok(FeatureCollection::from_features(&features))
    }
}

/// Date range covering one calendar year, as `(first day, last day)`.
pub fn burn_date_range(year: u16) -> (String, String) {
    (format!("{year}-01-01"), format!("{year}-12-31"))
}

fn land_cover(year: u16) -> Image {
    Image::load(&format!("MODIS/006/MCD12Q1/{year}_01_01")).select(LAND_COVER_BAND)
}

fn masked_land_cover(year: u16, class: LandCoverClass, boundary: &FeatureCollection) -> Image {
    let classified = land_cover(year).clip_to_collection(boundary);
    let mask = classified.equals(class.code());
    classified.update_mask(mask)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;
    use crate::compute::{MapId, ValueNode};

    struct NoService;

    #[async_trait::async_trait]
    impl ComputeService for NoService {
        async fn initialize(&self) -> Result<(), GeoLayerError> {
            Ok(())
        }

        async fn get_map_id(&self, _: &EeObject, _: &VisParams) -> Result<MapId, GeoLayerError> {
            Err(GeoLayerError::NotInitialized)
        }
    }

    fn dispatcher() -> LayerDispatcher<NoService> {
        LayerDispatcher::new(NoService, Config::default())
    }

    fn boundary() -> FeatureCollection {
        FeatureCollection::from_features([])
    }

    fn plan(token: &str) -> LayerPlan {
        dispatcher()
            .plan(LayerToken::parse(token).expect("valid token"), &boundary())
            .expect("plannable")
    }

    #[test]
    fn burn_plan_uses_calendar_year() {
        let plan = plan("burn_2020");
        let EeObject::ImageCollection(collection) = &plan.object else {
            panic!("burned area must be a collection");
        };
        let range = collection.node().find("DateRange").expect("date filter");

        assert_eq!(
            range.argument("start").and_then(ValueNode::as_constant),
            Some(&json!("2020-01-01"))
        );
        assert_eq!(
            range.argument("end").and_then(ValueNode::as_constant),
            Some(&json!("2020-12-31"))
        );
        assert_relative_eq!(plan.vis_params.min.unwrap_or_default(), 30.0);
        assert_relative_eq!(plan.vis_params.max.unwrap_or_default(), 341.0);
    }

    #[test]
    fn single_category_masks_by_code() {
        let plan = plan("landcover_only_Croplands_2019");
        assert_eq!(plan.vis_params.palette, vec!["c24f44".to_string()]);
        assert_eq!(plan.legend, vec![("Croplands".into(), "c24f44".into())]);

        let EeObject::Image(image) = &plan.object else {
            panic!("land cover must be an image");
        };
        let constant = image.node().find("Image.constant").expect("mask constant");
        assert_eq!(
            constant.argument("value").and_then(ValueNode::as_constant),
            Some(&json!(12))
        );
    }

    #[test]
    fn full_land_cover_styling() {
        let plan = plan("landcover_2020");
        assert_eq!(plan.name, "Land Cover 2020");
        assert_eq!(plan.vis_params.palette.len(), 17);
        assert_eq!(plan.vis_params.opacity, Some(0.6));
        assert_eq!(plan.legend.len(), 17);
    }

    #[test]
    fn urban_resets_view() {
        let plan = plan("urban_2020");
        let view = plan.reset_view.expect("urban resets the view");
        assert_eq!(view.center, URBAN_CENTER);
        assert_eq!(view.zoom, 10);
        assert_eq!(plan.vis_params.palette.len(), 1);
        assert_eq!(plan.vis_params.opacity, Some(0.7));
        assert_eq!(
            plan.legend,
            vec![("Urban and Built-up Land Cover 2020".into(), "ffc0cb".into())]
        );
    }

    #[test]
    fn population_has_no_opacity() {
        let plan = plan("population");
        assert_eq!(plan.vis_params.bands, vec!["population".to_string()]);
        assert_eq!(plan.vis_params.opacity, None);
    }

    #[test]
    fn predictions_are_not_planned() {
        let result = dispatcher().plan(LayerToken::Predictions, &boundary());
        assert!(result.is_err());
    }

    #[test]
    fn policy_skips_or_propagates() {
        let skipped =
            FailurePolicy::LogAndSkip.apply::<()>(Err(GeoLayerError::NotInitialized), "x");
        assert!(matches!(skipped, Ok(None)));

        let propagated =
            FailurePolicy::Propagate.apply::<()>(Err(GeoLayerError::NotInitialized), "x");
        assert!(matches!(propagated, Err(GeoLayerError::NotInitialized)));

        assert!(matches!(FailurePolicy::Propagate.apply(Ok(1), "x"), Ok(Some(1))));
    }
}
