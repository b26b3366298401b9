//! Thematic map layers for a fixed region, computed by Earth Engine and rendered with Leaflet.
//!
//! A map is described by a list of layer tokens such as `landcover_2020`, `burn_2020` or
//! `Brazil`. [`LayerDispatcher`] parses the tokens, asks the [`ComputeService`] for one tile
//! source per layer and assembles a [`WebMap`] with a legend and a layer control, which is then
//! serialized to a standalone HTML document.
//!
//! ```no_run
//! # async fn run() -> Result<(), geolayer::GeoLayerError> {
//! let html = geolayer::render_layers(&["landcover_2020", "burn_2020"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod compute;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod layer;
pub mod render;
pub mod source;

pub use compute::{ComputeService, EarthEngineClient};
pub use config::Config;
pub use dispatch::{FailurePolicy, LayerDispatcher};
pub use error::GeoLayerError;
pub use layer::{LandCoverClass, LayerKind, LayerToken};
pub use render::WebMap;

/// Renders the layers with the Earth Engine client configured from the environment.
pub async fn render_layers<T: AsRef<str>>(tokens: &[T]) -> Result<String, GeoLayerError> {
    let config = Config::from_env();
    let client = EarthEngineClient::new(config.clone());
    LayerDispatcher::new(client, config)
        .render_layers(tokens)
        .await
}
