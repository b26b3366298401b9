//! [`ComputeService`] backed by the Earth Engine REST API.

use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::expression::Expression;
use super::{ComputeService, EeObject, MapId, VisParams};
use crate::config::{Config, ACCESS_TOKEN_VAR, PROJECT_VAR};
use crate::error::GeoLayerError;

const FILE_FORMAT: &str = "AUTO_JPEG_PNG";

/// Project and bearer token used for requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Cloud project the requests are billed to.
    pub project: String,
    /// OAuth access token.
    pub access_token: String,
}

impl Credentials {
    /// Takes credentials from the configuration, falling back to the process environment.
    pub fn resolve(config: &Config) -> Result<Self, GeoLayerError> {
        let project = config
            .project
            .clone()
            .or_else(|| std::env::var(PROJECT_VAR).ok())
            .filter(|v| !v.is_empty())
            .ok_or(GeoLayerError::MissingConfig(PROJECT_VAR))?;
        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var(ACCESS_TOKEN_VAR).ok())
            .filter(|v| !v.is_empty())
            .ok_or(GeoLayerError::MissingConfig(ACCESS_TOKEN_VAR))?;

        Ok(Self {
            project,
            access_token,
        })
    }
}

/// Earth Engine client.
pub struct EarthEngineClient {
    client: reqwest::Client,
    config: Config,
    credentials: RwLock<Option<Credentials>>,
}

impl EarthEngineClient {
    /// Creates a client. No request is made until [`ComputeService::initialize`] is called.
    pub fn new(config: Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        Self {
            client,
            config,
            credentials: RwLock::new(None),
        }
    }

    fn maps_url(&self, project: &str) -> String {
        format!(
            "{}/v1/projects/{project}/maps",
            self.config.api_url.trim_end_matches('/')
        )
    }

    fn tiles_url_format(&self, map_name: &str) -> String {
        format!(
            "{}/v1/{map_name}/tiles/{{z}}/{{x}}/{{y}}",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ComputeService for EarthEngineClient {
    async fn initialize(&self) -> Result<(), GeoLayerError> {
        let credentials = Credentials::resolve(&self.config)?;
        info!("Initializing Earth Engine for project {}", credentials.project);
        *self.credentials.write() = Some(credentials);
        Ok(())
    }

    async fn get_map_id(
        &self,
        object: &EeObject,
        vis_params: &VisParams,
    ) -> Result<MapId, GeoLayerError> {
        let credentials = self
            .credentials
            .read()
            .clone()
            .ok_or(GeoLayerError::NotInitialized)?;

        let url = self.maps_url(&credentials.project);
        let request = CreateMapRequest::new(object, vis_params);
        debug!("Requesting map from {url}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeoLayerError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreateMapResponse = response.json().await?;
        debug!("Map {} created", created.name);

        Ok(MapId {
            url_format: self.tiles_url_format(&created.name),
            name: created.name,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMapRequest {
    expression: Expression,
    file_format: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    band_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visualization_options: Option<VisualizationOptions>,
}

impl CreateMapRequest {
    fn new(object: &EeObject, vis_params: &VisParams) -> Self {
        let image = object.to_renderable(vis_params);
        let visualization_options = match object {
            // Collections are painted by the `Collection.draw` call already.
            EeObject::FeatureCollection(_) => None,
            _ => VisualizationOptions::from_params(vis_params),
        };

        Self {
            expression: Expression::new(image.node().clone()),
            file_format: FILE_FORMAT,
            band_ids: vis_params.bands.clone(),
            visualization_options,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisualizationOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ranges: Vec<ValueRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    palette_colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
}

impl VisualizationOptions {
    fn from_params(params: &VisParams) -> Option<Self> {
        let ranges = match (params.min, params.max) {
            (None, None) => vec![],
            (min, max) => vec![ValueRange {
                min: min.unwrap_or(0.0),
                max: max.unwrap_or(1.0),
            }],
        };
        let palette_colors: Vec<String> = params
            .palette
            .iter()
            .map(|color| color.trim_start_matches('#').to_string())
            .collect();

        if ranges.is_empty() && palette_colors.is_empty() && params.opacity.is_none() {
            return None;
        }

        Some(Self {
            ranges,
            palette_colors,
            opacity: params.opacity,
        })
    }
}

#[derive(Debug, Serialize)]
struct ValueRange {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct CreateMapResponse {
    name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::compute::{FeatureCollection, Image};

    fn config() -> Config {
        Config::builder()
            .with_project("demo-project")
            .with_access_token("token")
            .with_api_url("https://ee.example/")
            .build()
    }

    #[test]
    fn request_carries_visualization() {
        let image = Image::load("MODIS/006/MCD12Q1/2020_01_01").select("LC_Type1");
        let params = VisParams::default()
            .with_range(1.0, 17.0)
            .with_palette(["#05450a", "086a10"])
            .with_opacity(0.6);
        let request = CreateMapRequest::new(&image.into(), &params);
        let json = serde_json::to_value(&request).expect("serializable");

        assert_eq!(json["fileFormat"], "AUTO_JPEG_PNG");
        assert_eq!(
            json["visualizationOptions"],
            json!({
                "ranges": [{ "min": 1.0, "max": 17.0 }],
                "paletteColors": ["05450a", "086a10"],
                "opacity": 0.6,
            })
        );
        assert!(json.get("bandIds").is_none());
    }

    #[test]
    fn styled_request_has_no_visualization() {
        let image = Image::load("x");
        let request = CreateMapRequest::new(&image.into(), &VisParams::default());
        assert!(request.visualization_options.is_none());

        let features = FeatureCollection::load("y");
        let params = VisParams::default().with_palette(["ff0000"]);
        let request = CreateMapRequest::new(&features.into(), &params);
        assert!(request.visualization_options.is_none());
    }

    #[test]
    fn urls_use_configured_base() {
        let client = EarthEngineClient::new(config());
        assert_eq!(
            client.maps_url("demo-project"),
            "https://ee.example/v1/projects/demo-project/maps"
        );
        assert_eq!(
            client.tiles_url_format("projects/demo-project/maps/abc"),
            "https://ee.example/v1/projects/demo-project/maps/abc/tiles/{z}/{x}/{y}"
        );
    }

    #[test]
    fn requests_before_initialization_fail() {
        let client = EarthEngineClient::new(config());
        let result = tokio_test::block_on(
            client.get_map_id(&Image::load("x").into(), &VisParams::default()),
        );
        assert!(matches!(result, Err(GeoLayerError::NotInitialized)));
    }

    #[test]
    fn initialization_uses_configured_credentials() {
        let client = EarthEngineClient::new(config());
        tokio_test::block_on(client.initialize()).expect("configured");
        assert_eq!(
            client.credentials.read().as_ref().map(|c| c.project.as_str()),
            Some("demo-project")
        );
    }
}
