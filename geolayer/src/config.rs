//! Configuration of the compute service access and the input files.

use std::path::PathBuf;

/// Environment variable with the compute project id.
pub const PROJECT_VAR: &str = "GEE_PROJECT";
/// Environment variable with the OAuth access token.
pub const ACCESS_TOKEN_VAR: &str = "GEE_ACCESS_TOKEN";
/// Environment variable overriding the API base url.
pub const API_URL_VAR: &str = "GEE_API_URL";
/// Environment variable overriding the country boundary shapefile.
pub const BOUNDARY_VAR: &str = "GEOLAYER_BOUNDARY_SHP";
/// Environment variable overriding the biome shapefile.
pub const BIOMES_VAR: &str = "GEOLAYER_BIOMES_SHP";
/// Environment variable overriding the prediction points file.
pub const PREDICTIONS_VAR: &str = "GEOLAYER_PREDICTIONS_JSON";

const DEFAULT_API_URL: &str = "https://earthengine.googleapis.com";
const DEFAULT_BOUNDARY_PATH: &str = "../data/Brazil/Brazil.shp";
const DEFAULT_BIOMES_PATH: &str = "../data/Brazil Biomes/Brazil_biomes.shp";
const DEFAULT_PREDICTIONS_PATH: &str = "../data/output.json";

/// Settings used by the dispatcher and the compute client.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Compute project id. Read from the environment at bootstrap when unset.
    pub project: Option<String>,
    /// Access token. Read from the environment at bootstrap when unset.
    pub access_token: Option<String>,
    /// Base url of the compute service API.
    pub api_url: String,
    /// Shapefile with the country boundary.
    pub boundary_path: PathBuf,
    /// Shapefile with the biome outlines.
    pub biomes_path: PathBuf,
    /// JSON file with the wildfire prediction points.
    pub predictions_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: None,
            access_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            boundary_path: DEFAULT_BOUNDARY_PATH.into(),
            biomes_path: DEFAULT_BIOMES_PATH.into(),
            predictions_path: DEFAULT_PREDICTIONS_PATH.into(),
        }
    }
}

impl Config {
    /// Starts a builder with default values.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Loads the configuration from the environment.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first if present. Variables
    /// that are already set take precedence over the file.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            project: var(PROJECT_VAR),
            access_token: var(ACCESS_TOKEN_VAR),
            api_url: var(API_URL_VAR).unwrap_or(defaults.api_url),
            boundary_path: var(BOUNDARY_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.boundary_path),
            biomes_path: var(BIOMES_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.biomes_path),
            predictions_path: var(PREDICTIONS_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.predictions_path),
        }
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the compute project id.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.config.project = Some(project.into());
        self
    }

    /// Sets the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Sets the API base url.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Sets the country boundary shapefile.
    pub fn with_boundary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.boundary_path = path.into();
        self
    }

    /// Sets the biome shapefile.
    pub fn with_biomes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.biomes_path = path.into();
        self
    }

    /// Sets the prediction points file.
    pub fn with_predictions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.predictions_path = path.into();
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn variables_override_defaults() {
        let vars = HashMap::from([
            (PROJECT_VAR, "fires"),
            (PREDICTIONS_VAR, "/tmp/points.json"),
        ]);
        let config = Config::from_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.project.as_deref(), Some("fires"));
        assert_eq!(config.access_token, None);
        assert_eq!(config.predictions_path, PathBuf::from("/tmp/points.json"));
        assert_eq!(config.boundary_path, PathBuf::from(DEFAULT_BOUNDARY_PATH));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn builder_sets_fields() {
        let config = Config::builder()
            .with_project("p")
            .with_biomes_path("biomes.shp")
            .build();
        assert_eq!(config.project.as_deref(), Some("p"));
        assert_eq!(config.biomes_path, PathBuf::from("biomes.shp"));
    }
}
