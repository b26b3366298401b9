//! Error type used across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Error produced while building a layered map.
#[derive(Debug, Error)]
pub enum GeoLayerError {
    /// The token does not start with any known layer prefix.
    #[error("unknown layer token `{0}`")]
    UnknownLayer(String),

    /// The token is missing a positional argument required by its layer kind.
    #[error("layer token `{token}` has no {argument} segment")]
    MissingArgument {
        /// Offending token.
        token: String,
        /// Name of the missing segment.
        argument: &'static str,
    },

    /// Year segment of a token is not a number.
    #[error("layer token `{token}` has invalid year `{year}`")]
    InvalidYear {
        /// Offending token.
        token: String,
        /// Segment that failed to parse.
        year: String,
    },

    /// Category segment does not name a land cover class.
    #[error("unknown land cover category `{0}`")]
    UnknownCategory(String),

    /// Land cover class exists but has no legend color.
    #[error("land cover category `{0}` has no display color")]
    UncoloredCategory(String),

    /// Required configuration value is not set.
    #[error("configuration value `{0}` is not set")]
    MissingConfig(&'static str),

    /// Compute service was queried before a successful bootstrap.
    #[error("compute service is not initialized")]
    NotInitialized,

    /// Filesystem error, with the path that was being read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Shapefile could not be parsed.
    #[error(transparent)]
    Shapefile(#[from] shapefile::Error),

    /// Shape type without a GeoJSON counterpart.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Transport level failure talking to the compute service.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Compute service answered with an error status.
    #[error("compute service returned {status}: {body}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the service.
        body: String,
    },

    /// Tile url template could not be expanded.
    #[error("invalid tile url template: {0}")]
    UrlTemplate(String),

    /// Map template failed to compile.
    #[error(transparent)]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Map template failed to render.
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
}

impl GeoLayerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
