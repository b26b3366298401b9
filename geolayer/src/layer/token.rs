//! Layer selector tokens.
//!
//! A token is a `_` separated string. Its prefix selects the layer kind and the remaining
//! segments are positional arguments whose meaning depends on the kind, e.g.
//! `landcover_only_Savannas_2020` or `burn_2019`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::land_cover::LandCoverClass;
use crate::error::GeoLayerError;

const SEPARATOR: char = '_';

/// Kind of a layer, selected by the token prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// One land cover class masked out of the classification.
    LandCoverSingleCategory,
    /// Full land cover classification.
    LandCoverAll,
    /// Mean population density.
    Population,
    /// Burned area for one year.
    BurnedArea,
    /// Outline of the country boundary.
    RegionBoundary,
    /// Outlines of the biomes.
    Biomes,
    /// Urban and built-up land cover only.
    UrbanOnly,
    /// Wildfire prediction points.
    PredictionPoints,
}

impl LayerKind {
    /// Prefixes in match order. Overlapping prefixes come most specific first.
    const PREFIXES: [(&'static str, LayerKind); 8] = [
        ("landcover_only", LayerKind::LandCoverSingleCategory),
        ("landcover", LayerKind::LandCoverAll),
        ("population", LayerKind::Population),
        ("burn", LayerKind::BurnedArea),
        ("Brazil", LayerKind::RegionBoundary),
        ("biomes", LayerKind::Biomes),
        ("urban", LayerKind::UrbanOnly),
        ("prediction", LayerKind::PredictionPoints),
    ];

    /// Classifies a token by its prefix.
    pub fn classify(token: &str) -> Option<Self> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    /// Prefix that selects this kind.
    pub fn prefix(self) -> &'static str {
        Self::PREFIXES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(prefix, _)| *prefix)
            .unwrap_or_default()
    }
}

/// Parsed layer token with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerToken {
    /// `landcover_only_<category>_<year>`
    LandCoverCategory {
        /// Selected class. Always has a color.
        class: LandCoverClass,
        /// Classification year.
        year: u16,
    },
    /// `landcover_<year>`
    LandCover {
        /// Classification year.
        year: u16,
    },
    /// `population`
    Population,
    /// `burn_<year>`
    BurnedArea {
        /// Burn year.
        year: u16,
    },
    /// `Brazil`
    RegionBoundary,
    /// `biomes`
    Biomes,
    /// `urban_<year>`
    Urban {
        /// Classification year.
        year: u16,
    },
    /// `prediction`
    Predictions,
}

impl LayerToken {
    /// Parses a token. Malformed tokens are rejected here rather than when the layer is built.
    pub fn parse(token: &str) -> Result<Self, GeoLayerError> {
        let kind =
            LayerKind::classify(token).ok_or_else(|| GeoLayerError::UnknownLayer(token.into()))?;
        let segments: Vec<&str> = token.split(SEPARATOR).collect();

        let parsed = match kind {
            LayerKind::LandCoverSingleCategory => {
                let label = segment(token, &segments, 2, "category")?;
                let class = LandCoverClass::from_label(label)?;
                if class.color().is_none() {
                    return Err(GeoLayerError::UncoloredCategory(label.to_string()));
                }

                Self::LandCoverCategory {
                    class,
                    year: year(token, &segments, 3)?,
                }
            }
            LayerKind::LandCoverAll => Self::LandCover {
                year: year(token, &segments, 1)?,
            },
            LayerKind::Population => Self::Population,
            LayerKind::BurnedArea => Self::BurnedArea {
                year: year(token, &segments, 1)?,
            },
            LayerKind::RegionBoundary => Self::RegionBoundary,
            LayerKind::Biomes => Self::Biomes,
            LayerKind::UrbanOnly => Self::Urban {
                year: year(token, &segments, 1)?,
            },
            LayerKind::PredictionPoints => Self::Predictions,
        };

        Ok(parsed)
    }

    /// Kind of the layer.
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::LandCoverCategory { .. } => LayerKind::LandCoverSingleCategory,
            Self::LandCover { .. } => LayerKind::LandCoverAll,
            Self::Population => LayerKind::Population,
            Self::BurnedArea { .. } => LayerKind::BurnedArea,
            Self::RegionBoundary => LayerKind::RegionBoundary,
            Self::Biomes => LayerKind::Biomes,
            Self::Urban { .. } => LayerKind::UrbanOnly,
            Self::Predictions => LayerKind::PredictionPoints,
        }
    }
}

impl FromStr for LayerToken {
    type Err = GeoLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for LayerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = self.kind().prefix();
        match self {
            Self::LandCoverCategory { class, year } => {
                write!(f, "{prefix}_{}_{year}", class.label())
            }
            Self::LandCover { year } | Self::BurnedArea { year } | Self::Urban { year } => {
                write!(f, "{prefix}_{year}")
            }
            _ => f.write_str(prefix),
        }
    }
}

fn segment<'a>(
    token: &str,
    segments: &[&'a str],
    index: usize,
    argument: &'static str,
) -> Result<&'a str, GeoLayerError> {
    segments
        .get(index)
        .copied()
        .ok_or_else(|| GeoLayerError::MissingArgument {
            token: token.to_string(),
            argument,
        })
}

fn year(token: &str, segments: &[&str], index: usize) -> Result<u16, GeoLayerError> {
    let raw = segment(token, segments, index, "year")?;
    raw.parse().map_err(|_| GeoLayerError::InvalidYear {
        token: token.to_string(),
        year: raw.to_string(),
    })
}
