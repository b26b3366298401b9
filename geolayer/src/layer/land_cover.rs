//! MODIS land cover classification (`LC_Type1`) lookup tables.

use crate::error::GeoLayerError;

/// Land cover category as named in layer tokens and legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandCoverClass {
    /// Water bodies.
    Water,
    /// Evergreen needleleaf forest.
    EvergreenNeedleleafForest,
    /// Evergreen broadleaf forest.
    EvergreenBroadleafForest,
    /// Deciduous needleleaf forest.
    DeciduousNeedleleafForest,
    /// Deciduous broadleaf forest.
    DeciduousBroadleafForest,
    /// Mixed forest.
    MixedForest,
    /// Closed shrublands.
    ClosedShrublands,
    /// Open shrublands.
    OpenShrublands,
    /// Woody savannas.
    WoodySavannas,
    /// Savannas.
    Savannas,
    /// Grasslands.
    Grasslands,
    /// Permanent wetlands.
    PermanentWetlands,
    /// Croplands.
    Croplands,
    /// Urban and built-up lands.
    UrbanAndBuiltUp,
    /// Cropland and natural vegetation mosaic.
    CroplandNaturalVegetationMosaic,
    /// Permanent snow and ice.
    SnowAndIce,
    /// Barren or sparsely vegetated lands.
    Barren,
    /// Catch-all for pixels without a class.
    Unclassified,
}

impl LandCoverClass {
    /// All classes in table order.
    pub const ALL: [LandCoverClass; 18] = [
        Self::Water,
        Self::EvergreenNeedleleafForest,
        Self::EvergreenBroadleafForest,
        Self::DeciduousNeedleleafForest,
        Self::DeciduousBroadleafForest,
        Self::MixedForest,
        Self::ClosedShrublands,
        Self::OpenShrublands,
        Self::WoodySavannas,
        Self::Savannas,
        Self::Grasslands,
        Self::PermanentWetlands,
        Self::Croplands,
        Self::UrbanAndBuiltUp,
        Self::CroplandNaturalVegetationMosaic,
        Self::SnowAndIce,
        Self::Barren,
        Self::Unclassified,
    ];

    /// Human readable name, as used in tokens and legend labels.
    pub fn label(self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::EvergreenNeedleleafForest => "Evergreen Needleleaf Forest",
            Self::EvergreenBroadleafForest => "Evergreen Broadleaf Forest",
            Self::DeciduousNeedleleafForest => "Deciduous Needleleaf Forest",
            Self::DeciduousBroadleafForest => "Deciduous Broadleaf Forest",
            Self::MixedForest => "Mixed Forest",
            Self::ClosedShrublands => "Closed Shrublands",
            Self::OpenShrublands => "Open Shrublands",
            Self::WoodySavannas => "Woody Savannas",
            Self::Savannas => "Savannas",
            Self::Grasslands => "Grasslands",
            Self::PermanentWetlands => "Permanent Wetlands",
            Self::Croplands => "Croplands",
            Self::UrbanAndBuiltUp => "Urban and Built-up",
            Self::CroplandNaturalVegetationMosaic => "Cropland/Natural Vegetation Mosaic",
            Self::SnowAndIce => "Snow and Ice",
            Self::Barren => "Barren or Sparsely Vegetated",
            Self::Unclassified => "Unclassified",
        }
    }

    /// Pixel value of the class in the `LC_Type1` band.
    pub fn code(self) -> u8 {
        match self {
            Self::Water => 0,
            Self::EvergreenNeedleleafForest => 1,
            Self::EvergreenBroadleafForest => 2,
            Self::DeciduousNeedleleafForest => 3,
            Self::DeciduousBroadleafForest => 4,
            Self::MixedForest => 5,
            Self::ClosedShrublands => 6,
            Self::OpenShrublands => 7,
            Self::WoodySavannas => 8,
            Self::Savannas => 9,
            Self::Grasslands => 10,
            Self::PermanentWetlands => 11,
            Self::Croplands => 12,
            Self::UrbanAndBuiltUp => 13,
            Self::CroplandNaturalVegetationMosaic => 14,
            Self::SnowAndIce => 15,
            Self::Barren => 16,
            Self::Unclassified => 254,
        }
    }

    /// Display color as a hex string without the leading `#`.
    ///
    /// Water has no entry in the color table and returns `None`.
    pub fn color(self) -> Option<&'static str> {
        let color = match self {
            Self::Water => return None,
            Self::EvergreenNeedleleafForest => "05450a",
            Self::EvergreenBroadleafForest => "086a10",
            Self::DeciduousNeedleleafForest => "54a708",
            Self::DeciduousBroadleafForest => "78d203",
            Self::MixedForest => "009900",
            Self::ClosedShrublands => "c6b044",
            Self::OpenShrublands => "dcd159",
            Self::WoodySavannas => "dade48",
            Self::Savannas => "fbff13",
            Self::Grasslands => "b6ff05",
            Self::PermanentWetlands => "27ff87",
            Self::Croplands => "c24f44",
            Self::UrbanAndBuiltUp => "a5a5a5",
            Self::CroplandNaturalVegetationMosaic => "ff6d4c",
            Self::SnowAndIce => "69fff8",
            Self::Barren => "f9ffa4",
            Self::Unclassified => "1c0dff",
        };

        Some(color)
    }

    /// Looks the class up by its label.
    pub fn from_label(label: &str) -> Result<Self, GeoLayerError> {
        Self::ALL
            .into_iter()
            .find(|class| class.label() == label)
            .ok_or_else(|| GeoLayerError::UnknownCategory(label.to_string()))
    }

    /// Classes that have a display color, paired with it, in table order.
    pub fn colored() -> impl Iterator<Item = (Self, &'static str)> {
        Self::ALL
            .into_iter()
            .filter_map(|class| class.color().map(|color| (class, color)))
    }

    /// Full palette of the classified overlay, one color per colored class.
    pub fn palette() -> Vec<String> {
        Self::colored().map(|(_, color)| color.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_expected_sizes() {
        assert_eq!(LandCoverClass::ALL.len(), 18);
        assert_eq!(LandCoverClass::colored().count(), 17);
        assert_eq!(LandCoverClass::palette().len(), 17);
    }

    #[test]
    fn labels_round_trip_through_lookup() {
        for class in LandCoverClass::ALL {
            assert_eq!(LandCoverClass::from_label(class.label()).ok(), Some(class));
        }
    }

    #[test]
    fn unclassified_is_catch_all() {
        assert_eq!(LandCoverClass::Unclassified.code(), 254);
        assert_eq!(LandCoverClass::Unclassified.color(), Some("1c0dff"));
        assert_eq!(LandCoverClass::Water.color(), None);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(matches!(
            LandCoverClass::from_label("Tundra"),
            Err(GeoLayerError::UnknownCategory(label)) if label == "Tundra"
        ));
    }
}
