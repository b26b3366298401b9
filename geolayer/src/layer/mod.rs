//! Layer vocabulary: tokens, kinds and the land cover tables they refer to.

pub mod land_cover;
pub mod token;

pub use land_cover::LandCoverClass;
pub use token::{LayerKind, LayerToken};
