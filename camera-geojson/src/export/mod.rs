//! Export GeoJSON

pub mod geojson;

pub use self::geojson::{write_geojson, FeatureBuilder};
