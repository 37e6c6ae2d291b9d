//! GeoJSON feature builder
//!
//! Every geopoint, geotrace and geoshape value of the exported submissions
//! becomes one [`Feature`]. Empty and invalid values are kept as features
//! without geometry so that the document accounts for every occurrence.

pub mod builder;
pub mod feature;

pub use builder::{build_features, write_geojson};
pub use feature::{Feature, FeatureCollection, FeatureProperties, Geometry, Point};
