//! Computation layer: coordinate validation and the clustering pass.

pub mod clustering;
pub mod validation;

pub use clustering::{ClusteringParams, cluster_items};
pub use validation::{validate_coordinate, validate_geographic_point};
