//! Incremental quadkey clustering of geo-located items for map display.
//!
//! Items are bucketed by quadkey at a precision derived from the viewport,
//! adjacent buckets are merged by distance, and each new cluster set is
//! diffed against the previous one so that a renderer can animate between
//! them instead of popping markers in and out.
//!
//! ```rust
//! use quadcluster::{GeoItem, DistanceMetric};
//! use quadcluster::compute::{cluster_items, ClusteringParams};
//! use quadcluster::precision::{clustering_precision, grouping_distance};
//! use geo::Point;
//!
//! let items = vec![
//!     GeoItem::new("Brooklyn_Bridge", 40.7061, -73.9969)?,
//!     GeoItem::new("Manhattan_Bridge", 40.7075, -73.9908)?,
//!     GeoItem::new("Golden_Gate_Bridge", 37.8199, -122.4783)?,
//! ];
//!
//! let precision = clustering_precision(60.0, 16, 4);
//! let params = ClusteringParams {
//!     precision,
//!     grouping_distance: grouping_distance(&Point::new(-95.0, 39.0), precision, 0.67, DistanceMetric::Haversine),
//!     pinned: None,
//!     metric: DistanceMetric::Haversine,
//! };
//! let clusters = cluster_items(&items, &params);
//! assert_eq!(clusters.len(), 2);
//! # Ok::<(), quadcluster::ClusterError>(())
//! ```

pub mod builder;
pub mod cluster;
pub mod compute;
pub mod config;
pub mod coordinator;
pub mod diff;
pub mod error;
pub mod precision;
pub mod quadkey;
pub mod spatial;

#[cfg(feature = "sync")]
pub mod sync;

pub use builder::CoordinatorBuilder;
pub use cluster::{Cluster, GeoItem};
pub use config::GroupingConfig;
pub use coordinator::{
    ClusterRenderer, CompletionToken, Generation, ItemProvider, RegionSource, RegroupCoordinator,
    RegroupOutcome, RegroupState,
};
pub use diff::{ClusterEvent, Transition, diff_generations};
pub use error::{ClusterError, Result};
pub use quadkey::{MAX_PRECISION, Precision, QuadKey};
pub use spatial::DistanceMetric;

#[cfg(feature = "sync")]
pub use sync::SyncCoordinator;

pub use geo::Point;
pub use quadcluster_types::region::{Region, Span};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        Cluster, ClusterError, ClusterEvent, ClusterRenderer, CompletionToken, CoordinatorBuilder,
        GeoItem, GroupingConfig, ItemProvider, Region, RegionSource, RegroupCoordinator,
        RegroupOutcome, Result,
    };

    pub use geo::Point;
}
