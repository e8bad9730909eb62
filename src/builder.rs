//! Coordinator builder
//!
//! Collects configuration up front and validates it once, so a coordinator
//! never starts with settings it would reject at runtime.

use crate::config::GroupingConfig;
use crate::coordinator::{ClusterRenderer, ItemProvider, RegionSource, RegroupCoordinator};
use crate::error::Result;
use crate::quadkey::Precision;
use crate::spatial::DistanceMetric;

/// Builder for [`RegroupCoordinator`].
///
/// # Examples
///
/// ```rust
/// use quadcluster::{CoordinatorBuilder, Cluster, CompletionToken, GeoItem, Region};
/// use quadcluster::coordinator::{ClusterRenderer, RegionSource};
/// use geo::Point;
///
/// struct Viewport;
/// impl RegionSource for Viewport {
///     fn visible_region(&self) -> Region { Region::from_degrees(48.85, 2.35, 0.1, 0.1) }
///     fn search_region(&self) -> Option<Region> { None }
/// }
///
/// #[derive(Default)]
/// struct Markers(Vec<CompletionToken>);
/// impl ClusterRenderer for Markers {
///     fn on_cluster_appeared(&mut self, _: &Cluster, t: CompletionToken) { self.0.push(t) }
///     fn on_cluster_updated(&mut self, _: &Cluster, _: Option<Point>, t: CompletionToken) { self.0.push(t) }
///     fn on_cluster_removed(&mut self, _: &str, _: Option<(&str, Point)>, t: CompletionToken) { self.0.push(t) }
/// }
///
/// let items = || vec![GeoItem::new("Louvre", 48.8606, 2.3376).unwrap()];
/// let mut coordinator = CoordinatorBuilder::new()
///     .max_precision(18)
///     .aggressiveness(0.5)
///     .build(items, Viewport, Markers::default())?;
///
/// coordinator.request_regroup(&Viewport.visible_region());
/// assert_eq!(coordinator.generation().clusters.len(), 1);
/// # Ok::<(), quadcluster::ClusterError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoordinatorBuilder {
    config: GroupingConfig,
    pinned: Option<String>,
}

impl CoordinatorBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GroupingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_precision(mut self, max_precision: Precision) -> Self {
        self.config = self.config.with_max_precision(max_precision);
        self
    }

    pub fn precision_delta(mut self, precision_delta: Precision) -> Self {
        self.config = self.config.with_precision_delta(precision_delta);
        self
    }

    pub fn aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.config = self.config.with_aggressiveness(aggressiveness);
        self
    }

    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.config = self.config.with_distance_metric(metric);
        self
    }

    /// Start with an item pinned as an ungrouped singleton.
    pub fn pinned_item(mut self, key: impl Into<String>) -> Self {
        self.pinned = Some(key.into());
        self
    }

    /// Validate the configuration and build the coordinator.
    pub fn build<P, S, R>(
        self,
        provider: P,
        regions: S,
        renderer: R,
    ) -> Result<RegroupCoordinator<P, S, R>>
    where
        P: ItemProvider,
        S: RegionSource,
        R: ClusterRenderer,
    {
        self.config.validate()?;
        let mut coordinator =
            RegroupCoordinator::with_config(provider, regions, renderer, self.config);
        coordinator.set_pinned_item(self.pinned);
        Ok(coordinator)
    }
}
