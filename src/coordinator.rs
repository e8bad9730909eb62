//! Regroup coordination.
//!
//! The [`RegroupCoordinator`] owns the previous generation and serializes
//! regroups against the renderer's asynchronous presentation work. Each
//! lifecycle callback carries a [`CompletionToken`]; the run stays in flight
//! until every token has been handed back through
//! [`RegroupCoordinator::complete`]. Requests that arrive meanwhile collapse
//! into a single re-run that reads the then-current region.
//!
//! ```text
//! Idle --request--> Running --request--> RunningRescheduled
//!   ^                  |                        |
//!   +--last token------+        last token: run again with current region
//! ```

use crate::cluster::{Cluster, GeoItem};
use crate::compute::{ClusteringParams, cluster_items};
use crate::config::GroupingConfig;
use crate::diff::{ClusterEvent, diff_generations};
use crate::error::{ClusterError, Result};
use crate::precision::{
    clustering_precision, grouping_distance, precision_for_longitude_span, search_precision,
    should_show_all_markers_ungrouped,
};
use crate::quadkey::Precision;
use geo::Point;
use quadcluster_types::region::Region;
use std::sync::Arc;

/// Supplies the items currently in scope.
pub trait ItemProvider {
    /// Items to cluster, already filtered and ordered by the owning store.
    fn items(&self) -> Vec<GeoItem>;
}

impl<F> ItemProvider for F
where
    F: Fn() -> Vec<GeoItem>,
{
    fn items(&self) -> Vec<GeoItem> {
        self()
    }
}

/// Supplies the viewport and the region of the last full search.
pub trait RegionSource {
    fn visible_region(&self) -> Region;

    /// Region covered by the last full search, if any. When absent the
    /// visible region stands in for it.
    fn search_region(&self) -> Option<Region>;
}

/// Presentation layer driven by the coordinator.
///
/// Every lifecycle callback receives a token that must eventually be passed
/// to [`RegroupCoordinator::complete`], typically once the corresponding
/// animation has finished. Tokens cannot be signalled from inside the
/// callback itself; queue them and signal afterwards.
pub trait ClusterRenderer {
    fn on_cluster_appeared(&mut self, cluster: &Cluster, token: CompletionToken);

    fn on_cluster_updated(
        &mut self,
        cluster: &Cluster,
        transition_origin: Option<Point>,
        token: CompletionToken,
    );

    /// `merged_into` carries the identity and centroid of the cluster that
    /// absorbed this one; the old marker should fade out at that centroid.
    fn on_cluster_removed(
        &mut self,
        identity: &str,
        merged_into: Option<(&str, Point)>,
        token: CompletionToken,
    );

    /// Individual markers should (or should no longer) be drawn uncollapsed.
    fn on_show_all_markers_changed(&mut self, _show_all: bool) {}

    /// The pinned item's singleton is on screen and can be selected. The
    /// renderer answers with [`RegroupCoordinator::acknowledge_pinned_surfaced`].
    fn on_pinned_cluster_surfaced(&mut self, _cluster: &Cluster) {}
}

/// Proof of one outstanding presentation step.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a completion token must be handed back to the coordinator"]
pub struct CompletionToken {
    run: u64,
}

impl CompletionToken {
    /// Run this token belongs to.
    pub fn run(&self) -> u64 {
        self.run
    }
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegroupState {
    Idle,
    Running,
    /// Running, with another run owed once the current one completes
    RunningRescheduled,
}

/// What a regroup request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegroupOutcome {
    /// A run was computed and its events handed to the renderer
    Started { run: u64, events: usize },
    /// The precision did not change and nothing was invalidated
    Skipped,
    /// A run is in flight; one more will follow when it completes
    Coalesced,
}

/// Snapshot of the last completed computation.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub clusters: Vec<Cluster>,
    /// Precision the clusters were computed at; `None` before the first run
    pub precision: Option<Precision>,
    pub show_all_markers: bool,
}

impl Generation {
    pub fn cluster(&self, identity: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.identity == identity)
    }

    pub fn cluster_containing(&self, key: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(key))
    }
}

/// Serializes regroups and turns them into renderer lifecycle calls.
pub struct RegroupCoordinator<P, S, R> {
    config: GroupingConfig,
    provider: P,
    regions: S,
    renderer: R,
    generation: Arc<Generation>,
    state: RegroupState,
    run_id: u64,
    outstanding: usize,
    pinned: Option<String>,
    pin_surfaced: bool,
    invalidated: bool,
    show_all_markers: bool,
}

impl<P, S, R> RegroupCoordinator<P, S, R>
where
    P: ItemProvider,
    S: RegionSource,
    R: ClusterRenderer,
{
    /// Create a coordinator with the default configuration.
    pub fn new(provider: P, regions: S, renderer: R) -> Self {
        Self::with_config(provider, regions, renderer, GroupingConfig::default())
    }

    pub(crate) fn with_config(
        provider: P,
        regions: S,
        renderer: R,
        config: GroupingConfig,
    ) -> Self {
        Self {
            config,
            provider,
            regions,
            renderer,
            generation: Arc::new(Generation::default()),
            state: RegroupState::Idle,
            run_id: 0,
            outstanding: 0,
            pinned: None,
            pin_surfaced: false,
            invalidated: true,
            show_all_markers: false,
        }
    }

    /// Ask for a regroup of `visible`.
    ///
    /// While a run is in flight the request only marks that another run is
    /// needed; `visible` is discarded and the re-run reads the region source.
    pub fn request_regroup(&mut self, visible: &Region) -> RegroupOutcome {
        match self.state {
            RegroupState::Idle => self.run(visible),
            RegroupState::Running | RegroupState::RunningRescheduled => {
                if self.state == RegroupState::Running {
                    log::debug!("regroup requested during run {}, rescheduling", self.run_id);
                }
                self.state = RegroupState::RunningRescheduled;
                RegroupOutcome::Coalesced
            }
        }
    }

    /// Hand back a token received by the renderer.
    ///
    /// # Errors
    ///
    /// `ClusterError::StaleCompletion` if the token does not belong to the
    /// run in flight.
    pub fn complete(&mut self, token: CompletionToken) -> Result<()> {
        if self.state == RegroupState::Idle || token.run != self.run_id || self.outstanding == 0 {
            let current_run = (self.state != RegroupState::Idle).then_some(self.run_id);
            log::warn!(
                "Ignoring completion for run {} (current run: {:?})",
                token.run,
                current_run
            );
            return Err(ClusterError::StaleCompletion {
                token_run: token.run,
                current_run,
            });
        }

        self.outstanding -= 1;
        if self.outstanding == 0 {
            self.finish_run();
        }
        Ok(())
    }

    /// Replace the configuration. Invalid configurations are rejected and
    /// the current one stays in effect.
    pub fn set_config(&mut self, config: GroupingConfig) -> Result<()> {
        if let Err(e) = config.validate() {
            log::warn!("Keeping previous grouping configuration: {}", e);
            return Err(e);
        }
        self.config = config;
        self.invalidate();
        Ok(())
    }

    /// Pin (or unpin) the item that must stay an ungrouped singleton.
    pub fn set_pinned_item(&mut self, key: Option<String>) {
        if self.pinned == key {
            return;
        }
        self.pinned = key;
        self.pin_surfaced = false;
        self.invalidate();
    }

    /// The renderer has shown (and selected) the pinned singleton; the pin
    /// is released. Returns false if `identity` is not the pinned item.
    pub fn acknowledge_pinned_surfaced(&mut self, identity: &str) -> bool {
        if self.pin_surfaced && self.pinned.as_deref() == Some(identity) {
            log::debug!("pinned item '{}' acknowledged, releasing pin", identity);
            self.pinned = None;
            self.pin_surfaced = false;
            true
        } else {
            false
        }
    }

    /// Force the next request to recompute even at an unchanged precision,
    /// e.g. after the item set changed.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn state(&self) -> RegroupState {
        self.state
    }

    /// Last completed generation. Cheap to clone and never mutated.
    pub fn generation(&self) -> Arc<Generation> {
        Arc::clone(&self.generation)
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    pub fn pinned_item(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    pub fn outstanding_completions(&self) -> usize {
        self.outstanding
    }

    pub fn show_all_markers(&self) -> bool {
        self.show_all_markers
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn region_source_mut(&mut self) -> &mut S {
        &mut self.regions
    }

    fn run(&mut self, visible: &Region) -> RegroupOutcome {
        let search = self
            .regions
            .search_region()
            .filter(|region| !region.is_empty())
            .unwrap_or(*visible);
        self.update_show_all_markers(visible, &search);

        let precision = clustering_precision(
            visible.span.longitude_delta,
            self.config.max_precision,
            self.config.precision_delta,
        );
        if !self.invalidated && self.generation.precision == Some(precision) {
            log::debug!("precision {} unchanged, skipping regroup", precision);
            return RegroupOutcome::Skipped;
        }

        self.state = RegroupState::Running;
        self.invalidated = false;
        self.run_id += 1;

        let items = if visible.is_empty() {
            Vec::new()
        } else {
            self.provider.items()
        };
        let threshold = grouping_distance(
            &search.center,
            precision,
            self.config.aggressiveness,
            self.config.distance_metric,
        );
        let params = ClusteringParams {
            precision,
            grouping_distance: threshold,
            pinned: self.pinned.as_deref(),
            metric: self.config.distance_metric,
        };
        let clusters = cluster_items(&items, &params);
        let transition = diff_generations(&self.generation.clusters, clusters);

        self.generation = Arc::new(Generation {
            clusters: transition.clusters,
            precision: Some(precision),
            show_all_markers: self.show_all_markers,
        });

        let run = self.run_id;
        let events = transition.events.len();
        log::debug!(
            "run {}: precision {}, {} items, {} clusters, {} events",
            run,
            precision,
            items.len(),
            self.generation.clusters.len(),
            events
        );

        self.outstanding += events;
        for event in transition.events {
            self.emit(event);
        }
        self.surface_pinned();

        if self.outstanding == 0 {
            self.finish_run();
        }
        RegroupOutcome::Started { run, events }
    }

    fn emit(&mut self, event: ClusterEvent) {
        let token = CompletionToken { run: self.run_id };
        match event {
            ClusterEvent::Appeared(cluster) => self.renderer.on_cluster_appeared(&cluster, token),
            ClusterEvent::MovedFrom { cluster, origin } => {
                self.renderer
                    .on_cluster_updated(&cluster, Some(origin), token)
            }
            ClusterEvent::RemovedViaMergeInto {
                identity,
                target,
                target_centroid,
            } => self.renderer.on_cluster_removed(
                &identity,
                Some((&target, target_centroid)),
                token,
            ),
            ClusterEvent::Removed { identity } => {
                self.renderer.on_cluster_removed(&identity, None, token)
            }
        }
    }

    fn surface_pinned(&mut self) {
        if self.pin_surfaced {
            return;
        }
        let Some(key) = self.pinned.as_deref() else {
            return;
        };
        let generation = Arc::clone(&self.generation);
        if let Some(cluster) = generation
            .clusters
            .iter()
            .find(|c| c.is_singleton() && c.contains(key))
        {
            self.pin_surfaced = true;
            self.renderer.on_pinned_cluster_surfaced(cluster);
        }
    }

    fn update_show_all_markers(&mut self, visible: &Region, search: &Region) {
        let show_all = should_show_all_markers_ungrouped(
            precision_for_longitude_span(visible.span.longitude_delta),
            search_precision(search),
            self.config.max_precision,
        );
        if show_all != self.show_all_markers {
            log::debug!("show all markers: {}", show_all);
            self.show_all_markers = show_all;
            self.renderer.on_show_all_markers_changed(show_all);
        }
    }

    fn finish_run(&mut self) {
        let rescheduled = self.state == RegroupState::RunningRescheduled;
        self.state = RegroupState::Idle;
        if rescheduled {
            let region = self.regions.visible_region();
            log::debug!("run {} finished, running rescheduled regroup", self.run_id);
            self.run(&region);
        }
    }
}
