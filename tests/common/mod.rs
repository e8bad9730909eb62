#![allow(dead_code)]

use quadcluster::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Item store the test can swap between regroups.
#[derive(Clone, Default)]
pub struct SharedItems(Rc<RefCell<Vec<GeoItem>>>);

impl SharedItems {
    pub fn new(items: Vec<GeoItem>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn set(&self, items: Vec<GeoItem>) {
        *self.0.borrow_mut() = items;
    }
}

impl ItemProvider for SharedItems {
    fn items(&self) -> Vec<GeoItem> {
        self.0.borrow().clone()
    }
}

#[derive(Clone)]
pub struct SharedRegions {
    visible: Rc<RefCell<Region>>,
    search: Rc<RefCell<Option<Region>>>,
}

impl SharedRegions {
    pub fn new(visible: Region, search: Option<Region>) -> Self {
        Self {
            visible: Rc::new(RefCell::new(visible)),
            search: Rc::new(RefCell::new(search)),
        }
    }

    pub fn set_visible(&self, region: Region) {
        *self.visible.borrow_mut() = region;
    }
}

impl RegionSource for SharedRegions {
    fn visible_region(&self) -> Region {
        *self.visible.borrow()
    }

    fn search_region(&self) -> Option<Region> {
        *self.search.borrow()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Appeared { identity: String, size: usize },
    Updated { identity: String, origin: Option<Point> },
    Removed { identity: String, merged_into: Option<(String, Point)> },
    ShowAll(bool),
    PinSurfaced(String),
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<Call>,
    pub tokens: Vec<CompletionToken>,
}

impl RecordingRenderer {
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl ClusterRenderer for RecordingRenderer {
    fn on_cluster_appeared(&mut self, cluster: &Cluster, token: CompletionToken) {
        self.calls.push(Call::Appeared {
            identity: cluster.identity.clone(),
            size: cluster.len(),
        });
        self.tokens.push(token);
    }

    fn on_cluster_updated(
        &mut self,
        cluster: &Cluster,
        transition_origin: Option<Point>,
        token: CompletionToken,
    ) {
        self.calls.push(Call::Updated {
            identity: cluster.identity.clone(),
            origin: transition_origin,
        });
        self.tokens.push(token);
    }

    fn on_cluster_removed(
        &mut self,
        identity: &str,
        merged_into: Option<(&str, Point)>,
        token: CompletionToken,
    ) {
        self.calls.push(Call::Removed {
            identity: identity.to_string(),
            merged_into: merged_into.map(|(target, centroid)| (target.to_string(), centroid)),
        });
        self.tokens.push(token);
    }

    fn on_show_all_markers_changed(&mut self, show_all: bool) {
        self.calls.push(Call::ShowAll(show_all));
    }

    fn on_pinned_cluster_surfaced(&mut self, cluster: &Cluster) {
        self.calls.push(Call::PinSurfaced(cluster.identity.clone()));
    }
}

pub type Harness = RegroupCoordinator<SharedItems, SharedRegions, RecordingRenderer>;

/// Signal every outstanding token, including those of re-runs triggered by
/// the completions themselves.
pub fn complete_all(coordinator: &mut Harness) {
    loop {
        let tokens = std::mem::take(&mut coordinator.renderer_mut().tokens);
        if tokens.is_empty() {
            break;
        }
        for token in tokens {
            coordinator.complete(token).expect("token from current run");
        }
    }
}

/// `count` items marching north from (lat, lon) in steps of `step` degrees.
pub fn items_along_latitude(
    prefix: &str,
    count: usize,
    lat: f64,
    lon: f64,
    step: f64,
) -> Vec<GeoItem> {
    (0..count)
        .map(|i| {
            GeoItem::new(format!("{prefix}{i}"), lat + i as f64 * step, lon)
                .expect("valid test coordinate")
        })
        .collect()
}
