//! Driving a coordinator from a render thread through `SyncCoordinator`.

use parking_lot::Mutex;
use quadcluster::prelude::*;
use quadcluster::{RegroupState, SyncCoordinator};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const NYC_LAT: f64 = 40.7128;
const NYC_LON: f64 = -74.0060;

#[derive(Clone)]
struct Viewport(Arc<Mutex<Region>>);

impl RegionSource for Viewport {
    fn visible_region(&self) -> Region {
        *self.0.lock()
    }

    fn search_region(&self) -> Option<Region> {
        None
    }
}

/// Forwards every token to the render thread.
struct ChannelRenderer(Sender<CompletionToken>);

impl ClusterRenderer for ChannelRenderer {
    fn on_cluster_appeared(&mut self, _cluster: &Cluster, token: CompletionToken) {
        let _ = self.0.send(token);
    }

    fn on_cluster_updated(&mut self, _cluster: &Cluster, _origin: Option<Point>, token: CompletionToken) {
        let _ = self.0.send(token);
    }

    fn on_cluster_removed(&mut self, _identity: &str, _merged_into: Option<(&str, Point)>, token: CompletionToken) {
        let _ = self.0.send(token);
    }
}

type Handle = SyncCoordinator<Box<dyn Fn() -> Vec<GeoItem> + Send>, Viewport, ChannelRenderer>;

fn setup(visible: Region) -> (Handle, Viewport, Receiver<CompletionToken>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let items: Vec<GeoItem> = (0..5)
        .map(|i| GeoItem::new(format!("stop{i}"), NYC_LAT + i as f64 * 0.0007, NYC_LON).unwrap())
        .collect();
    let provider: Box<dyn Fn() -> Vec<GeoItem> + Send> = Box::new(move || items.clone());
    let viewport = Viewport(Arc::new(Mutex::new(visible)));
    let (tx, rx) = mpsc::channel();

    let coordinator = CoordinatorBuilder::new()
        .max_precision(20)
        .build(provider, viewport.clone(), ChannelRenderer(tx))
        .unwrap();
    (SyncCoordinator::new(coordinator), viewport, rx)
}

/// Complete tokens until none arrive for a while.
fn spawn_render_thread(handle: Handle, rx: Receiver<CompletionToken>) -> thread::JoinHandle<usize> {
    thread::spawn(move || {
        let mut completed = 0;
        while let Ok(token) = rx.recv_timeout(Duration::from_millis(300)) {
            handle.complete(token).unwrap();
            completed += 1;
        }
        completed
    })
}

#[test]
fn test_tokens_completed_from_render_thread() {
    let wide = Region::from_degrees(NYC_LAT, NYC_LON, 2.0, 2.0);
    let (handle, viewport, rx) = setup(wide);

    assert_eq!(
        handle.request_regroup(&wide),
        RegroupOutcome::Started { run: 1, events: 1 }
    );

    let close = Region::from_degrees(NYC_LAT + 0.0014, NYC_LON, 0.005, 0.005);
    *viewport.0.lock() = close;
    assert_eq!(handle.request_regroup(&close), RegroupOutcome::Coalesced);
    assert_eq!(handle.state(), RegroupState::RunningRescheduled);

    let completed = spawn_render_thread(handle.clone(), rx).join().unwrap();

    // One appearance, then five moves and one removal for the re-run.
    assert_eq!(completed, 7);
    assert_eq!(handle.state(), RegroupState::Idle);
    let generation = handle.generation();
    assert_eq!(generation.precision, Some(20));
    assert_eq!(generation.clusters.len(), 5);
    handle.with_coordinator(|c| assert_eq!(c.outstanding_completions(), 0));
}

#[test]
fn test_generation_snapshots_survive_later_runs() {
    let wide = Region::from_degrees(NYC_LAT, NYC_LON, 2.0, 2.0);
    let (handle, viewport, rx) = setup(wide);
    let render = spawn_render_thread(handle.clone(), rx);

    handle.request_regroup(&wide);
    while handle.state() != RegroupState::Idle {
        thread::sleep(Duration::from_millis(5));
    }
    let grouped = handle.generation();

    let close = Region::from_degrees(NYC_LAT + 0.0014, NYC_LON, 0.005, 0.005);
    *viewport.0.lock() = close;
    handle.request_regroup(&close);
    render.join().unwrap();

    assert_eq!(grouped.clusters.len(), 1);
    assert_eq!(grouped.clusters[0].len(), 5);
    assert_eq!(handle.generation().clusters.len(), 5);
}
