//! Quadkey bucketing and neighbor merge.
//!
//! One clustering pass works in two steps:
//!
//! 1. Every item lands in the bucket of its quadkey truncated to the active
//!    precision. The pinned item gets a bucket of its own that is not
//!    registered under any cell, so no other item or neighbor probe can
//!    reach it.
//! 2. Buckets are visited in anchor order. Each one probes the 8 surrounding
//!    cells (and its own, since the centroid may have drifted) by offsetting
//!    its centroid one cell along each axis and re-truncating. Geographic
//!    offsets are used instead of bit tricks because bit adjacency of
//!    quadkeys breaks down at quadrant boundaries.

use crate::cluster::{Cluster, GeoItem};
use crate::compute::validation::validate_geographic_point;
use crate::quadkey::{Precision, QuadKey, delta_latitude, delta_longitude};
use crate::spatial::{DistanceMetric, distance_between};
use geo::Point;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Inputs of one clustering pass.
#[derive(Debug, Clone, Copy)]
pub struct ClusteringParams<'a> {
    /// Quadkey depth buckets are formed at
    pub precision: Precision,
    /// Centroids closer than this merge (meters for geographic metrics)
    pub grouping_distance: f64,
    /// Key of the item that must stay a singleton
    pub pinned: Option<&'a str>,
    pub metric: DistanceMetric,
}

/// Working state for a group while the pass is running.
#[derive(Debug, Default)]
struct ClusterCandidate {
    /// Indices into the input slice
    members: SmallVec<[usize; 4]>,
    latitude_sum: f64,
    longitude_sum: f64,
    anchor: QuadKey,
    /// Cells of buckets merged into this one
    absorbed: SmallVec<[QuadKey; 2]>,
    holds_pinned: bool,
    alive: bool,
}

impl ClusterCandidate {
    fn new(anchor: QuadKey) -> Self {
        Self {
            anchor,
            alive: true,
            ..Default::default()
        }
    }

    fn push(&mut self, index: usize, item: &GeoItem, pinned: bool) {
        self.members.push(index);
        self.latitude_sum += item.latitude();
        self.longitude_sum += item.longitude();
        self.holds_pinned |= pinned;
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn centroid(&self) -> Point {
        let count = self.members.len() as f64;
        Point::new(self.longitude_sum / count, self.latitude_sum / count)
    }
}

/// Group `items` into clusters.
///
/// Items with invalid coordinates and repeated keys are skipped (and
/// logged); every other item ends up in exactly one cluster. An empty input
/// yields no clusters.
///
/// # Examples
///
/// ```
/// use quadcluster::{GeoItem, DistanceMetric};
/// use quadcluster::compute::{cluster_items, ClusteringParams};
///
/// let items: Vec<GeoItem> = (0..5)
///     .map(|i| GeoItem::new(format!("item{i}"), 40.7128 + i as f64 * 1e-6, -74.0060).unwrap())
///     .collect();
///
/// let params = ClusteringParams {
///     precision: 16,
///     grouping_distance: 300.0,
///     pinned: None,
///     metric: DistanceMetric::Haversine,
/// };
/// let clusters = cluster_items(&items, &params);
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].len(), 5);
/// ```
pub fn cluster_items(items: &[GeoItem], params: &ClusteringParams<'_>) -> Vec<Cluster> {
    let (mut candidates, mut owners) = bucket_items(items, params);
    let bucket_count = candidates.len();

    merge_neighbors(&mut candidates, &mut owners, params);

    let mut survivors: Vec<ClusterCandidate> =
        candidates.into_iter().filter(|c| c.alive).collect();
    survivors.sort_by_key(|c| c.anchor);

    let clusters: Vec<Cluster> = survivors
        .iter()
        .map(|candidate| {
            let members = candidate
                .members
                .iter()
                .map(|&idx| items[idx].clone())
                .collect();
            Cluster::new(members, candidate.centroid())
        })
        .collect();

    log::debug!(
        "clustered {} items from {} buckets into {} clusters at precision {}",
        items.len(),
        bucket_count,
        clusters.len(),
        params.precision
    );
    clusters
}

fn bucket_items(
    items: &[GeoItem],
    params: &ClusteringParams<'_>,
) -> (Vec<ClusterCandidate>, FxHashMap<QuadKey, usize>) {
    let mut candidates: Vec<ClusterCandidate> = Vec::new();
    let mut owners: FxHashMap<QuadKey, usize> = FxHashMap::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (idx, item) in items.iter().enumerate() {
        if let Err(e) = validate_geographic_point(&item.coordinate) {
            log::warn!("Skipping item '{}' for this pass: {}", item.key, e);
            continue;
        }
        if !seen.insert(item.key.as_str()) {
            log::warn!("Skipping duplicate item key '{}'", item.key);
            continue;
        }

        // The pinned item never owns a cell: on a grid corner its full key
        // equals the truncated anchor of the surrounding bucket.
        if params.pinned == Some(item.key.as_str()) {
            let mut single = ClusterCandidate::new(item.quad_key);
            single.push(idx, item, true);
            candidates.push(single);
            continue;
        }

        let anchor = item.quad_key.truncate(params.precision);
        let slot = *owners.entry(anchor).or_insert_with(|| {
            candidates.push(ClusterCandidate::new(anchor));
            candidates.len() - 1
        });
        candidates[slot].push(idx, item, false);
    }

    (candidates, owners)
}

fn merge_neighbors(
    candidates: &mut [ClusterCandidate],
    owners: &mut FxHashMap<QuadKey, usize>,
    params: &ClusteringParams<'_>,
) {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&idx| candidates[idx].anchor);

    for current in order {
        if !candidates[current].alive {
            continue;
        }
        loop {
            let mut merged = false;
            for cell in neighbor_cells(&candidates[current].centroid(), params.precision) {
                let Some(&other) = owners.get(&cell) else {
                    continue;
                };
                if other == current || !candidates[other].alive {
                    continue;
                }
                if should_merge(&candidates[current], &candidates[other], params) {
                    absorb(candidates, owners, current, other);
                    merged = true;
                }
            }
            // The centroid moved; probe again from the new position
            if !merged {
                break;
            }
        }
    }
}

fn should_merge(a: &ClusterCandidate, b: &ClusterCandidate, params: &ClusteringParams<'_>) -> bool {
    if a.holds_pinned || b.holds_pinned {
        return false;
    }
    if a.len() < 2 && b.len() < 2 {
        return false;
    }
    distance_between(&a.centroid(), &b.centroid(), params.metric) < params.grouping_distance
}

fn absorb(
    candidates: &mut [ClusterCandidate],
    owners: &mut FxHashMap<QuadKey, usize>,
    survivor: usize,
    absorbed: usize,
) {
    let (members, cells, latitude_sum, longitude_sum) = {
        let donor = &mut candidates[absorbed];
        donor.alive = false;
        let mut cells = std::mem::take(&mut donor.absorbed);
        cells.push(donor.anchor);
        (
            std::mem::take(&mut donor.members),
            cells,
            donor.latitude_sum,
            donor.longitude_sum,
        )
    };

    log::trace!(
        "merging {} cell(s) with {} items into bucket {}",
        cells.len(),
        members.len(),
        candidates[survivor].anchor
    );

    for cell in &cells {
        owners.insert(*cell, survivor);
    }

    let target = &mut candidates[survivor];
    target.members.extend(members);
    target.latitude_sum += latitude_sum;
    target.longitude_sum += longitude_sum;
    target.absorbed.extend(cells);
}

/// Cells one step away from `center` in every direction, plus its own cell.
fn neighbor_cells(center: &Point, precision: Precision) -> SmallVec<[QuadKey; 9]> {
    let d_lat = delta_latitude(precision);
    let d_lon = delta_longitude(precision);
    let mut cells = SmallVec::new();
    for t in -1..=1 {
        for n in -1..=1 {
            let latitude = center.y() + f64::from(t) * d_lat;
            let longitude = center.x() + f64::from(n) * d_lon;
            if let Some(key) = QuadKey::from_coordinate_wrapped(latitude, longitude) {
                let cell = key.truncate(precision);
                if !cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
    }
    cells
}
