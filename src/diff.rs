//! Generation-to-generation diffing.
//!
//! Compares a freshly computed cluster set with the previous one and decides,
//! per cluster, how the renderer should get from the old picture to the new
//! one. Unchanged identities are kept as they are; everything else becomes a
//! [`ClusterEvent`].

use crate::cluster::Cluster;
use geo::Point;
use rustc_hash::FxHashMap;

/// Lifecycle instruction for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterEvent {
    /// A cluster with no usable predecessor
    Appeared(Cluster),
    /// A cluster that continues an earlier placement and should animate from `origin`
    MovedFrom { cluster: Cluster, origin: Point },
    /// A previous cluster whose members were folded into a larger new cluster
    RemovedViaMergeInto {
        identity: String,
        target: String,
        target_centroid: Point,
    },
    /// A previous cluster with no continuation
    Removed { identity: String },
}

impl ClusterEvent {
    /// Identity of the cluster this event is about.
    pub fn identity(&self) -> &str {
        match self {
            ClusterEvent::Appeared(cluster) => &cluster.identity,
            ClusterEvent::MovedFrom { cluster, .. } => &cluster.identity,
            ClusterEvent::RemovedViaMergeInto { identity, .. } => identity,
            ClusterEvent::Removed { identity } => identity,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            ClusterEvent::RemovedViaMergeInto { .. } | ClusterEvent::Removed { .. }
        )
    }
}

/// Outcome of diffing two generations.
#[derive(Debug, Clone, Default)]
pub struct Transition {
    /// The new generation, with transition origins filled in
    pub clusters: Vec<Cluster>,
    /// Ordered renderer instructions
    pub events: Vec<ClusterEvent>,
    /// Identities present in both generations
    pub retained: Vec<String>,
}

/// Diff `next` against `previous`.
///
/// Rules, applied to each new cluster in order:
///
/// - same identity as a previous cluster: retained, no event;
/// - singleton whose item sat in a previous cluster: moves from that
///   cluster's centroid, and the previous cluster is removed at the end;
/// - multi-item cluster: every smaller previous cluster one of its members
///   came from is removed by merging into it; the first equal-or-larger
///   previous cluster lends its centroid as the transition origin;
/// - anything else appears fresh.
///
/// Previous clusters nobody claimed are removed last, in their original order.
///
/// # Examples
///
/// ```
/// use quadcluster::{Cluster, GeoItem};
/// use quadcluster::diff::{diff_generations, ClusterEvent};
/// use geo::Point;
///
/// let a = GeoItem::new("a", 1.0, 1.0).unwrap();
/// let b = GeoItem::new("b", 1.0, 1.1).unwrap();
///
/// let grouped = Cluster::new(vec![a.clone(), b.clone()], Point::new(1.05, 1.0));
/// let split = vec![
///     Cluster::new(vec![a], Point::new(1.0, 1.0)),
///     Cluster::new(vec![b], Point::new(1.1, 1.0)),
/// ];
///
/// let transition = diff_generations(&[grouped], split);
/// assert!(matches!(transition.events[0], ClusterEvent::MovedFrom { .. }));
/// assert!(matches!(transition.events[2], ClusterEvent::Removed { .. }));
/// ```
pub fn diff_generations(previous: &[Cluster], next: Vec<Cluster>) -> Transition {
    let mut pending_removal: FxHashMap<&str, usize> = previous
        .iter()
        .enumerate()
        .map(|(idx, cluster)| (cluster.identity.as_str(), idx))
        .collect();
    let mut previous_by_member: FxHashMap<&str, usize> = FxHashMap::default();
    for (idx, cluster) in previous.iter().enumerate() {
        for key in cluster.keys() {
            previous_by_member.insert(key, idx);
        }
    }

    let mut clusters = next;
    let mut events = Vec::with_capacity(clusters.len() + previous.len());
    let mut retained = Vec::new();

    for cluster in clusters.iter_mut() {
        if pending_removal.remove(cluster.identity.as_str()).is_some() {
            retained.push(cluster.identity.clone());
            continue;
        }

        if cluster.is_singleton() {
            if let Some(&idx) = previous_by_member.get(cluster.members[0].key.as_str()) {
                cluster.transition_origin = Some(previous[idx].centroid);
            }
        } else {
            let size = cluster.len();
            let mut origin = None;
            for key in cluster.keys() {
                let Some(&idx) = previous_by_member.get(key) else {
                    continue;
                };
                let prior = &previous[idx];
                if prior.len() < size {
                    if pending_removal.remove(prior.identity.as_str()).is_some() {
                        events.push(ClusterEvent::RemovedViaMergeInto {
                            identity: prior.identity.clone(),
                            target: cluster.identity.clone(),
                            target_centroid: cluster.centroid,
                        });
                    }
                } else if origin.is_none() {
                    origin = Some(prior.centroid);
                }
            }
            cluster.transition_origin = origin;
        }

        events.push(match cluster.transition_origin {
            Some(origin) => ClusterEvent::MovedFrom {
                cluster: cluster.clone(),
                origin,
            },
            None => ClusterEvent::Appeared(cluster.clone()),
        });
    }

    for prior in previous {
        if pending_removal.contains_key(prior.identity.as_str()) {
            events.push(ClusterEvent::Removed {
                identity: prior.identity.clone(),
            });
        }
    }

    log::debug!(
        "diffed {} previous against {} new clusters: {} retained, {} events",
        previous.len(),
        clusters.len(),
        retained.len(),
        events.len()
    );

    Transition {
        clusters,
        events,
        retained,
    }
}
