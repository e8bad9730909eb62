//! Choosing the grouping precision from the viewport.
//!
//! The raw precision of a region is the coarsest quadkey level whose cells
//! are no wider than the region. Clustering runs `precision_delta` levels
//! finer than that (capped at the configured maximum), so each visible
//! region is covered by a handful of buckets per axis rather than one.

use crate::quadkey::{MAX_PRECISION, Precision, delta_latitude, delta_longitude};
use crate::spatial::{DistanceMetric, distance_between};
use geo::Point;
use quadcluster_types::region::Region;

/// Coarsest precision whose cell longitude delta fits within `span`.
///
/// Non-positive or non-finite spans resolve to [`MAX_PRECISION`]; spans of
/// a full globe or more resolve to 1.
///
/// # Examples
///
/// ```
/// use quadcluster::precision::precision_for_longitude_span;
///
/// assert_eq!(precision_for_longitude_span(360.0), 1);
/// assert_eq!(precision_for_longitude_span(180.0), 1);
/// assert_eq!(precision_for_longitude_span(179.0), 2);
/// assert_eq!(precision_for_longitude_span(0.0), 32);
/// ```
pub fn precision_for_longitude_span(span: f64) -> Precision {
    if !span.is_finite() || span <= 0.0 {
        return MAX_PRECISION;
    }
    (1..=MAX_PRECISION)
        .find(|&precision| delta_longitude(precision) <= span)
        .unwrap_or(MAX_PRECISION)
}

/// Precision to cluster at for a visible longitude span.
///
/// The `precision_delta` lookahead clusters finer than the raw zoom level,
/// trading marker count for stability.
pub fn clustering_precision(
    visible_span: f64,
    max_precision: Precision,
    precision_delta: Precision,
) -> Precision {
    let raw = precision_for_longitude_span(visible_span);
    max_precision.min(raw.saturating_add(precision_delta))
}

/// Raw precision of the region covered by the last full search.
pub fn search_precision(search_region: &Region) -> Precision {
    precision_for_longitude_span(search_region.span.longitude_delta)
}

/// True once the user has zoomed in far enough that clustering no longer
/// helps and every marker should be drawn individually.
///
/// # Examples
///
/// ```
/// use quadcluster::precision::should_show_all_markers_ungrouped;
///
/// assert!(!should_show_all_markers_ungrouped(10, 10, 16));
/// assert!(should_show_all_markers_ungrouped(12, 10, 16));
/// assert!(should_show_all_markers_ungrouped(18, 18, 16));
/// ```
pub fn should_show_all_markers_ungrouped(
    visible_precision_raw: Precision,
    search_precision_raw: Precision,
    max_precision: Precision,
) -> bool {
    let visible = u16::from(visible_precision_raw);
    visible > u16::from(max_precision) + 1 || visible > u16::from(search_precision_raw) + 1
}

/// Merge distance threshold at `precision`.
///
/// Measures the diagonal of one cell anchored at `reference` and scales it
/// by `aggressiveness`.
pub fn grouping_distance(
    reference: &Point,
    precision: Precision,
    aggressiveness: f64,
    metric: DistanceMetric,
) -> f64 {
    let offset = Point::new(
        reference.x() + delta_longitude(precision),
        reference.y() + delta_latitude(precision),
    );
    aggressiveness * distance_between(&offset, reference, metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_for_span() {
        assert_eq!(precision_for_longitude_span(90.0), 2);
        assert_eq!(precision_for_longitude_span(89.9), 3);
        assert_eq!(precision_for_longitude_span(1.0), 9);
        assert_eq!(precision_for_longitude_span(f64::NAN), MAX_PRECISION);
        assert_eq!(precision_for_longitude_span(-1.0), MAX_PRECISION);
        assert_eq!(precision_for_longitude_span(1e-12), MAX_PRECISION);
    }

    #[test]
    fn test_clustering_precision_applies_delta_and_cap() {
        // 1 degree span resolves at 9
        assert_eq!(clustering_precision(1.0, 16, 4), 13);
        assert_eq!(clustering_precision(1.0, 12, 4), 12);
        assert_eq!(clustering_precision(0.0001, 16, 4), 16);
        assert_eq!(clustering_precision(1.0, 16, 0), 9);
    }

    #[test]
    fn test_monotonic_in_span() {
        let spans = [0.001, 0.01, 0.1, 1.0, 10.0, 100.0, 360.0];
        for pair in spans.windows(2) {
            assert!(clustering_precision(pair[0], 16, 4) >= clustering_precision(pair[1], 16, 4));
        }
    }

    #[test]
    fn test_show_all_markers_boundaries() {
        assert!(!should_show_all_markers_ungrouped(17, 17, 16));
        assert!(should_show_all_markers_ungrouped(18, 17, 16));
        assert!(!should_show_all_markers_ungrouped(11, 10, 16));
        assert!(!should_show_all_markers_ungrouped(32, 32, 32));
    }

    #[test]
    fn test_grouping_distance_scales() {
        let center = Point::new(-74.0, 40.7);
        let full = grouping_distance(&center, 16, 1.0, DistanceMetric::Haversine);
        let partial = grouping_distance(&center, 16, 0.5, DistanceMetric::Haversine);
        assert!((partial * 2.0 - full).abs() < 1e-6);

        let finer = grouping_distance(&center, 17, 1.0, DistanceMetric::Haversine);
        assert!(finer < full);
    }
}
