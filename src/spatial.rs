//! Spatial helpers built on the geo crate.
//!
//! Distance metrics for the merge test, plus the region arithmetic a map
//! screen needs around the grouping pass: how large a search to issue for a
//! viewport, when the viewport has drifted far enough from the last search
//! to offer a new one, and which region fits a cluster's members.

use crate::cluster::GeoItem;
use geo::{BoundingRect, Distance, Euclidean, Geodesic, Haversine, Point, Rhumb};
use quadcluster_types::region::{Region, Span};
use serde::{Deserialize, Serialize};

/// Distance metrics for spatial calculations.
///
/// - **Haversine**: Fast spherical distance, good for most lon/lat calculations
/// - **Geodesic**: More accurate ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: Constant bearing distance
/// - **Euclidean**: Planar distance, only for projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Haversine formula - assumes spherical Earth, fast and accurate enough for most uses
    #[default]
    Haversine,
    /// Geodesic distance using Karney (2013)
    Geodesic,
    /// Rhumb line (loxodrome) - maintains constant bearing
    Rhumb,
    /// Euclidean distance - for planar/projected coordinates only
    Euclidean,
}

/// Zoom/pan ratio outside of which a new search is worth offering.
const SEARCH_REFRESH_MAX_RATIO: f64 = 1.33;
const SEARCH_REFRESH_MIN_RATIO: f64 = 0.67;
/// Center drift, as a fraction of the searched region's smaller side.
const SEARCH_REFRESH_MAX_DRIFT: f64 = 0.33;

const FIT_PADDING: f64 = 1.2;
const FIT_MIN_SPAN_DEGREES: f64 = 0.01;

/// Calculate the distance between two points using the specified metric.
///
/// # Returns
///
/// Distance in meters (or coordinate units for `Euclidean`)
///
/// # Examples
///
/// ```rust
/// use quadcluster::spatial::{distance_between, DistanceMetric};
/// use geo::Point;
///
/// let nyc = Point::new(-74.0060, 40.7128);
/// let la = Point::new(-118.2437, 34.0522);
///
/// let dist = distance_between(&nyc, &la, DistanceMetric::Haversine);
/// assert!(dist > 3_900_000.0); // ~3,944 km
/// ```
pub fn distance_between(point1: &Point, point2: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
        DistanceMetric::Rhumb => Rhumb.distance(*point1, *point2),
        DistanceMetric::Euclidean => Euclidean.distance(*point1, *point2),
    }
}

/// Radius in meters of the circular search that covers a region.
///
/// Averages the region's width and height and halves the result, rounded
/// to the meter.
pub fn search_radius(region: &Region) -> f64 {
    (0.25 * (region.width_meters() + region.height_meters())).round()
}

/// Whether the visible region has moved or zoomed far enough away from the
/// region of the last full search that results may be stale.
///
/// # Examples
///
/// ```rust
/// use quadcluster::spatial::should_offer_search_refresh;
/// use quadcluster::Region;
///
/// let searched = Region::from_degrees(40.0, -74.0, 0.1, 0.1);
/// assert!(!should_offer_search_refresh(&searched, &searched));
///
/// let zoomed_out = Region::from_degrees(40.0, -74.0, 0.3, 0.3);
/// assert!(should_offer_search_refresh(&zoomed_out, &searched));
/// ```
pub fn should_offer_search_refresh(visible: &Region, searched: &Region) -> bool {
    let search_width = searched.width_meters();
    let search_height = searched.height_meters();
    let search_min_dimension = search_width.min(search_height);
    if search_min_dimension <= 0.0 {
        return !visible.is_empty();
    }

    let width_ratio = visible.width_meters() / search_width;
    let height_ratio = visible.height_meters() / search_height;
    let ratio = width_ratio.min(height_ratio);

    let drift = Haversine.distance(visible.center, searched.center);

    ratio > SEARCH_REFRESH_MAX_RATIO
        || ratio < SEARCH_REFRESH_MIN_RATIO
        || drift / search_min_dimension > SEARCH_REFRESH_MAX_DRIFT
}

/// Region that fits all of the given items, padded so that markers on the
/// edge stay visible. Returns `None` for an empty slice.
///
/// # Examples
///
/// ```rust
/// use quadcluster::GeoItem;
/// use quadcluster::spatial::region_fitting;
///
/// let items = vec![
///     GeoItem::new("a", 40.70, -74.02).unwrap(),
///     GeoItem::new("b", 40.80, -73.92).unwrap(),
/// ];
/// let region = region_fitting(&items).unwrap();
/// assert!((region.latitude() - 40.75).abs() < 1e-9);
/// assert!(region.span.latitude_delta > 0.1);
/// ```
pub fn region_fitting(items: &[GeoItem]) -> Option<Region> {
    if items.is_empty() {
        return None;
    }
    let points: Vec<Point> = items.iter().map(|item| item.coordinate).collect();
    let rect = geo::MultiPoint::new(points).bounding_rect()?;
    let center = rect.center();

    let span = Span::new(
        (rect.height() * FIT_PADDING)
            .max(FIT_MIN_SPAN_DEGREES)
            .min(180.0),
        (rect.width() * FIT_PADDING)
            .max(FIT_MIN_SPAN_DEGREES)
            .min(360.0),
    );
    Some(Region::new(Point::from(center), span))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_between() {
        let p1 = Point::new(-74.0060, 40.7128); // NYC
        let p2 = Point::new(-118.2437, 34.0522); // LA

        let dist_haversine = distance_between(&p1, &p2, DistanceMetric::Haversine);
        let dist_geodesic = distance_between(&p1, &p2, DistanceMetric::Geodesic);

        assert!(dist_haversine > 3_900_000.0 && dist_haversine < 4_000_000.0);
        assert!(dist_geodesic > 3_900_000.0 && dist_geodesic < 4_000_000.0);

        let diff = (dist_haversine - dist_geodesic).abs();
        assert!(diff < 10_000.0);
    }

    #[test]
    fn test_search_radius() {
        let region = Region::from_degrees(0.0, 0.0, 1.0, 1.0);
        let radius = search_radius(&region);
        // Half of ~111 km
        assert!(radius > 55_000.0 && radius < 56_000.0);
        assert_eq!(radius, radius.round());
    }

    #[test]
    fn test_search_refresh_on_zoom() {
        let searched = Region::from_degrees(40.0, -74.0, 0.1, 0.1);
        let zoomed_in = Region::from_degrees(40.0, -74.0, 0.05, 0.05);
        let slightly = Region::from_degrees(40.0, -74.0, 0.11, 0.11);

        assert!(should_offer_search_refresh(&zoomed_in, &searched));
        assert!(!should_offer_search_refresh(&slightly, &searched));
    }

    #[test]
    fn test_search_refresh_on_pan() {
        let searched = Region::from_degrees(40.0, -74.0, 0.1, 0.1);
        let nudged = Region::from_degrees(40.01, -74.0, 0.1, 0.1);
        let panned = Region::from_degrees(40.05, -74.0, 0.1, 0.1);

        assert!(!should_offer_search_refresh(&nudged, &searched));
        assert!(should_offer_search_refresh(&panned, &searched));
    }

    #[test]
    fn test_region_fitting_single_item() {
        let items = vec![GeoItem::new("solo", 10.0, 20.0).unwrap()];
        let region = region_fitting(&items).unwrap();
        assert_eq!(region.span.latitude_delta, FIT_MIN_SPAN_DEGREES);
        assert_eq!(region.span.longitude_delta, FIT_MIN_SPAN_DEGREES);
        assert!((region.longitude() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_fitting_empty() {
        assert!(region_fitting(&[]).is_none());
    }
}
