use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Angular extent of a region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Height of the region in degrees of latitude
    pub latitude_delta: f64,
    /// Width of the region in degrees of longitude
    pub longitude_delta: f64,
}

impl Span {
    /// Create a span from latitude and longitude deltas (degrees).
    pub fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }

    /// Returns true if either delta is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
            && self.latitude_delta > 0.0
            && self.longitude_delta > 0.0)
    }
}

/// A rectangular map region described by its center and angular span.
///
/// This is the shape a map viewport reports: the visible region while the
/// user pans and zooms, or the region that the last full search covered.
///
/// # Examples
///
/// ```
/// use quadcluster_types::region::{Region, Span};
/// use geo::Point;
///
/// let region = Region::new(Point::new(0.0, 0.0), Span::new(1.0, 1.0));
///
/// // One degree of latitude is roughly 111 km
/// let height = region.height_meters();
/// assert!(height > 110_000.0 && height < 112_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center of the region (x = longitude, y = latitude)
    pub center: Point<f64>,
    /// Angular size of the region
    pub span: Span,
}

impl Region {
    /// Create a region from its center and span.
    pub fn new(center: Point<f64>, span: Span) -> Self {
        Self { center, span }
    }

    /// Create a region from center latitude/longitude and deltas in degrees.
    pub fn from_degrees(
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Self {
        Self {
            center: Point::new(longitude, latitude),
            span: Span::new(latitude_delta, longitude_delta),
        }
    }

    /// Center latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.center.y()
    }

    /// Center longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.center.x()
    }

    /// A region with no area (or a malformed span) covers nothing.
    pub fn is_empty(&self) -> bool {
        self.span.is_empty() || !self.center.x().is_finite() || !self.center.y().is_finite()
    }

    /// Great-circle width measured through the center, in meters.
    pub fn width_meters(&self) -> f64 {
        let half = self.span.longitude_delta * 0.5;
        let left = Point::new(self.longitude() - half, self.latitude());
        let right = Point::new(self.longitude() + half, self.latitude());
        Haversine.distance(left, right)
    }

    /// Great-circle height measured through the center, in meters.
    pub fn height_meters(&self) -> f64 {
        let half = self.span.latitude_delta * 0.5;
        let top = Point::new(self.longitude(), self.latitude() + half);
        let bottom = Point::new(self.longitude(), self.latitude() - half);
        Haversine.distance(top, bottom)
    }
}
