//! Quadtree keys for geographic coordinates.
//!
//! A [`QuadKey`] packs 32 levels of recursive quadrant subdivision into a
//! `u64`. Each level contributes one latitude bit and one longitude bit; the
//! latitude bit is the high bit of each pair and the coarsest level sits in
//! bits 63/62. Truncating a key to a precision keeps only the leading bit
//! pairs, which makes truncation a monotone projection:
//! `k.truncate(a).truncate(b) == k.truncate(a.min(b))`.

use crate::compute::validation::validate_coordinate;
use crate::error::Result;
use geo::Point;
use std::fmt;

/// Subdivision depth of the quadkey grid.
pub type Precision = u8;

/// Deepest precision a key can carry.
pub const MAX_PRECISION: Precision = 32;

const CELLS_PER_AXIS: f64 = 4_294_967_296.0; // 2^32

/// A full-precision (or truncated) quadtree key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct QuadKey(u64);

impl QuadKey {
    /// Encode a coordinate at maximum precision.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidCoordinate` for non-finite or
    /// out-of-range input.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadcluster::quadkey::QuadKey;
    ///
    /// let key = QuadKey::from_coordinate(40.7128, -74.0060).unwrap();
    /// let center = key.centroid(32);
    /// assert!((center.y() - 40.7128).abs() < 1e-6);
    /// assert!((center.x() + 74.0060).abs() < 1e-6);
    ///
    /// assert!(QuadKey::from_coordinate(91.0, 0.0).is_err());
    /// ```
    pub fn from_coordinate(latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self::encode(latitude, longitude))
    }

    /// Encode a point (x = longitude, y = latitude) at maximum precision.
    pub fn from_point(point: &Point) -> Result<Self> {
        Self::from_coordinate(point.y(), point.x())
    }

    /// Encode a coordinate that may have been pushed past the map edges by
    /// a cell offset. Longitude wraps across the antimeridian; latitudes
    /// beyond the poles have no cell and yield `None`.
    pub fn from_coordinate_wrapped(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return None;
        }
        let longitude = if (-180.0..=180.0).contains(&longitude) {
            longitude
        } else {
            (longitude + 180.0).rem_euclid(360.0) - 180.0
        };
        Some(Self::encode(latitude, longitude))
    }

    fn encode(latitude: f64, longitude: f64) -> Self {
        let lat_index = axis_index((latitude + 90.0) / 180.0);
        let lon_index = axis_index((longitude + 180.0) / 360.0);
        QuadKey((spread_bits(lat_index) << 1) | spread_bits(lon_index))
    }

    /// Raw key bits.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Zero every bit pair finer than `precision`.
    pub fn truncate(&self, precision: Precision) -> Self {
        if precision >= MAX_PRECISION {
            return *self;
        }
        if precision == 0 {
            return QuadKey(0);
        }
        let mask = !(u64::MAX >> (2 * u32::from(precision)));
        QuadKey(self.0 & mask)
    }

    /// Center of the cell this key addresses at `precision`.
    ///
    /// # Panics
    ///
    /// Decoding at precision 0 or beyond [`MAX_PRECISION`] is a programming
    /// error.
    pub fn centroid(&self, precision: Precision) -> Point {
        assert!(
            (1..=MAX_PRECISION).contains(&precision),
            "QuadKey precision must be between 1 and {}",
            MAX_PRECISION
        );
        let key = self.truncate(precision).0;
        let shift = u32::from(MAX_PRECISION - precision);
        let lat_cell = compact_bits(key >> 1) >> shift;
        let lon_cell = compact_bits(key) >> shift;

        let latitude = -90.0 + (f64::from(lat_cell) + 0.5) * delta_latitude(precision);
        let longitude = -180.0 + (f64::from(lon_cell) + 0.5) * delta_longitude(precision);
        Point::new(longitude, latitude)
    }
}

impl From<u64> for QuadKey {
    fn from(bits: u64) -> Self {
        QuadKey(bits)
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Height of a cell in degrees of latitude.
pub fn delta_latitude(precision: Precision) -> f64 {
    180.0 / 2f64.powi(i32::from(precision))
}

/// Width of a cell in degrees of longitude.
pub fn delta_longitude(precision: Precision) -> f64 {
    360.0 / 2f64.powi(i32::from(precision))
}

fn axis_index(fraction: f64) -> u32 {
    (fraction * CELLS_PER_AXIS).floor().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn spread_bits(value: u32) -> u64 {
    let mut x = u64::from(value);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & 0x5555_5555_5555_5555
}

fn compact_bits(value: u64) -> u32 {
    let mut x = value & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    ((x | (x >> 16)) & 0x0000_0000_FFFF_FFFF) as u32
}
