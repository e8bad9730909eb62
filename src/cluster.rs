//! Items and the clusters they are grouped into.

use crate::error::Result;
use crate::quadkey::QuadKey;
use geo::Point;

/// Separator placed between member keys when deriving a cluster identity.
///
/// Plain concatenation would let `["ab", "c"]` and `["a", "bc"]` collide.
pub const IDENTITY_SEPARATOR: char = '\u{1f}';

/// Read-only view of an externally owned geo-located item.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoItem {
    /// Globally unique, stable key
    pub key: String,
    /// Full-precision spatial key
    pub quad_key: QuadKey,
    /// Location (x = longitude, y = latitude)
    pub coordinate: Point,
}

impl GeoItem {
    /// Create an item, validating the coordinate and encoding its quadkey.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadcluster::GeoItem;
    ///
    /// let item = GeoItem::new("Statue_of_Liberty", 40.6892, -74.0445).unwrap();
    /// assert_eq!(item.latitude(), 40.6892);
    ///
    /// assert!(GeoItem::new("nowhere", 123.0, 0.0).is_err());
    /// ```
    pub fn new(key: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let quad_key = QuadKey::from_coordinate(latitude, longitude)?;
        Ok(Self {
            key: key.into(),
            quad_key,
            coordinate: Point::new(longitude, latitude),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate.y()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate.x()
    }
}

/// A group of one or more items shown as a single marker.
///
/// The identity depends only on the member keys, so a cluster that keeps the
/// same membership across regroups keeps the same identity. Members partition
/// the item set, which means two clusters of one generation never share an
/// identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub identity: String,
    pub members: Vec<GeoItem>,
    pub centroid: Point,
    /// Previous location to animate from, when this cluster continues an
    /// earlier placement
    pub transition_origin: Option<Point>,
}

impl Cluster {
    /// Build a cluster from its members and their mean position.
    ///
    /// # Panics
    ///
    /// Panics if `members` is empty; the clustering pass never produces an
    /// empty group.
    pub fn new(members: Vec<GeoItem>, centroid: Point) -> Self {
        assert!(!members.is_empty(), "a cluster needs at least one member");
        let identity = identity_for(members.iter().map(|item| item.key.as_str()));
        Self {
            identity,
            members,
            centroid,
            transition_origin: None,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.iter().any(|item| item.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|item| item.key.as_str())
    }
}

/// Deterministic, order-independent identity for a set of member keys.
///
/// # Examples
///
/// ```
/// use quadcluster::cluster::identity_for;
///
/// assert_eq!(identity_for(["b", "a"]), identity_for(["a", "b"]));
/// assert_ne!(identity_for(["ab", "c"]), identity_for(["a", "bc"]));
/// ```
pub fn identity_for<'a>(keys: impl IntoIterator<Item = &'a str>) -> String {
    let mut keys: Vec<&str> = keys.into_iter().collect();
    keys.sort_unstable();
    let mut identity = String::with_capacity(keys.iter().map(|k| k.len() + 1).sum());
    for (idx, key) in keys.iter().enumerate() {
        if idx > 0 {
            identity.push(IDENTITY_SEPARATOR);
        }
        identity.push_str(key);
    }
    identity
}
