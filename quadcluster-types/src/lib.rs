//! # quadcluster-types
//!
//! Geographic value types shared by the quadcluster grouping engine and the
//! collaborators that feed it.
//!
//! - **Region types**: `Region`, `Span`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! `Point`, with `x` holding longitude and `y` holding latitude.
//!
//! ## Examples
//!
//! ```rust
//! use quadcluster_types::region::{Region, Span};
//! use geo::Point;
//!
//! // A viewport over lower Manhattan
//! let region = Region::new(Point::new(-74.0060, 40.7128), Span::new(0.05, 0.08));
//! assert!(!region.is_empty());
//! ```

pub mod region;
