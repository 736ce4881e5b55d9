//! Embedded sorted sets with a Morton-coded radius index over a bounded plane.
//!
//! Elements are kept in score order. Planar positions are folded into scores
//! by interleaving the bits of their cell coordinates, so a radius search
//! becomes a handful of score range scans over nearby cells.
//!
//! ```rust
//! use zgeo::{Point, Positioned, ZSetMember, ZSetRegistry};
//!
//! #[derive(Debug)]
//! struct Obstacle {
//!     id: u32,
//!     center: Point<f64>,
//!     score: i64,
//! }
//!
//! impl ZSetMember for Obstacle {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.id }
//!     fn score(&self) -> i64 { self.score }
//!     fn set_score(&mut self, score: i64) { self.score = score; }
//! }
//!
//! impl Positioned for Obstacle {
//!     fn position(&self) -> Point<f64> { self.center }
//! }
//!
//! let mut registry = ZSetRegistry::new();
//! registry.geo_add("obstacles", Obstacle { id: 1, center: Point::new(0.0, 0.0), score: 0 })?;
//! registry.geo_add("obstacles", Obstacle { id: 2, center: Point::new(800.0, 800.0), score: 0 })?;
//!
//! let nearby = registry.radius_exact("obstacles", 1.0, 1.0, 5.0);
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].id, 1);
//! # Ok::<(), zgeo::ZSetError>(())
//! ```

pub mod compute;
pub mod config;
pub mod db;
pub mod error;

pub use compute::geohash::{CellBox, Direction, GeoHashBits, GeoPlane};
pub use compute::radius::GeoArea;
pub use config::{AddOptions, Config, PlaneBounds};
pub use db::{AddOutcome, Positioned, RadiusQuery, ZSet, ZSetMember, ZSetRegistry};
pub use error::{Result, ZSetError};

pub use geo::{Point, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, ZSet, ZSetError, ZSetRegistry};

    pub use crate::{AddOptions, AddOutcome, Positioned, ZSetMember};

    pub use crate::{Config, GeoPlane, PlaneBounds, RadiusQuery};

    pub use geo::Point;
}
