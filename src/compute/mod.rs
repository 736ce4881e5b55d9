//! Compute layer: the stateless geometry behind the sorted sets.
//!
//! - [`bits`]: Morton interleaving and per-axis cell steps
//! - [`geohash`]: plane coordinates ↔ cell codes ↔ score ranges
//! - [`radius`]: choosing the cells a radius search scans
//!
//! Nothing here touches a sorted set; the `db` layer feeds these results into
//! score range scans.

pub mod bits;
pub mod geohash;
pub mod radius;
