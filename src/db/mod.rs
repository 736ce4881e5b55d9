//! Sorted sets and the radius search built on top of them.
//!
//! [`ZSet`] is a single sorted set, [`ZSetRegistry`] owns named sets and
//! carries the plane configuration, and [`RadiusQuery`] turns a circle into
//! score range scans.

mod georadius;
mod member;
mod registry;
mod zset;

pub use georadius::{RadiusQuery, members_of_cell};
pub use member::{Positioned, ZSetMember};
pub use registry::ZSetRegistry;
pub use zset::{AddOutcome, ZSet};
