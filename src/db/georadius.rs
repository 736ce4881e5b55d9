//! Radius search over a sorted set of geohash scores.
//!
//! Members are expected to carry the score [`GeoPlane::calc_score`] gives
//! their position. A search turns the covering cells planned by
//! [`GeoPlane::areas_by_radius`] into score ranges and scans each of them.

use super::member::{Positioned, ZSetMember};
use super::zset::ZSet;
use crate::compute::geohash::{GeoHashBits, GeoPlane};
use crate::compute::radius::distance;
use rustc_hash::FxHashSet;

/// Parameters of a radius search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub plane: GeoPlane,
    /// Log the box of every visited cell at debug level
    pub debug_cells: bool,
}

impl RadiusQuery {
    pub fn new(plane: GeoPlane) -> Self {
        Self {
            plane,
            debug_cells: false,
        }
    }

    pub fn with_debug_cells(mut self, enabled: bool) -> Self {
        self.debug_cells = enabled;
        self
    }

    /// Members stored in the cells covering the circle.
    ///
    /// This is a candidate list, not an answer: it contains every member
    /// within `radius` of `(x, y)` plus members elsewhere in the covering
    /// cells, and a member may appear more than once when its score sits on
    /// a shared cell boundary. Use [`within`](Self::within) for exact results.
    ///
    /// An invalid radius (negative or not finite) or a center off the plane
    /// yields an empty list.
    pub fn candidates<'a, E: ZSetMember>(
        &self,
        zset: &'a ZSet<E>,
        x: f64,
        y: f64,
        radius: f64,
    ) -> Vec<&'a E> {
        let mut members = Vec::new();

        if !radius.is_finite() || radius < 0.0 {
            log::warn!(
                "Rejecting radius query on '{}' with invalid radius {}",
                zset.name(),
                radius
            );
            return members;
        }

        let Some(area) = self.plane.areas_by_radius(x, y, radius) else {
            log::warn!(
                "Rejecting radius query on '{}': center ({}, {}) is off the plane",
                zset.name(),
                x,
                y
            );
            return members;
        };

        log::debug!(
            "Radius query on '{}' at ({}, {}) r={}: step {}, center cell {:?}, {} cells",
            zset.name(),
            x,
            y,
            radius,
            area.step,
            area.area,
            area.cells().count()
        );

        let mut last_processed: Option<GeoHashBits> = None;
        for hash in area.cells() {
            if self.debug_cells {
                let cell = self.plane.decode(hash);
                log::debug!(
                    "cell {:#x}: x [{}, {}), y [{}, {})",
                    hash.bits(),
                    cell.x_min,
                    cell.x_max,
                    cell.y_min,
                    cell.y_max
                );
            }

            // Large radii at low precision produce repeated neighbors.
            if last_processed == Some(hash) {
                log::trace!(
                    "Skipping geohash {:#x}, same as previous",
                    hash.bits()
                );
                continue;
            }

            members_of_cell(zset, hash, &mut members);
            last_processed = Some(hash);
        }

        members
    }

    /// Members whose position lies within `radius` of `(x, y)`, each once.
    pub fn within<'a, E: Positioned>(
        &self,
        zset: &'a ZSet<E>,
        x: f64,
        y: f64,
        radius: f64,
    ) -> Vec<&'a E> {
        let mut seen = FxHashSet::default();
        self.candidates(zset, x, y, radius)
            .into_iter()
            .filter(|member| {
                let position = member.position();
                distance(x, y, position.x(), position.y()) <= radius
            })
            .filter(|member| seen.insert(member.key()))
            .collect()
    }
}

impl Default for RadiusQuery {
    fn default() -> Self {
        Self::new(GeoPlane::DEFAULT)
    }
}

/// Append the members whose score falls in `hash`'s cell.
pub fn members_of_cell<'a, E: ZSetMember>(
    zset: &'a ZSet<E>,
    hash: GeoHashBits,
    out: &mut Vec<&'a E>,
) {
    let (min, max) = hash.score_range();
    zset.range_by_score_into(min, max, out);
}

impl<E: ZSetMember> ZSet<E> {
    /// Radius candidates on the default plane. See [`RadiusQuery::candidates`].
    ///
    /// Scores are only meaningful on the plane that produced them: a set
    /// filled through a registry with a custom [`Config`](crate::Config) must
    /// be searched with [`ZSetRegistry::radius`](super::ZSetRegistry::radius)
    /// or [`ZSetRegistry::query`](super::ZSetRegistry::query), or with
    /// [`RadiusQuery::new`] on that plane. This method would scan the wrong
    /// cells and miss members.
    pub fn georadius(&self, x: f64, y: f64, radius: f64) -> Vec<&E> {
        RadiusQuery::default().candidates(self, x, y, radius)
    }
}

impl<E: Positioned> ZSet<E> {
    /// Exact radius search on the default plane. See [`RadiusQuery::within`].
    ///
    /// Like [`georadius`](Self::georadius), only correct for sets scored on
    /// the default plane.
    pub fn georadius_exact(&self, x: f64, y: f64, radius: f64) -> Vec<&E> {
        RadiusQuery::default().within(self, x, y, radius)
    }
}
