//! Named sorted sets.
//!
//! [`ZSetRegistry`] maps set names to [`ZSet`]s and exposes the command-style
//! entry points (`add`, `range_by_score`, `remove`, `radius`, ...) that take a
//! set name. Sets are created on first write and live as long as the registry.

use super::georadius::RadiusQuery;
use super::member::{Positioned, ZSetMember};
use super::zset::{AddOutcome, ZSet};
use crate::compute::geohash::GeoPlane;
use crate::config::{AddOptions, Config};
use crate::error::{Result, ZSetError};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::fmt;

/// A caller-owned collection of named sorted sets.
///
/// Not synchronized. To share one registry across threads, wrap it in a lock
/// or give each thread its own registry for the sets it owns.
///
/// # Examples
///
/// ```rust
/// use geo::Point;
/// use zgeo::{Positioned, ZSetMember, ZSetRegistry};
///
/// struct Obstacle {
///     id: u64,
///     center: Point<f64>,
///     score: i64,
/// }
///
/// impl ZSetMember for Obstacle {
///     type Key = u64;
///     fn key(&self) -> u64 { self.id }
///     fn score(&self) -> i64 { self.score }
///     fn set_score(&mut self, score: i64) { self.score = score; }
/// }
///
/// impl Positioned for Obstacle {
///     fn position(&self) -> Point<f64> { self.center }
/// }
///
/// let mut registry = ZSetRegistry::new();
/// registry.geo_add("obstacles", Obstacle { id: 1, center: Point::new(0.0, 0.0), score: 0 })?;
///
/// let candidates = registry.radius("obstacles", 2.0, 2.0, 1.0);
/// assert!(candidates.iter().any(|o| o.id == 1));
/// # Ok::<(), zgeo::ZSetError>(())
/// ```
pub struct ZSetRegistry<E: ZSetMember> {
    sets: FxHashMap<String, ZSet<E>>,
    config: Config,
    query: RadiusQuery,
}

impl<E: ZSetMember> ZSetRegistry<E> {
    /// Create a registry over the default plane.
    pub fn new() -> Self {
        let config = Config::default();
        let query = Self::query_for(&config);
        Self {
            sets: FxHashMap::default(),
            config,
            query,
        }
    }

    /// Create a registry with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(ZSetError::Config)?;
        let query = Self::query_for(&config);
        Ok(Self {
            sets: FxHashMap::default(),
            config,
            query,
        })
    }

    fn query_for(config: &Config) -> RadiusQuery {
        RadiusQuery::new(config.geo_plane()).with_debug_cells(config.debug_cells)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The plane scores and radius queries are computed on.
    pub fn plane(&self) -> &GeoPlane {
        &self.query.plane
    }

    /// The radius query the registry runs, bound to its plane. Use it to
    /// search a set obtained through [`lookup`](Self::lookup).
    pub fn query(&self) -> &RadiusQuery {
        &self.query
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn contains_set(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sets.keys().map(String::as_str)
    }

    pub fn lookup(&self, name: &str) -> Option<&ZSet<E>> {
        self.sets.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut ZSet<E>> {
        self.sets.get_mut(name)
    }

    /// The set called `name`, created empty if it does not exist yet.
    pub fn get_or_create(&mut self, name: &str) -> &mut ZSet<E> {
        if !self.sets.contains_key(name) {
            log::debug!("Creating sorted set '{}'", name);
        }
        self.sets
            .entry(name.to_string())
            .or_insert_with(|| ZSet::new(name))
    }

    /// Register a set under its own name unless the name is already taken.
    ///
    /// Returns `false` and drops `zset` if another set holds the name: the
    /// first registration wins.
    pub fn register(&mut self, zset: ZSet<E>) -> bool {
        match self.sets.entry(zset.name().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(zset);
                true
            }
        }
    }

    /// Insert or update one element unconditionally.
    pub fn add_one(&mut self, name: &str, score: i64, element: E) -> AddOutcome {
        self.get_or_create(name)
            .add(score, element, AddOptions::default())
    }

    /// Add elements with their own scores.
    ///
    /// Returns the number of elements added or updated; NX/XX rejections are
    /// not counted and `options.ch` does not change the count. With
    /// `options.xx` a missing set is not created.
    pub fn add<I>(&mut self, name: &str, elements: I, options: AddOptions) -> usize
    where
        I: IntoIterator<Item = E>,
    {
        let zset = if options.xx {
            match self.sets.get_mut(name) {
                Some(zset) => zset,
                None => return 0,
            }
        } else {
            self.get_or_create(name)
        };

        let mut changed = 0;
        for element in elements {
            let score = element.score();
            if zset.add(score, element, options).is_changed() {
                changed += 1;
            }
        }
        changed
    }

    /// Increment each element's score by the score it carries. Returns the
    /// number of elements added or updated.
    pub fn incr_by<I>(&mut self, name: &str, elements: I) -> usize
    where
        I: IntoIterator<Item = E>,
    {
        self.add(name, elements, AddOptions::incr())
    }

    /// Members of `name` with `min <= score <= max`; empty if the set is unknown.
    pub fn range_by_score(&self, name: &str, min: i64, max: i64) -> Vec<&E> {
        self.sets
            .get(name)
            .map(|zset| zset.range_by_score(min, max))
            .unwrap_or_default()
    }

    /// Remove `key` from `name`. Returns `true` even if either is absent.
    pub fn remove(&mut self, name: &str, key: &E::Key) -> bool {
        match self.sets.get_mut(name) {
            Some(zset) => zset.remove(key),
            None => true,
        }
    }

    /// Radius candidates from `name`. See [`RadiusQuery::candidates`].
    pub fn radius(&self, name: &str, x: f64, y: f64, radius: f64) -> Vec<&E> {
        self.sets
            .get(name)
            .map(|zset| self.query.candidates(zset, x, y, radius))
            .unwrap_or_default()
    }
}

impl<E: Positioned> ZSetRegistry<E> {
    /// Insert or update an element with the score of its position.
    ///
    /// Fails with [`ZSetError::OutOfBounds`] if the position is off the plane;
    /// the set is left untouched in that case.
    pub fn geo_add(&mut self, name: &str, element: E) -> Result<AddOutcome> {
        let position = element.position();
        let Some(score) = self.query.plane.calc_score(position.x(), position.y()) else {
            log::warn!(
                "Rejecting geo_add to '{}': ({}, {}) is outside the plane",
                name,
                position.x(),
                position.y()
            );
            return Err(ZSetError::OutOfBounds {
                x: position.x(),
                y: position.y(),
            });
        };

        Ok(self
            .get_or_create(name)
            .add(score, element, AddOptions::default()))
    }

    /// Members of `name` within `radius` of `(x, y)`. See [`RadiusQuery::within`].
    pub fn radius_exact(&self, name: &str, x: f64, y: f64, radius: f64) -> Vec<&E> {
        self.sets
            .get(name)
            .map(|zset| self.query.within(zset, x, y, radius))
            .unwrap_or_default()
    }
}

impl<E: ZSetMember> Default for ZSetRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ZSetMember> fmt::Debug for ZSetRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZSetRegistry")
            .field("sets", &self.sets)
            .field("config", &self.config)
            .finish()
    }
}
