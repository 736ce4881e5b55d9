//! Element traits for sorted-set members.

use geo::Point;
use std::hash::Hash;

/// An element that can live in a [`ZSet`](super::ZSet).
///
/// Identity is carried by [`key`](ZSetMember::key): two elements with equal
/// keys are the same member, whatever else they contain. The score is owned
/// by the set once the element is inserted; the set calls
/// [`set_score`](ZSetMember::set_score) whenever it moves the element.
///
/// # Examples
///
/// ```rust
/// use zgeo::ZSetMember;
///
/// struct Player {
///     id: u64,
///     score: i64,
/// }
///
/// impl ZSetMember for Player {
///     type Key = u64;
///
///     fn key(&self) -> u64 {
///         self.id
///     }
///
///     fn score(&self) -> i64 {
///         self.score
///     }
///
///     fn set_score(&mut self, score: i64) {
///         self.score = score;
///     }
/// }
/// ```
pub trait ZSetMember {
    type Key: Hash + Eq + Clone;

    fn key(&self) -> Self::Key;

    fn score(&self) -> i64;

    fn set_score(&mut self, score: i64);
}

/// A member with a position on the plane.
///
/// Positioned members can be scored from their position and refined by
/// exact distance after a radius search.
pub trait Positioned: ZSetMember {
    fn position(&self) -> Point<f64>;
}
