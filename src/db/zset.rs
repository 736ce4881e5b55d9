//! The sorted-set engine.
//!
//! A [`ZSet`] keeps two views of its members:
//!
//! ```text
//! ZSet
//! ├─ dict: FxHashMap<Key, E>          identity -> element
//! └─ zsl:  BTreeMap<i64, [Key]>       score -> identities with that score
//!    ├─ 10 -> [a]
//!    ├─ 15 -> [b, c]
//!    └─ 42 -> [d]
//! ```
//!
//! A key is in `dict` iff it is in exactly one bucket of `zsl`, and that
//! bucket's score is the element's current score. Every mutation below keeps
//! the two views in step.

use super::member::ZSetMember;
use crate::config::AddOptions;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

type Bucket<K> = SmallVec<[K; 4]>;

/// Per-element result of [`ZSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The element was new and was added.
    Added,
    /// The element already existed; its score was set (possibly unchanged).
    Updated,
    /// Not performed: the element exists and `nx` was requested.
    RejectedNx,
    /// Not performed: the element is new and `xx` was requested.
    RejectedXx,
}

impl AddOutcome {
    /// Whether the element was added or updated.
    pub fn is_changed(self) -> bool {
        matches!(self, AddOutcome::Added | AddOutcome::Updated)
    }
}

/// A named sorted set of members ordered by `i64` score.
///
/// Not synchronized: all mutation goes through `&mut self`.
///
/// # Examples
///
/// ```rust
/// use zgeo::{AddOptions, AddOutcome, ZSet, ZSetMember};
///
/// #[derive(Debug)]
/// struct Item(u32, i64);
///
/// impl ZSetMember for Item {
///     type Key = u32;
///     fn key(&self) -> u32 { self.0 }
///     fn score(&self) -> i64 { self.1 }
///     fn set_score(&mut self, score: i64) { self.1 = score; }
/// }
///
/// let mut zset = ZSet::new("items");
/// assert_eq!(zset.add(10, Item(1, 0), AddOptions::default()), AddOutcome::Added);
/// assert_eq!(zset.add(5, Item(1, 0), AddOptions::incr()), AddOutcome::Updated);
/// assert_eq!(zset.score(&1), Some(15));
///
/// let found = zset.range_by_score(0, 20);
/// assert_eq!(found.len(), 1);
/// ```
pub struct ZSet<E: ZSetMember> {
    name: String,
    dict: FxHashMap<E::Key, E>,
    zsl: BTreeMap<i64, Bucket<E::Key>>,
}

impl<E: ZSetMember> ZSet<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dict: FxHashMap::default(),
            zsl: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Number of distinct scores currently held.
    pub fn bucket_count(&self) -> usize {
        self.zsl.len()
    }

    pub fn contains(&self, key: &E::Key) -> bool {
        self.dict.contains_key(key)
    }

    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.dict.get(key)
    }

    pub fn score(&self, key: &E::Key) -> Option<i64> {
        self.dict.get(key).map(|element| element.score())
    }

    /// Add `element` with the score it already carries.
    pub fn add_member(&mut self, element: E) -> AddOutcome {
        let score = element.score();
        self.add(score, element, AddOptions::default())
    }

    /// Add `delta` to the member's score, inserting it with score `delta` if
    /// it is not present.
    pub fn incr_by(&mut self, delta: i64, element: E) -> AddOutcome {
        self.add(delta, element, AddOptions::incr())
    }

    /// Insert or update one element.
    ///
    /// For an existing identity `element` replaces the stored one and takes
    /// the resulting score. Increments saturate at the `i64` range.
    pub fn add(&mut self, score: i64, mut element: E, options: AddOptions) -> AddOutcome {
        let key = element.key();

        if let Some(existing) = self.dict.get_mut(&key) {
            if options.nx {
                return AddOutcome::RejectedNx;
            }

            let current = existing.score();
            let new_score = if options.incr {
                current.saturating_add(score)
            } else {
                score
            };

            element.set_score(new_score);
            *existing = element;

            if new_score != current {
                Self::unlink(&mut self.zsl, current, &key);
                self.zsl.entry(new_score).or_default().push(key);
            }
            return AddOutcome::Updated;
        }

        if options.xx {
            return AddOutcome::RejectedXx;
        }

        element.set_score(score);
        self.zsl.entry(score).or_default().push(key.clone());
        self.dict.insert(key, element);
        AddOutcome::Added
    }

    /// Remove a member. Returns `true` whether or not it was present.
    pub fn remove(&mut self, key: &E::Key) -> bool {
        if let Some(element) = self.dict.remove(key) {
            Self::unlink(&mut self.zsl, element.score(), key);
        }
        true
    }

    /// Members with `min <= score <= max`, in ascending score order.
    pub fn range_by_score(&self, min: i64, max: i64) -> Vec<&E> {
        let mut members = Vec::new();
        self.range_by_score_into(min, max, &mut members);
        members
    }

    /// Like [`range_by_score`](Self::range_by_score) but appends to `out`.
    pub fn range_by_score_into<'a>(&'a self, min: i64, max: i64, out: &mut Vec<&'a E>) {
        if min > max {
            return;
        }

        for bucket in self.zsl.range(min..=max).map(|(_, bucket)| bucket) {
            out.extend(bucket.iter().filter_map(|key| self.dict.get(key)));
        }
    }

    /// Number of members with `min <= score <= max`.
    pub fn count(&self, min: i64, max: i64) -> usize {
        if min > max {
            return 0;
        }
        self.zsl.range(min..=max).map(|(_, bucket)| bucket.len()).sum()
    }

    /// All members in ascending score order.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.zsl
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter_map(|key| self.dict.get(key))
    }

    pub fn clear(&mut self) {
        self.dict.clear();
        self.zsl.clear();
    }

    /// Check that every member sits in exactly one bucket keyed by its score
    /// and that no bucket holds a stale or empty entry.
    pub fn verify_invariants(&self) -> Result<(), String> {
        let mut seen = 0usize;

        for (&score, bucket) in &self.zsl {
            if bucket.is_empty() {
                return Err(format!("Empty bucket left at score {}", score));
            }
            for key in bucket {
                let Some(element) = self.dict.get(key) else {
                    return Err(format!("Bucket {} holds a key missing from dict", score));
                };
                if element.score() != score {
                    return Err(format!(
                        "Element with score {} filed under bucket {}",
                        element.score(),
                        score
                    ));
                }
                seen += 1;
            }
        }

        if seen != self.dict.len() {
            return Err(format!(
                "{} bucket entries for {} members",
                seen,
                self.dict.len()
            ));
        }
        Ok(())
    }

    fn unlink(zsl: &mut BTreeMap<i64, Bucket<E::Key>>, score: i64, key: &E::Key) {
        let Some(bucket) = zsl.get_mut(&score) else {
            return;
        };
        if let Some(pos) = bucket.iter().position(|k| k == key) {
            bucket.swap_remove(pos);
        }
        if bucket.is_empty() {
            zsl.remove(&score);
        }
    }
}

impl<E: ZSetMember> fmt::Debug for ZSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZSet")
            .field("name", &self.name)
            .field("len", &self.dict.len())
            .field("buckets", &self.zsl.len())
            .finish()
    }
}
