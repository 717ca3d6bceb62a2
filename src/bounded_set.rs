use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    hash::Hash,
};

use serde::{Serialize, Serializer, ser::SerializeSeq};
use thiserror::Error;

use crate::core::limits::DEFAULT_MAXLEN;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundedSetError {
    #[error("Capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("Item not found in set")]
    NotFound,
}

/// A set that remembers insertion order and holds at most `capacity` items.
/// Inserting a new item into a full set evicts the oldest one.
///
/// Removed items leave stale entries in `order` (their sequence number no longer
/// matches `index`), which are skipped on iteration and compacted away once they
/// outnumber the live ones. This keeps `add`, `remove` and `contains` O(1) amortized.
pub struct BoundedOrderedSet<T> {
    capacity: usize,
    index: HashMap<T, u64>,
    order: VecDeque<(u64, T)>,
    next_seq: u64,
    evictions: u64,
}

impl<T: Hash + Eq + Clone> BoundedOrderedSet<T> {
    pub fn new(capacity: usize) -> Result<Self, BoundedSetError> {
        if capacity < 1 {
            return Err(BoundedSetError::InvalidCapacity(capacity));
        }

        Ok(Self {
            capacity,
            index: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
            evictions: 0,
        })
    }

    /// Build a set by adding every item in order. Only the last `capacity` items survive,
    /// and every eviction on the way is counted.
    pub fn from_iterable<I>(items: I, capacity: usize) -> Result<Self, BoundedSetError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::new(capacity)?;
        for item in items {
            set.add(item);
        }
        Ok(set)
    }

    /// Insert an item at the newest end. Returns the evicted oldest item if the set overflowed.
    /// Adding an item that is already present does nothing and keeps its position.
    pub fn add(&mut self, item: T) -> Option<T> {
        if self.index.contains_key(&item) {
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(item.clone(), seq);
        self.order.push_back((seq, item));

        if self.index.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    /// Remove an item if present. Never fails.
    pub fn discard<Q>(&mut self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.index.remove(item).is_some();
        if removed {
            self.compact_if_sparse();
        }
        removed
    }

    /// Remove an item, failing with `NotFound` if it is not a member
    pub fn remove<Q>(&mut self, item: &Q) -> Result<(), BoundedSetError>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.discard(item) {
            Ok(())
        } else {
            Err(BoundedSetError::NotFound)
        }
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items evicted by capacity pressure since this instance was created
    pub fn total_evictions(&self) -> u64 {
        self.evictions
    }

    /// Remove all items. The eviction counter is kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    /// Remove every member that appears in `other`. Items of `other` that are not members are ignored.
    pub fn difference_update<'a, Q, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = &'a Q>,
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        for item in other {
            self.index.remove(item);
        }
        self.compact_if_sparse();
    }

    /// Iterate members from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order
            .iter()
            .filter(|(seq, item)| self.is_live(*seq, item))
            .map(|(_, item)| item)
    }

    pub fn as_list(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn as_set(&self) -> HashSet<T> {
        self.index.keys().cloned().collect()
    }

    /// Independent copy with the same capacity and members. The copy starts a fresh
    /// eviction count of zero.
    pub fn copy(&self) -> Self {
        let mut copy = Self::with_clamped_capacity(self.capacity);
        for item in self.iter() {
            copy.add(item.clone());
        }
        copy
    }

    /// Infallible constructor for compile-time defaults. A zero capacity is raised to 1.
    pub(crate) fn with_clamped_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            index: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
            evictions: 0,
        }
    }

    fn is_live(&self, seq: u64, item: &T) -> bool {
        self.index.get(item) == Some(&seq)
    }

    fn evict_oldest(&mut self) -> Option<T> {
        while let Some((seq, item)) = self.order.pop_front() {
            if self.is_live(seq, &item) {
                self.index.remove(&item);
                self.evictions += 1;
                return Some(item);
            }
        }
        None
    }

    fn compact_if_sparse(&mut self) {
        if self.order.len() > 2 * self.index.len() + 16 {
            let index = &self.index;
            self.order
                .retain(|(seq, item)| index.get(item) == Some(seq));
        }
    }
}

impl<T: Hash + Eq + Clone> Default for BoundedOrderedSet<T> {
    fn default() -> Self {
        Self::with_clamped_capacity(DEFAULT_MAXLEN)
    }
}

/// Unlike `copy`, a clone keeps the eviction count of the original.
impl<T: Hash + Eq + Clone> Clone for BoundedOrderedSet<T> {
    fn clone(&self) -> Self {
        let mut clone = self.copy();
        clone.evictions = self.evictions;
        clone
    }
}

impl<'a, T: Hash + Eq + Clone> IntoIterator for &'a BoundedOrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Box<dyn Iterator<Item = &'a T> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

// Equality is by content only: capacity, order and eviction counts are ignored.
impl<T: Hash + Eq + Clone> PartialEq for BoundedOrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.index.keys().all(|item| other.contains(item))
    }
}

impl<T: Hash + Eq + Clone> Eq for BoundedOrderedSet<T> {}

impl<T: Hash + Eq + Clone> PartialEq<HashSet<T>> for BoundedOrderedSet<T> {
    fn eq(&self, other: &HashSet<T>) -> bool {
        self.len() == other.len() && other.iter().all(|item| self.contains(item))
    }
}

impl<T: Hash + Eq + Clone> PartialEq<BoundedOrderedSet<T>> for HashSet<T> {
    fn eq(&self, other: &BoundedOrderedSet<T>) -> bool {
        other == self
    }
}

impl<T: Hash + Eq + Clone + fmt::Debug> fmt::Debug for BoundedOrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundedOrderedSet(capacity={}, ", self.capacity)?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

impl<T: Hash + Eq + Clone + Serialize> Serialize for BoundedOrderedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}
