//! State identifiers and dense sets of NFA states.

use core::fmt;

use fixedbitset::FixedBitSet;

/// A state identifier: an index into an automaton's state arena.
pub type StateId = usize;

/// A set of NFA states backed by a fixed-size bit set.
///
/// All sets built for one automaton share the same capacity (the number of
/// states), which keeps `Hash` and `Eq` consistent so a set can key the
/// subset memo directly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set able to hold `capacity` states.
    pub fn with_capacity(capacity: usize) -> StateSet {
        StateSet { bits: FixedBitSet::with_capacity(capacity) }
    }

    /// Insert a state, returning true if it was not already present.
    pub fn insert(&mut self, state: StateId) -> bool {
        if state >= self.bits.len() {
            self.bits.grow(state + 1);
        }
        !self.bits.put(state)
    }

    pub fn contains(&self, state: StateId) -> bool {
        state < self.bits.len() && self.bits.contains(state)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones()
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
