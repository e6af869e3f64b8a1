//! Index interning for mesh-local vertex and normal lists
//!
//! `intern` returns the index of an equal element already in the list, or
//! appends the candidate and returns its new index. Indices are dense and
//! assigned in first-seen order.

use hashbrown::HashMap;
use std::hash::Hash;

/// Hashable identity of a record whose fields are floats.
///
/// Two records must produce the same key exactly when they compare equal.
pub trait InternKey {
    type Key: Hash + Eq;

    fn intern_key(&self) -> Self::Key;
}

/// Ordered list of unique elements with index lookup
#[derive(Debug, Clone)]
pub struct Interner<T: InternKey> {
    items: Vec<T>,
    lookup: HashMap<T::Key, u32>,
}

impl<T: InternKey> Default for Interner<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T: InternKey> Interner<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `candidate`, inserting it if no equal element exists yet
    pub fn intern(&mut self, candidate: T) -> u32 {
        let key = candidate.intern_key();
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.items.len() as u32;
        self.lookup.insert(key, index);
        self.items.push(candidate);
        index
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}
