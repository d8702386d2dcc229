//! Data memory: a contiguous, 0-indexed buffer of `i64` with an explicit
//! logical capacity.
//!
//! Capacity only grows, and only when an insertion finds `len == capacity`;
//! the new capacity is `max(1, 2 * capacity)`. `clear` keeps it.

use crate::error::StoreError;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Default)]
pub struct DataMemory {
    buf: Vec<i64>,
    capacity: usize,
}

impl DataMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn from_slice(values: &[i64]) -> Self {
        let mut mem = Self::new();
        mem.extend_from_slice(values);
        mem
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.buf.get(index).copied()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut i64> {
        self.buf.get_mut(index)
    }

    /// Inserts `value` at `index`, shifting later elements up by one.
    /// `index == len()` appends.
    pub fn insert(&mut self, index: usize, value: i64) -> Result<(), StoreError> {
        if index > self.buf.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.buf.len(),
            });
        }
        self.grow_if_full();
        self.buf.insert(index, value);
        Ok(())
    }

    /// Removes the element at `index`, shifting later elements down by one.
    pub fn erase(&mut self, index: usize) -> Result<i64, StoreError> {
        if index >= self.buf.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.buf.len(),
            });
        }
        Ok(self.buf.remove(index))
    }

    pub fn push_back(&mut self, value: i64) {
        self.grow_if_full();
        self.buf.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[i64]) {
        for &v in values {
            self.push_back(v);
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, i64> {
        self.buf.iter()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.buf
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.buf.clone()
    }

    fn grow_if_full(&mut self) {
        if self.buf.len() < self.capacity {
            return;
        }
        let next = std::cmp::max(1, self.capacity.saturating_mul(2));
        self.buf.reserve_exact(next - self.buf.len());
        self.capacity = next;
    }
}

/// Raw access. Out-of-range indices are a caller bug and panic.
impl Index<usize> for DataMemory {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        &self.buf[index]
    }
}

impl IndexMut<usize> for DataMemory {
    fn index_mut(&mut self, index: usize) -> &mut i64 {
        &mut self.buf[index]
    }
}

impl<'a> IntoIterator for &'a DataMemory {
    type Item = &'a i64;
    type IntoIter = std::slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for DataMemory {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for DataMemory {}
