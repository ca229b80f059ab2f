//! A compact set of non-negative integers.
//!
//! Values are spread over a fixed number of buckets (`value % buckets`) and
//! each bucket is a small slot array that doubles when it runs out of room.
//! Removed slots are tombstoned with [`EMPTY`] rather than compacted, so a
//! later insert into the same bucket reuses them. Memory therefore tracks the
//! number of members, which keeps one set per vertex affordable and makes the
//! copies taken while enumerating subgraphs cheap.

use crate::error::IntSetError;

use std::fmt;

/// Number of buckets used by [`CompactIntSet::new`].
pub const DEFAULT_BUCKETS: usize = 29;
const INITIAL_BUCKET_LEN: usize = 4;
/// Slot sentinel; also the one `u32` that can never be a member.
pub const EMPTY: u32 = u32::MAX;

fn checked(value: i64) -> Result<u32, IntSetError> {
    if (0..EMPTY as i64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(IntSetError::InvalidArgument(value))
    }
}

#[derive(Clone)]
pub struct CompactIntSet {
    buckets: Box<[Vec<u32>]>,
    len: usize,
}

impl CompactIntSet {
    pub fn new() -> CompactIntSet {
        CompactIntSet::with_buckets(DEFAULT_BUCKETS)
    }

    /// A zero bucket count is bumped to one.
    pub fn with_buckets(buckets: usize) -> CompactIntSet {
        CompactIntSet {
            buckets: vec![Vec::new(); buckets.max(1)].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, value: u32) -> usize {
        value as usize % self.buckets.len()
    }

    /// Insert `value`, returning `true` if it was not already present.
    ///
    /// Fails with [`IntSetError::InvalidArgument`] for negative values (and
    /// for `u32::MAX`, which is reserved as the slot sentinel) before touching
    /// the set.
    pub fn add(&mut self, value: impl Into<i64>) -> Result<bool, IntSetError> {
        let value = checked(value.into())?;
        let index = self.bucket_of(value);
        let bucket = &mut self.buckets[index];
        if bucket.contains(&value) {
            return Ok(false);
        }
        match bucket.iter().position(|slot| *slot == EMPTY) {
            Some(slot) => bucket[slot] = value,
            None => {
                let prev_len = bucket.len();
                let new_len = if prev_len == 0 {
                    INITIAL_BUCKET_LEN
                } else {
                    prev_len * 2
                };
                bucket.reserve_exact(new_len - prev_len);
                bucket.resize(new_len, EMPTY);
                bucket[prev_len] = value;
            }
        }
        self.len += 1;
        Ok(true)
    }

    /// Negative (or otherwise unstorable) values are simply not members.
    pub fn contains(&self, value: impl Into<i64>) -> bool {
        match checked(value.into()) {
            Ok(value) => self.buckets[self.bucket_of(value)].contains(&value),
            Err(_) => false,
        }
    }

    /// Tombstone `value`, returning whether it was present.
    pub fn remove(&mut self, value: impl Into<i64>) -> Result<bool, IntSetError> {
        let value = checked(value.into())?;
        let index = self.bucket_of(value);
        match self.buckets[index].iter().position(|slot| *slot == value) {
            Some(slot) => {
                self.buckets[index][slot] = EMPTY;
                self.len -= 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Members in bucket-then-slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: &self.buckets,
            bucket: 0,
            slot: 0,
        }
    }

    /// A removing cursor over the members, see [`Cursor`].
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor {
            set: self,
            bucket: 0,
            slot: 0,
            current: None,
        }
    }

    pub fn to_sorted_vec(&self) -> Vec<u32> {
        let mut members = self.iter().collect::<Vec<u32>>();
        members.sort_unstable();
        members
    }
}

impl Default for CompactIntSet {
    fn default() -> Self {
        CompactIntSet::new()
    }
}

impl PartialEq for CompactIntSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|v| other.contains(v))
    }
}

impl Eq for CompactIntSet {}

impl fmt::Debug for CompactIntSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a CompactIntSet {
    type Item = u32;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn next_occupied(
    buckets: &[Vec<u32>],
    mut bucket: usize,
    mut slot: usize,
) -> Option<(usize, usize)> {
    while let Some(slots) = buckets.get(bucket) {
        while let Some(value) = slots.get(slot) {
            if *value != EMPTY {
                return Some((bucket, slot));
            }
            slot += 1;
        }
        bucket += 1;
        slot = 0;
    }
    None
}

pub struct Iter<'a> {
    buckets: &'a [Vec<u32>],
    bucket: usize,
    slot: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> {
        let (bucket, slot) = next_occupied(self.buckets, self.bucket, self.slot)?;
        self.bucket = bucket;
        self.slot = slot + 1;
        Some(self.buckets[bucket][slot])
    }
}

/// Walks the set while allowing the member just yielded to be removed.
///
/// The cursor borrows the set mutably, so the set cannot change underneath it
/// except through [`Cursor::remove_current`].
pub struct Cursor<'a> {
    set: &'a mut CompactIntSet,
    bucket: usize,
    slot: usize,
    current: Option<(usize, usize)>,
}

impl<'a> Cursor<'a> {
    pub fn has_next(&self) -> bool {
        next_occupied(&self.set.buckets, self.bucket, self.slot).is_some()
    }

    /// Yield the next member, or [`IntSetError::InvalidOperation`] once the
    /// set is exhausted.
    pub fn advance(&mut self) -> Result<u32, IntSetError> {
        match next_occupied(&self.set.buckets, self.bucket, self.slot) {
            Some((bucket, slot)) => {
                self.bucket = bucket;
                self.slot = slot + 1;
                self.current = Some((bucket, slot));
                Ok(self.set.buckets[bucket][slot])
            }
            None => {
                self.current = None;
                Err(IntSetError::InvalidOperation("advance past the end"))
            }
        }
    }

    /// Remove the member returned by the last successful [`advance`](Self::advance).
    pub fn remove_current(&mut self) -> Result<u32, IntSetError> {
        let Some((bucket, slot)) = self.current.take() else {
            return Err(IntSetError::InvalidOperation("remove before advance"));
        };
        let value = std::mem::replace(&mut self.set.buckets[bucket][slot], EMPTY);
        self.set.len -= 1;
        Ok(value)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> {
        self.advance().ok()
    }
}
