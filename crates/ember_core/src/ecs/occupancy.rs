//! # Occupancy Bitset
//!
//! Word-packed bitset where each bit records whether a slot is occupied.
//! At 64 slots per `u64`, tracking 65,536 entity ids takes 8KB.
//!
//! ## Performance
//!
//! - Insert / remove / contains: O(1)
//! - Clear all: O(n/64) where n = capacity
//! - Iterate occupied: O(n/64 + occupied) using `trailing_zeros`

/// Bits per storage word.
const WORD_BITS: usize = 64;

/// Bitset of occupied slot indices.
///
/// Used as the dense store's existence bitmap and as the entity allocator's
/// set of dead ids.
#[derive(Clone, Debug, Default)]
pub struct OccupancyBits {
    /// Bitset: 1 = occupied, 0 = empty. 64 slots per u64.
    words: Vec<u64>,
    /// Capacity in slots.
    capacity: usize,
    /// Cached count of occupied slots.
    count: usize,
}

impl OccupancyBits {
    /// Creates an empty bitset able to track `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0u64; capacity.div_ceil(WORD_BITS)],
            capacity,
            count: 0,
        }
    }

    /// Grows the bitset so it can track at least `capacity` slots.
    ///
    /// Never shrinks; new slots start empty.
    pub fn grow(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        self.words.resize(capacity.div_ceil(WORD_BITS), 0);
        self.capacity = capacity;
    }

    /// Marks a slot as occupied.
    ///
    /// Returns `true` if the slot was empty before. Indices at or past the
    /// capacity are ignored and return `false`.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        let was_empty = (*word & mask) == 0;
        *word |= mask;
        if was_empty {
            self.count += 1;
        }
        was_empty
    }

    /// Marks a slot as empty.
    ///
    /// Returns `true` if the slot was occupied before.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        let was_set = (*word & mask) != 0;
        *word &= !mask;
        if was_set {
            self.count -= 1;
        }
        was_set
    }

    /// Checks if a slot is occupied.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Returns the first occupied index at or after `from`.
    ///
    /// Skips whole empty words, so sparse occupancy scans quickly.
    #[must_use]
    pub fn next_set(&self, from: usize) -> Option<usize> {
        if from >= self.capacity {
            return None;
        }
        let mut word_idx = from / WORD_BITS;
        // Mask off bits below `from` in the first word.
        let mut word = self.words[word_idx] & (u64::MAX << (from % WORD_BITS));
        loop {
            if word != 0 {
                let index = word_idx * WORD_BITS + word.trailing_zeros() as usize;
                return (index < self.capacity).then_some(index);
            }
            word_idx += 1;
            word = *self.words.get(word_idx)?;
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Returns the number of slots this bitset tracks.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over occupied indices in ascending order.
    pub fn iter(&self) -> OccupancyIter<'_> {
        OccupancyIter {
            words: &self.words,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
            capacity: self.capacity,
        }
    }
}

/// Iterator over occupied indices, ascending.
pub struct OccupancyIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
    capacity: usize,
}

impl<'a> Iterator for OccupancyIter<'a> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                // Find lowest set bit
                let bit = self.current_word.trailing_zeros() as usize;
                let index = self.word_idx * WORD_BITS + bit;

                // Clear this bit
                self.current_word &= self.current_word - 1;

                if index < self.capacity {
                    return Some(index);
                }
            }

            // Move to next word
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
        }
    }
}
