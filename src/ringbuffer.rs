//! Fixed-capacity ringbuffer.
//!
//! Entries are kept in insertion order; once the buffer is full every push
//! overwrites the oldest entry in O(1). Capacity never changes after
//! construction; storage grows on demand up to it.

/// A circular buffer with fixed capacity.
#[derive(Debug, Clone)]
pub struct Ringbuffer<T> {
    entries: Vec<T>,
    capacity: usize,
    write_index: usize,
}

impl<T> Ringbuffer<T> {
    /// Creates a new ringbuffer with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            write_index: 0,
        }
    }

    /// Pushes a new entry into the ringbuffer.
    ///
    /// If the buffer is full, the oldest entry is overwritten and returned.
    /// A zero-capacity buffer hands the entry straight back.
    pub fn push(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }

        let evicted = if self.entries.len() < self.capacity {
            self.entries.push(entry);
            None
        } else {
            Some(std::mem::replace(&mut self.entries[self.write_index], entry))
        };
        self.write_index = (self.write_index + 1) % self.capacity;
        evicted
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (older, newer) = if self.entries.len() < self.capacity {
            (&self.entries[..], &self.entries[..0])
        } else {
            // Full: the slot under write_index holds the oldest entry
            let (newer, older) = self.entries.split_at(self.write_index);
            (older, newer)
        };
        older.iter().chain(newer.iter())
    }

    /// Drops all entries. The allocation is kept for reuse.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.write_index = 0;
    }

    /// Returns the current number of entries in the buffer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the maximum capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Ringbuffer<T> {
    /// Returns all entries in chronological order (oldest to newest).
    pub fn get_history(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
