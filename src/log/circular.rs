//! Circular Log
//!
//! Fixed-capacity ring of completed commands.

use std::num::NonZeroUsize;

use super::Record;

/// Number of commands retained when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity ring of records
///
/// ## Invariants
/// - `full` is true iff every slot is occupied
/// - Occupied slots form one contiguous circular run starting at
///   `read_index`; every other slot is `None`
/// - `total_len` equals the sum of the occupied records' lengths
///
/// Not synchronized. Any locking is the caller's job.
#[derive(Debug)]
pub struct CircularLog {
    /// Record slots, `None` when unoccupied
    slots: Vec<Option<Record>>,

    /// Next slot to fill
    write_index: usize,

    /// Oldest occupied slot
    read_index: usize,

    /// Whether every slot is occupied
    full: bool,

    /// Cached sum of occupied record lengths
    total_len: usize,
}

impl CircularLog {
    /// Create an empty log with the given number of slots
    pub fn new(capacity: NonZeroUsize) -> Self {
        let mut slots = Vec::with_capacity(capacity.get());
        slots.resize_with(capacity.get(), || None);

        Self {
            slots,
            write_index: 0,
            read_index: 0,
            full: false,
            total_len: 0,
        }
    }

    /// Insert a record at the write position
    ///
    /// When the log is already full the oldest record is evicted and handed
    /// back, so the caller decides when its memory goes away. Returns `None`
    /// when nothing was evicted.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let capacity = self.slots.len();

        let evicted = if self.full {
            let old = self.slots[self.write_index].take();
            self.read_index = (self.read_index + 1) % capacity;
            old
        } else {
            None
        };

        if let Some(old) = &evicted {
            self.total_len -= old.len();
        }

        self.total_len += record.len();
        self.slots[self.write_index] = Some(record);
        self.write_index = (self.write_index + 1) % capacity;

        // Wrapping onto the oldest slot means the ring has been filled once
        if self.write_index == self.read_index {
            self.full = true;
        }

        evicted
    }

    /// Find the record holding a flat offset
    ///
    /// Flat offsets address the retained records as if they were concatenated
    /// oldest to newest. Returns the record and the offset inside it, or
    /// `None` when the offset is at or past the end of the retained bytes.
    ///
    /// An offset equal to the bytes seen so far belongs to the next record.
    /// The walk stops after `capacity` slots whatever the offset.
    pub fn find_by_flat_offset(&self, char_offset: usize) -> Option<(&Record, usize)> {
        let capacity = self.slots.len();
        let mut index = self.read_index;
        let mut cumulative = 0usize;

        for _ in 0..capacity {
            let record = self.slots[index].as_ref()?;
            let start = cumulative;
            cumulative += record.len();

            if char_offset < cumulative {
                return Some((record, char_offset - start));
            }

            index = (index + 1) % capacity;
        }

        None
    }

    /// The n-th retained record, oldest first
    pub fn nth_occupied(&self, n: u32) -> Option<&Record> {
        let n = usize::try_from(n).ok()?;
        if n >= self.len() {
            return None;
        }
        self.slots[(self.read_index + n) % self.slots.len()].as_ref()
    }

    /// Sum of the lengths of all retained records
    pub fn total_length(&self) -> usize {
        self.total_len
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        let capacity = self.slots.len();
        if self.full {
            capacity
        } else {
            (self.write_index + capacity - self.read_index) % capacity
        }
    }

    /// Whether no record is retained
    pub fn is_empty(&self) -> bool {
        !self.full && self.write_index == self.read_index
    }

    /// Whether every slot is occupied
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over retained records, oldest first
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            log: self,
            position: 0,
            remaining: self.len(),
        }
    }

    /// Remove every record and hand ownership back to the caller
    ///
    /// Records come back oldest first. The log is empty afterwards.
    pub fn clear(&mut self) -> Vec<Record> {
        let capacity = self.slots.len();
        let count = self.len();
        let mut drained = Vec::with_capacity(count);

        for step in 0..count {
            if let Some(record) = self.slots[(self.read_index + step) % capacity].take() {
                drained.push(record);
            }
        }

        self.write_index = 0;
        self.read_index = 0;
        self.full = false;
        self.total_len = 0;

        drained
    }
}

impl<'a> IntoIterator for &'a CircularLog {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over retained records, oldest first
pub struct Iter<'a> {
    log: &'a CircularLog,
    position: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let capacity = self.log.slots.len();
        let index = (self.log.read_index + self.position) % capacity;
        self.position += 1;
        self.remaining -= 1;

        self.log.slots[index].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
