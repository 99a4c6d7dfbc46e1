//! Record Assembler
//!
//! Turns partial writes into completed records.

use bytes::Bytes;

use crate::error::{CmdlogError, Result};

use super::Record;

/// Where a writer session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No pending bytes
    Idle,

    /// Bytes received, terminator not seen yet
    Accumulating,
}

/// Accumulates one writer session's bytes until a terminator completes them
///
/// Every terminator in a chunk completes one record. Bytes after the last
/// terminator stay pending for the next `feed`.
#[derive(Debug)]
pub struct RecordAssembler {
    /// Bytes received since the last completed record
    pending: Vec<u8>,

    /// Byte that ends a record
    terminator: u8,

    /// Largest record this session may build
    max_record_size: usize,
}

impl RecordAssembler {
    /// Create an assembler for the given terminator and size bound
    pub fn new(terminator: u8, max_record_size: usize) -> Self {
        Self {
            pending: Vec::new(),
            terminator,
            max_record_size,
        }
    }

    /// Append a chunk and return every record it completes
    ///
    /// Returns an empty vector while no terminator has been seen. A chunk
    /// either applies as a whole or not at all: on `AllocationFailure` the
    /// pending bytes are dropped and no record from the chunk is returned.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Record>> {
        match self.split_records(chunk) {
            Ok(records) => Ok(records),
            Err(e) => {
                let discarded = self.discard();
                tracing::debug!("Discarded {} pending bytes after failed feed: {}", discarded, e);
                Err(e)
            }
        }
    }

    fn split_records(&mut self, chunk: &[u8]) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == self.terminator) {
            let (line, tail) = rest.split_at(pos + 1);
            self.append(line)?;

            let data = Bytes::from(std::mem::take(&mut self.pending));
            records.push(Record::new(data)?);

            rest = tail;
        }

        if !rest.is_empty() {
            self.append(rest)?;
        }

        Ok(records)
    }

    /// Grow the pending buffer and copy `bytes` in
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let needed = self.pending.len() + bytes.len();
        if needed > self.max_record_size {
            return Err(CmdlogError::AllocationFailure(format!(
                "record of {} bytes exceeds limit of {} bytes",
                needed, self.max_record_size
            )));
        }

        self.pending.try_reserve(bytes.len()).map_err(|e| {
            CmdlogError::AllocationFailure(format!(
                "could not grow pending buffer to {} bytes: {}",
                needed, e
            ))
        })?;
        self.pending.extend_from_slice(bytes);

        Ok(())
    }

    /// Drop the pending bytes, returning how many there were
    pub fn discard(&mut self) -> usize {
        let len = self.pending.len();
        self.pending = Vec::new();
        len
    }

    /// Number of bytes waiting for a terminator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Current session state
    pub fn state(&self) -> AssemblerState {
        if self.pending.is_empty() {
            AssemblerState::Idle
        } else {
            AssemblerState::Accumulating
        }
    }

    /// The terminator byte
    pub fn terminator(&self) -> u8 {
        self.terminator
    }
}
