//! Record definitions
//!
//! One completed, terminator-delimited command.

use std::fmt;

use bytes::Bytes;

use crate::error::{CmdlogError, Result};

/// A completed command held by the log
///
/// The payload is immutable and always non-empty. Cloning shares the
/// underlying buffer, so readers can hold on to a record after the lock
/// that produced it is released.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    data: Bytes,
}

impl Record {
    /// Create a record from a completed payload
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(CmdlogError::EmptyRecord);
        }
        Ok(Self { data })
    }

    /// Payload bytes, terminator included
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the record and return its payload
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("len", &self.data.len())
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}
