//! Request definitions
//!
//! Represents requests from clients.

use crate::log::SeekCommand;

/// Prefix that turns a line into a seek request instead of a log entry
pub const SEEK_PREFIX: &[u8] = b"AESDCHAR_IOCSEEKTO:";

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Append the line (terminator included) to the log
    Append(Vec<u8>),

    /// Seek to a retained command and stream from there
    SeekTo(SeekCommand),
}

impl Request {
    /// Whether this request changes the log
    pub fn is_append(&self) -> bool {
        matches!(self, Request::Append(_))
    }
}
