//! Log File Handle
//!
//! One open handle on a [`LogDevice`](super::LogDevice).

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use crate::error::Result;
use crate::guard::{AccessGuard, SessionId, WriteOutcome};
use crate::log::SeekCommand;

/// An open handle on the shared log
///
/// Each handle has its own read position and its own writer session, so
/// unterminated writes on one handle never mix with another's. Dropping the
/// handle closes the session and discards its pending bytes.
pub struct LogFile {
    /// Shared log
    guard: Arc<AccessGuard>,

    /// Writer session owned by this handle
    session: SessionId,

    /// Flat read position
    position: usize,
}

impl LogFile {
    pub(crate) fn new(guard: Arc<AccessGuard>) -> Self {
        let session = guard.open_session();
        Self {
            guard,
            session,
            position: 0,
        }
    }

    /// Read from the current position into `buf`
    ///
    /// Returns 0 at or past the end of the log.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let outcome = self.guard.read(self.position, buf.len());
        let n = outcome.data.len();

        buf[..n].copy_from_slice(&outcome.data);
        self.position = outcome.next_offset;

        n
    }

    /// Feed bytes to this handle's writer session
    ///
    /// All of `buf` is accepted on success; unterminated bytes wait for a
    /// later write.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<WriteOutcome> {
        self.guard.write(self.session, buf)
    }

    /// Move the read position, returning the new position
    pub fn seek_to(&mut self, pos: SeekFrom) -> Result<u64> {
        self.position = self.guard.seek_from(self.position, pos)?;
        Ok(self.position as u64)
    }

    /// Move the read position to a byte inside a retained command
    ///
    /// The offset comes from a single locked view of the log and is taken
    /// as-is; it is not checked again against a later total length.
    pub fn seek_to_command(&mut self, command_index: u32, byte_offset: u32) -> Result<u64> {
        self.position = self.guard.seek(SeekCommand::new(command_index, byte_offset))?;
        Ok(self.position as u64)
    }

    /// Current flat read position
    pub fn position(&self) -> u64 {
        self.position as u64
    }

    /// This handle's writer session
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Bytes written on this handle that still wait for a terminator
    pub fn pending_len(&self) -> usize {
        self.guard.pending_len(self.session).unwrap_or(0)
    }

    /// Close the handle, returning how many unterminated bytes were discarded
    pub fn close(self) -> usize {
        // Drop runs afterwards and finds the session already gone
        self.guard.close_session(self.session)
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        self.guard.close_session(self.session);
    }
}

impl Read for LogFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf))
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let outcome = self.write_bytes(buf)?;
        Ok(outcome.consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for LogFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.seek_to(pos)?)
    }
}
