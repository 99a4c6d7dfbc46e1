//! Offset translation
//!
//! Converts structured and origin-relative positions into flat offsets.

use std::io::SeekFrom;

use thiserror::Error;

use super::CircularLog;

/// Why a seek target was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeekError {
    #[error("command index {index} is not retained ({count} commands in log)")]
    InvalidCommandIndex { index: u32, count: usize },

    #[error("byte offset {offset} is outside command {index} of {len} bytes")]
    InvalidOffset { index: u32, offset: u32, len: usize },

    #[error("position {position} is outside 0..={total}")]
    OutOfRange { position: i128, total: usize },
}

/// A (command index, byte within command) seek target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekCommand {
    /// Retained command to seek to, oldest = 0
    pub command_index: u32,

    /// Byte inside that command
    pub byte_offset: u32,
}

impl SeekCommand {
    pub fn new(command_index: u32, byte_offset: u32) -> Self {
        Self {
            command_index,
            byte_offset,
        }
    }
}

/// Stateless position arithmetic over a [`CircularLog`]
pub struct OffsetTranslator;

impl OffsetTranslator {
    /// Translate a seek command into a flat offset
    ///
    /// The result is the length of every command before `command_index`
    /// plus `byte_offset`, which must fall inside the target command.
    pub fn resolve(cmd: SeekCommand, log: &CircularLog) -> Result<usize, SeekError> {
        let target = log
            .nth_occupied(cmd.command_index)
            .ok_or(SeekError::InvalidCommandIndex {
                index: cmd.command_index,
                count: log.len(),
            })?;

        let byte_offset = cmd.byte_offset as usize;
        if byte_offset >= target.len() {
            return Err(SeekError::InvalidOffset {
                index: cmd.command_index,
                offset: cmd.byte_offset,
                len: target.len(),
            });
        }

        let preceding: usize = log
            .iter()
            .take(cmd.command_index as usize)
            .map(|record| record.len())
            .sum();

        Ok(preceding + byte_offset)
    }

    /// Resolve a standard seek against the current position and total length
    ///
    /// Positions past `total` are rejected along with negative ones.
    pub fn resolve_position(pos: SeekFrom, current: usize, total: usize) -> Result<usize, SeekError> {
        let position: i128 = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => current as i128 + i128::from(delta),
            SeekFrom::End(delta) => total as i128 + i128::from(delta),
        };

        if position < 0 || position > total as i128 {
            return Err(SeekError::OutOfRange { position, total });
        }

        Ok(position as usize)
    }
}
