//! Protocol codec
//!
//! Framing and parsing for request lines.

use std::io::{BufRead, Read, Write};

use crate::error::{CmdlogError, Result};
use crate::log::SeekCommand;

use super::{Request, SEEK_PREFIX};

/// What `read_request` found on the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadRequest {
    /// A complete, terminated request
    Request(Request),

    /// The stream ended after these unterminated bytes
    Partial(Vec<u8>),

    /// The stream ended cleanly
    Eof,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse one complete line, terminator included
///
/// Lines starting with [`SEEK_PREFIX`] must carry `X,Y` as decimal `u32`s;
/// every other line is an append.
pub fn parse_request(line: &[u8], terminator: u8) -> Result<Request> {
    let Some(args) = line.strip_prefix(SEEK_PREFIX) else {
        return Ok(Request::Append(line.to_vec()));
    };

    let args = args.strip_suffix(&[terminator]).unwrap_or(args);
    let args = args.strip_suffix(b"\r").unwrap_or(args);
    let args = std::str::from_utf8(args)
        .map_err(|_| CmdlogError::Protocol("seek arguments are not UTF-8".to_string()))?;

    let (index, offset) = args.split_once(',').ok_or_else(|| {
        CmdlogError::Protocol(format!("seek arguments '{}' are not of the form X,Y", args))
    })?;

    let command_index = index.trim().parse::<u32>().map_err(|e| {
        CmdlogError::Protocol(format!("invalid seek command index '{}': {}", index, e))
    })?;
    let byte_offset = offset.trim().parse::<u32>().map_err(|e| {
        CmdlogError::Protocol(format!("invalid seek byte offset '{}': {}", offset, e))
    })?;

    Ok(Request::SeekTo(SeekCommand::new(command_index, byte_offset)))
}

/// Encode a request as a line
pub fn encode_request(request: &Request, terminator: u8) -> Vec<u8> {
    match request {
        Request::Append(data) => {
            let mut line = data.clone();
            if line.last() != Some(&terminator) {
                line.push(terminator);
            }
            line
        }
        Request::SeekTo(cmd) => {
            let mut line = SEEK_PREFIX.to_vec();
            line.extend_from_slice(format!("{},{}", cmd.command_index, cmd.byte_offset).as_bytes());
            line.push(terminator);
            line
        }
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read the next request line from a stream
///
/// Blocks until a terminator or end of stream. Lines longer than `max_len`
/// bytes are a protocol error.
pub fn read_request<R: BufRead>(reader: &mut R, terminator: u8, max_len: usize) -> Result<ReadRequest> {
    let mut line = Vec::new();
    // One extra byte tells an overlong line apart from one that fits exactly
    let limit = max_len.saturating_add(1) as u64;
    reader.by_ref().take(limit).read_until(terminator, &mut line)?;

    if line.len() > max_len {
        return Err(CmdlogError::Protocol(format!(
            "request line exceeds {} bytes",
            max_len
        )));
    }

    if line.last() == Some(&terminator) {
        return Ok(ReadRequest::Request(parse_request(&line, terminator)?));
    }

    if line.is_empty() {
        Ok(ReadRequest::Eof)
    } else {
        Ok(ReadRequest::Partial(line))
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request, terminator: u8) -> Result<()> {
    let bytes = encode_request(request, terminator);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
