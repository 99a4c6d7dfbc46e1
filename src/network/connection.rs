//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind, SeekFrom, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::device::{LogDevice, LogFile};
use crate::error::{CmdlogError, Result};
use crate::protocol::{read_request, ReadRequest, Request};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for line framing)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// This connection's handle on the shared log
    file: LogFile,

    /// Peer address for logging
    peer_addr: String,

    /// Command terminator
    terminator: u8,

    /// Longest accepted request line
    max_line: usize,

    /// Size of each streamed response chunk
    chunk_size: usize,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and opens a log handle for the client
    pub fn new(stream: TcpStream, device: &LogDevice, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Responses go out as soon as they are complete
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            file: device.open(),
            peer_addr,
            terminator: config.terminator,
            max_line: config.max_record_size,
            chunk_size: config.send_chunk_size,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads request lines in a loop and streams the log back.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader, self.terminator, self.max_line) {
                Ok(ReadRequest::Request(request)) => request,
                Ok(ReadRequest::Partial(bytes)) => {
                    // Buffered in the session, dropped with it on close
                    self.file.write_bytes(&bytes)?;
                    tracing::debug!(
                        "Client {} disconnected with {} unterminated bytes",
                        self.peer_addr,
                        bytes.len()
                    );
                    return Ok(());
                }
                Ok(ReadRequest::Eof) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(CmdlogError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(CmdlogError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // Windows reports read timeouts as TimedOut instead of WouldBlock
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            if let Err(e) = self.execute_request(request) {
                if let CmdlogError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error serving {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Apply a request and stream the matching part of the log
    fn execute_request(&mut self, request: Request) -> Result<()> {
        match request {
            Request::Append(line) => {
                let outcome = self.file.write_bytes(&line)?;
                tracing::debug!(
                    "Client {} appended {} bytes ({} committed, {} evicted)",
                    self.peer_addr,
                    outcome.consumed,
                    outcome.committed,
                    outcome.evicted
                );
                self.file.seek_to(SeekFrom::Start(0))?;
                self.send_from_position()
            }
            Request::SeekTo(cmd) => {
                match self.file.seek_to_command(cmd.command_index, cmd.byte_offset) {
                    Ok(position) => {
                        tracing::debug!(
                            "Client {} seeked to command {} byte {} (offset {})",
                            self.peer_addr,
                            cmd.command_index,
                            cmd.byte_offset,
                            position
                        );
                        self.send_from_position()
                    }
                    Err(CmdlogError::Seek(e)) => {
                        tracing::warn!("Rejected seek from {}: {}", self.peer_addr, e);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Stream the log from the handle's position to the end
    fn send_from_position(&mut self) -> Result<()> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut sent = 0usize;

        loop {
            let n = self.file.read_bytes(&mut buf);
            if n == 0 {
                break;
            }
            self.writer.write_all(&buf[..n])?;
            sent += n;
        }
        self.writer.flush()?;

        tracing::trace!("Sent {} bytes to {}", sent, self.peer_addr);
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
