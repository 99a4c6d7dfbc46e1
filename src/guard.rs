//! Access Guard
//!
//! Serializes every operation on the shared log.
//!
//! ## Responsibilities
//! - Own the [`CircularLog`] and every open writer session
//! - Commit completed records and release evicted ones
//! - Answer flat-offset reads and seek requests from a consistent view

use std::collections::HashMap;
use std::io::SeekFrom;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CmdlogError, Result};
use crate::log::{
    AssemblerState, CircularLog, OffsetTranslator, Record, RecordAssembler, SeekCommand,
    SeekError,
};

/// Identifies one writer session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw numeric id (for logging)
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Result of a `write`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    /// Bytes taken from the caller (the whole chunk on success)
    pub consumed: usize,

    /// Records the chunk completed and committed
    pub committed: usize,

    /// Records evicted to make room, already released
    pub evicted: usize,
}

/// Result of a `read`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes read, empty at or past the end of the log
    pub data: Bytes,

    /// Flat offset just after the returned bytes
    pub next_offset: usize,
}

impl ReadOutcome {
    /// Whether the read hit the end of the log
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// State behind the lock
struct GuardedState {
    /// Committed records
    log: CircularLog,

    /// In-flight bytes of each open writer session
    sessions: HashMap<SessionId, RecordAssembler>,
}

/// Single mutual-exclusion domain around one log
///
/// ## Concurrency Model
///
/// Every operation takes the same `parking_lot::Mutex` for its whole
/// duration. Operations therefore serialize in acquisition order:
/// - a record becomes visible only when the write that completes it commits
/// - a read started after a write returns sees that write's records
/// - evicted records are dropped before the lock is released
///
/// Share it between threads through `Arc<AccessGuard>`.
pub struct AccessGuard {
    /// Log and sessions
    state: Mutex<GuardedState>,

    /// Next session id (lock-free)
    next_session: AtomicU64,

    /// Terminator handed to new sessions
    terminator: u8,

    /// Size bound handed to new sessions
    max_record_size: usize,
}

impl AccessGuard {
    /// Create a guard around an empty log sized by `config`
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            state: Mutex::new(GuardedState {
                log: CircularLog::new(config.capacity()?),
                sessions: HashMap::new(),
            }),
            next_session: AtomicU64::new(1),
            terminator: config.terminator,
            max_record_size: config.max_record_size,
        })
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Start a new writer session
    pub fn open_session(&self) -> SessionId {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let assembler = RecordAssembler::new(self.terminator, self.max_record_size);

        self.state.lock().sessions.insert(id, assembler);
        tracing::debug!("Opened writer session {}", id.0);

        id
    }

    /// End a writer session, discarding any unterminated bytes
    ///
    /// Returns the number of discarded bytes. Closing an unknown session is a
    /// no-op.
    pub fn close_session(&self, id: SessionId) -> usize {
        let assembler = self.state.lock().sessions.remove(&id);

        match assembler {
            Some(mut assembler) => {
                let discarded = assembler.discard();
                if discarded > 0 {
                    tracing::debug!(
                        "Closed writer session {} with {} uncommitted bytes discarded",
                        id.0,
                        discarded
                    );
                } else {
                    tracing::debug!("Closed writer session {}", id.0);
                }
                discarded
            }
            None => 0,
        }
    }

    /// State of a writer session, `None` if it is not open
    pub fn session_state(&self, id: SessionId) -> Option<AssemblerState> {
        self.state.lock().sessions.get(&id).map(|a| a.state())
    }

    /// Bytes a writer session holds without a terminator
    pub fn pending_len(&self, id: SessionId) -> Option<usize> {
        self.state.lock().sessions.get(&id).map(|a| a.pending_len())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Feed a chunk to a session and commit whatever it completes
    ///
    /// On `AllocationFailure` the session's pending bytes are gone but the
    /// session stays open and the log is untouched.
    pub fn write(&self, id: SessionId, chunk: &[u8]) -> Result<WriteOutcome> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let assembler = state
            .sessions
            .get_mut(&id)
            .ok_or(CmdlogError::UnknownSession(id.0))?;

        let records = assembler.feed(chunk)?;

        let mut outcome = WriteOutcome {
            consumed: chunk.len(),
            committed: records.len(),
            evicted: 0,
        };

        for record in records {
            let len = record.len();
            if let Some(evicted) = state.log.insert(record) {
                tracing::trace!("Evicted record of {} bytes", evicted.len());
                outcome.evicted += 1;
                drop(evicted);
            }
            tracing::trace!("Session {} committed record of {} bytes", id.0, len);
        }

        Ok(outcome)
    }

    /// Read up to `max_len` bytes starting at a flat offset
    ///
    /// The result may span several records. At or past the end of the log
    /// the result is empty, which is not an error.
    pub fn read(&self, flat_offset: usize, max_len: usize) -> ReadOutcome {
        let state = self.state.lock();
        Self::read_locked(&state.log, flat_offset, max_len)
    }

    fn read_locked(log: &CircularLog, flat_offset: usize, max_len: usize) -> ReadOutcome {
        let end = flat_offset.saturating_add(max_len).min(log.total_length());
        if max_len == 0 || flat_offset >= end {
            return ReadOutcome {
                data: Bytes::new(),
                next_offset: flat_offset,
            };
        }

        let want = end - flat_offset;
        let Some((first, within)) = log.find_by_flat_offset(flat_offset) else {
            return ReadOutcome {
                data: Bytes::new(),
                next_offset: flat_offset,
            };
        };

        // Fast path: the whole read sits inside one record
        if first.len() - within >= want {
            return ReadOutcome {
                data: first.data().slice(within..within + want),
                next_offset: end,
            };
        }

        let mut buf = BytesMut::with_capacity(want);
        let mut offset = flat_offset;
        while offset < end {
            let Some((record, within)) = log.find_by_flat_offset(offset) else {
                break;
            };
            let take = (record.len() - within).min(end - offset);
            buf.extend_from_slice(&record.data()[within..within + take]);
            offset += take;
        }

        ReadOutcome {
            data: buf.freeze(),
            next_offset: offset,
        }
    }

    /// Translate a seek command into a flat offset
    pub fn seek(&self, cmd: SeekCommand) -> std::result::Result<usize, SeekError> {
        let state = self.state.lock();
        OffsetTranslator::resolve(cmd, &state.log)
    }

    /// Resolve a standard seek from `current` against the log's length
    pub fn seek_from(&self, current: usize, pos: SeekFrom) -> std::result::Result<usize, SeekError> {
        let total = self.state.lock().log.total_length();
        OffsetTranslator::resolve_position(pos, current, total)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Sum of retained record lengths
    pub fn total_length(&self) -> usize {
        self.state.lock().log.total_length()
    }

    /// Number of retained records
    pub fn record_count(&self) -> usize {
        self.state.lock().log.len()
    }

    /// Number of record slots
    pub fn capacity(&self) -> usize {
        self.state.lock().log.capacity()
    }

    /// Number of open writer sessions
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    /// Clone of every retained record, oldest first
    pub fn snapshot(&self) -> Vec<Record> {
        self.state.lock().log.iter().cloned().collect()
    }

    /// Release every record and every session's pending bytes
    ///
    /// Returns the number of records released.
    pub fn teardown(&self) -> usize {
        let mut state = self.state.lock();

        let released = state.log.clear().len();
        let sessions = state.sessions.len();
        state.sessions.clear();

        tracing::debug!(
            "Tore down log: {} records released, {} sessions dropped",
            released,
            sessions
        );

        released
    }
}
