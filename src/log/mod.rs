//! Log Module
//!
//! The bounded command log and the pieces that feed and address it.
//!
//! ## Responsibilities
//! - Assemble terminator-delimited commands from partial writes
//! - Retain the most recent N commands, evicting the oldest first
//! - Address retained bytes by flat offset or by (command, byte) pair
//!
//! ## Layout
//! ```text
//!             read_index                 write_index
//!                 │                          │
//!   ┌────────┬────▼───┬────────┬────────┬────▼───┐
//!   │ (free) │ cmd 0  │ cmd 1  │ cmd 2  │ (free) │
//!   └────────┴────────┴────────┴────────┴────────┘
//!   flat offset 0 ──► first byte of cmd 0, then cmd 1 ...
//! ```
//!
//! None of these types lock. Callers share them through
//! [`AccessGuard`](crate::guard::AccessGuard).

mod record;
mod circular;
mod assembler;
mod offset;

pub use record::Record;
pub use circular::{CircularLog, Iter, DEFAULT_CAPACITY};
pub use assembler::{AssemblerState, RecordAssembler};
pub use offset::{OffsetTranslator, SeekCommand, SeekError};
