//! # cmdlog
//!
//! A bounded, in-memory command log with:
//! - Newline-terminated commands assembled from partial writes
//! - Oldest-first eviction once a fixed number of commands is retained
//! - Flat byte-offset reads and (command, byte) seeking
//! - A file-like handle API and a line-based TCP front end
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │          (one thread per client, timestamp writer)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 LogDevice / LogFile                          │
//! │           (read / write / seek / seek_to_command)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    AccessGuard                               │
//! │                  (single Mutex)                              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Assembler  │ ───────► │ CircularLog │
//!   │ (per writer)│  commit  │  (N slots)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod guard;
pub mod device;
pub mod protocol;
pub mod network;
pub mod timestamp;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CmdlogError, Result};
pub use config::Config;
pub use guard::AccessGuard;
pub use device::{LogDevice, LogFile};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cmdlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
