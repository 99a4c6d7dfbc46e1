//! Device Module
//!
//! File-like access to a shared log.
//!
//! ## Architecture
//! - [`LogDevice`]: owns the shared [`AccessGuard`], hands out handles
//! - [`LogFile`]: one open handle with its own position and writer session
//!
//! ```text
//!   LogFile ─┐
//!   LogFile ─┼──► Arc<AccessGuard> ──► CircularLog
//!   LogFile ─┘
//! ```

mod file;

pub use file::LogFile;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::guard::AccessGuard;

/// A shared log that can be opened like a file
///
/// Cloning is cheap and every clone refers to the same log.
#[derive(Clone)]
pub struct LogDevice {
    guard: Arc<AccessGuard>,
}

impl LogDevice {
    /// Create a device around an empty log
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            guard: Arc::new(AccessGuard::new(config)?),
        })
    }

    /// Open a new handle positioned at the start of the log
    pub fn open(&self) -> LogFile {
        LogFile::new(Arc::clone(&self.guard))
    }

    /// The shared guard
    pub fn guard(&self) -> &Arc<AccessGuard> {
        &self.guard
    }

    /// Release every retained record
    pub fn teardown(&self) -> usize {
        self.guard.teardown()
    }
}
