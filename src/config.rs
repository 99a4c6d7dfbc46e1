//! Configuration for cmdlog
//!
//! Centralized configuration with sensible defaults.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::{CmdlogError, Result};

/// Main configuration for a cmdlog instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// Number of completed commands retained before the oldest is evicted
    pub capacity: usize,

    /// Byte that terminates a command
    pub terminator: u8,

    /// Upper bound on a single command, including its pending bytes (in bytes)
    pub max_record_size: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Size of each chunk streamed back to clients (in bytes)
    pub send_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Background Writer Configuration
    // -------------------------------------------------------------------------
    /// Seconds between timestamp lines (0 disables the timestamp writer)
    pub timestamp_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 10,
            terminator: b'\n',
            max_record_size: 16 * 1024 * 1024, // 16 MB
            listen_addr: "0.0.0.0:9000".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            send_chunk_size: 1024,
            timestamp_interval_secs: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values that would otherwise break the log at runtime
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CmdlogError::Config("capacity must be at least 1".to_string()));
        }
        if self.max_record_size == 0 {
            return Err(CmdlogError::Config(
                "max_record_size must be at least 1 byte".to_string(),
            ));
        }
        if self.send_chunk_size == 0 {
            return Err(CmdlogError::Config(
                "send_chunk_size must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }

    /// Capacity as a non-zero value, failing for configs that skipped validation
    pub fn capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity)
            .ok_or_else(|| CmdlogError::Config("capacity must be at least 1".to_string()))
    }

    /// Interval of the timestamp writer, if enabled
    pub fn timestamp_interval(&self) -> Option<Duration> {
        if self.timestamp_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timestamp_interval_secs))
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of retained commands
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the command terminator byte
    pub fn terminator(mut self, terminator: u8) -> Self {
        self.config.terminator = terminator;
        self
    }

    /// Set the maximum size of a single command (in bytes)
    pub fn max_record_size(mut self, size: usize) -> Self {
        self.config.max_record_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the size of response chunks (in bytes)
    pub fn send_chunk_size(mut self, size: usize) -> Self {
        self.config.send_chunk_size = size;
        self
    }

    /// Set the timestamp interval (in seconds, 0 disables)
    pub fn timestamp_interval_secs(mut self, secs: u64) -> Self {
        self.config.timestamp_interval_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
