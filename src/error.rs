//! Error types for cmdlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::log::SeekError;

/// Result type alias using CmdlogError
pub type Result<T> = std::result::Result<T, CmdlogError>;

/// Unified error type for cmdlog operations
#[derive(Debug, Error)]
pub enum CmdlogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Seek error: {0}")]
    Seek(#[from] SeekError),

    #[error("Empty records cannot be stored")]
    EmptyRecord,

    #[error("Unknown writer session: {0}")]
    UnknownSession(u64),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CmdlogError> for std::io::Error {
    fn from(err: CmdlogError) -> Self {
        use std::io::ErrorKind;

        match err {
            CmdlogError::Io(e) => e,
            CmdlogError::AllocationFailure(_) => std::io::Error::new(ErrorKind::OutOfMemory, err),
            CmdlogError::Seek(_) | CmdlogError::EmptyRecord | CmdlogError::Config(_) => {
                std::io::Error::new(ErrorKind::InvalidInput, err)
            }
            CmdlogError::UnknownSession(_) => std::io::Error::new(ErrorKind::NotConnected, err),
            CmdlogError::Protocol(_) => std::io::Error::new(ErrorKind::InvalidData, err),
            CmdlogError::Network(_) => std::io::Error::other(err),
        }
    }
}
