//! Timestamp Writer
//!
//! Background writer that appends a timestamp line at a fixed interval.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::device::LogDevice;
use crate::error::Result;

/// Format one timestamp line
pub fn timestamp_line<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("timestamp:{}\n", now.to_rfc2822())
}

/// Handle on the running timestamp thread
///
/// The thread writes through its own session like any other client.
pub struct TimestampWriter {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl TimestampWriter {
    /// Start writing a timestamp line every `interval`
    pub fn spawn(device: &LogDevice, interval: Duration) -> Result<Self> {
        let (stop, stopped) = channel::bounded::<()>(1);
        let mut file = device.open();

        let handle = thread::Builder::new()
            .name("timestamp-writer".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let line = timestamp_line(&Local::now());
                        match file.write_bytes(line.as_bytes()) {
                            Ok(_) => tracing::trace!("Wrote {}", line.trim_end()),
                            Err(e) => tracing::warn!("Failed to write timestamp: {}", e),
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::debug!("Timestamp writer started ({:?} interval)", interval);
        Ok(Self { stop, handle })
    }

    /// Stop the thread and wait for it
    pub fn stop(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            tracing::warn!("Timestamp writer panicked");
        }
        tracing::debug!("Timestamp writer stopped");
    }
}
