//! TCP Server
//!
//! Accepts connections and runs one handler thread per client.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::device::LogDevice;
use crate::error::{CmdlogError, Result};
use crate::timestamp::TimestampWriter;

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for cmdlog
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared log
    device: LogDevice,

    /// Bound listener (non-blocking)
    listener: TcpListener,

    /// Set to stop the accept loop
    shutdown: Arc<AtomicBool>,

    /// Connections currently being handled
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, device: LogDevice) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            CmdlogError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            device,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Number of connections being handled right now
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Handler threads still serving clients at shutdown are left to finish
    /// on their own.
    pub fn run(&mut self) -> Result<()> {
        let timestamps = match self.config.timestamp_interval() {
            Some(interval) => Some(TimestampWriter::spawn(&self.device, interval)?),
            None => None,
        };

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }

        if let Some(writer) = timestamps {
            writer.stop();
        }

        tracing::info!(
            "Server shut down with {} connections still open",
            self.active.load(Ordering::Relaxed)
        );
        Ok(())
    }

    /// Hand an accepted stream to its own handler thread
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        if self.active.load(Ordering::Relaxed) >= self.config.max_connections {
            tracing::warn!(
                "Refusing {}: {} connections already open",
                addr,
                self.config.max_connections
            );
            return;
        }

        // Accepted sockets inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure stream from {}: {}", addr, e);
            return;
        }

        tracing::info!("Accepted connection from {}", addr);

        let device = self.device.clone();
        let config = self.config.clone();
        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::Relaxed);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || {
                match serve(stream, &device, &config) {
                    Ok(()) => tracing::info!("Closed connection from {}", addr),
                    Err(e) => tracing::warn!("Connection from {} ended with error: {}", addr, e),
                }
                active.fetch_sub(1, Ordering::Relaxed);
            });

        if let Err(e) = spawned {
            self.active.fetch_sub(1, Ordering::Relaxed);
            tracing::warn!("Failed to spawn handler for {}: {}", addr, e);
        }
    }
}

/// Run one connection to completion
fn serve(stream: TcpStream, device: &LogDevice, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, device, config)?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.handle()
}
