//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - One handler thread per connection
//! - Every connection owns its own [`LogFile`](crate::device::LogFile)

mod server;
mod connection;

pub use server::Server;
pub use connection::Connection;
