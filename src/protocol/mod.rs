//! Protocol Module
//!
//! Defines the line protocol spoken by the TCP front end.
//!
//! ## Request Format
//! ```text
//! ┌─────────────────────────────────────┬────┐
//! │          Line bytes                 │ \n │
//! └─────────────────────────────────────┴────┘
//! ```
//!
//! ### Requests
//! - `AESDCHAR_IOCSEEKTO:X,Y` - seek to byte Y of retained command X, then
//!   stream the log from there to the end
//! - anything else - append the line to the log, then stream the whole log
//!
//! ## Response Format
//! Raw log bytes, no framing. Clients half-close their side and read until
//! the server closes the connection.

mod request;
mod codec;

pub use request::{Request, SEEK_PREFIX};
pub use codec::{encode_request, parse_request, read_request, write_request, ReadRequest};
