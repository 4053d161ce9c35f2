//! RESP Protocol Implementation
//!
//! The wire half of the request pipeline:
//!
//! ```text
//! bytes ──> decode() ──> Command ──> CommandHandler ──> Reply ──> encode() ──> bytes
//! ```
//!
//! ## Modules
//!
//! - `types`: `Command`, `Reply` and reply serialization
//! - `parser`: the frame decoder
//!
//! ## Example
//!
//! ```
//! use emberkv::protocol::{decode, Reply};
//!
//! let cmd = decode(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n").unwrap();
//! assert_eq!(cmd.name(), "GET");
//!
//! let bytes = Reply::bulk_string("Ariz").encode();
//! assert_eq!(bytes, b"$4\r\nAriz\r\n");
//! ```

pub mod parser;
pub mod types;

pub use parser::{decode, decode_frame, DecodeError, DecodeResult, Segment};
pub use types::{encode, Command, Reply};
