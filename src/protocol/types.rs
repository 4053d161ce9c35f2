//! RESP Data Types
//!
//! This module defines the two values that travel through the request pipeline:
//!
//! - [`Command`]: what the decoder produces from an incoming frame
//! - [`Reply`]: what the command handler produces, serialized back to the wire
//!
//! ## Protocol Format
//!
//! Each frame starts with a type prefix byte:
//! - `+` Simple String
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk String
//! - `*` Array
//!
//! All textual fields are terminated with CRLF (`\r\n`).
//!
//! ## Examples
//!
//! Simple String: `+OK\r\n`
//! Error: `-ERR unknown command\r\n`
//! Integer: `:1\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Array: `*2\r\n$3\r\nGET\r\n$4\r\nname\r\n`

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A decoded command invocation: the command name and its arguments in order.
///
/// The name is kept exactly as received. No case folding happens here or in
/// the command handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Creates a command from a name and its arguments.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The empty command, produced by null or empty frames.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a command from a list of frame elements. The first element is
    /// the name, the rest are arguments.
    pub fn from_parts(mut parts: Vec<String>) -> Self {
        if parts.is_empty() {
            return Self::empty();
        }
        let args = parts.split_off(1);
        let name = parts.pop().unwrap_or_default();
        Self { name, args }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns true for the empty command.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.args.is_empty()
    }

    /// Encodes the command the way clients send it: an array of bulk strings.
    pub fn to_frame(&self) -> Vec<u8> {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(Reply::bulk_string(self.name.clone()));
        parts.extend(self.args.iter().cloned().map(Reply::BulkString));
        Reply::array(parts).encode()
    }
}

/// A typed reply produced by the command handler.
///
/// Every variant carries its own payload, so the encoder never has to check
/// that a type tag matches the value it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Format: `-<error message>\r\n`
    Error(String),

    /// Format: `:<integer>\r\n`
    Integer(i64),

    /// Format: `$<length>\r\n<data>\r\n`
    ///
    /// A missing value is an empty bulk string (`$0\r\n\r\n`).
    BulkString(String),

    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Vec<Reply>),
}

impl Reply {
    /// Creates a new simple string reply.
    ///
    /// # Example
    /// ```
    /// use emberkv::protocol::types::Reply;
    /// let ok = Reply::simple_string("OK");
    /// ```
    pub fn simple_string(s: impl Into<String>) -> Self {
        Reply::SimpleString(s.into())
    }

    /// Creates a new error reply.
    ///
    /// # Example
    /// ```
    /// use emberkv::protocol::types::Reply;
    /// let err = Reply::error("ERR unknown command");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    pub fn bulk_string(s: impl Into<String>) -> Self {
        Reply::BulkString(s.into())
    }

    pub fn array(values: Vec<Reply>) -> Self {
        Reply::Array(values)
    }

    /// The empty bulk string, used for keys that are absent or expired.
    pub fn empty_bulk() -> Self {
        Reply::BulkString(String::new())
    }

    pub fn ok() -> Self {
        Reply::SimpleString("OK".to_string())
    }

    pub fn pong() -> Self {
        Reply::SimpleString("PONG".to_string())
    }

    /// Serializes the reply to bytes for sending over the wire.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::SimpleString(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::BulkString(s) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(s.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Array(values) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.encode_into(buf);
                }
            }
        }
    }
}

/// Serializes a reply. Free-function form of [`Reply::encode`].
pub fn encode(reply: &Reply) -> Vec<u8> {
    reply.encode()
}
