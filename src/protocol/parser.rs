//! RESP Frame Decoder
//!
//! Turns one wire frame into a [`Command`]. The decoder dispatches on the first
//! byte of the buffer:
//!
//! | Prefix | Result |
//! |--------|--------|
//! | `+`    | the line becomes the command name, no arguments |
//! | `-`    | always fails with `received error: <payload>` |
//! | `:`    | the digits become the command name verbatim, no arguments |
//! | `$`    | the payload becomes the command name; `$-1` is the empty command |
//! | `*`    | bulk string elements; the first is the name, the rest are arguments |
//!
//! ## Incomplete Input
//!
//! The decoder works on a single buffer and never waits for more data. A
//! truncated frame is a [`DecodeError`] like any other, but
//! [`DecodeError::is_incomplete`] tells a buffering caller that appending more
//! bytes could still produce a valid frame. [`decode_frame`] also returns how
//! many bytes the frame occupied so that caller can consume exactly one frame.

use crate::protocol::types::{prefix, Command, CRLF};
use std::fmt;
use thiserror::Error;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// The part of a frame an error was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    SimpleString,
    Error,
    Integer,
    BulkString,
    Array,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::SimpleString => "simple string",
            Segment::Error => "error",
            Segment::Integer => "integer",
            Segment::BulkString => "bulk string",
            Segment::Array => "array",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input buffer is empty
    #[error("empty input")]
    EmptyInput,

    /// The peer sent an error frame
    #[error("received error: {0}")]
    ErrorFrame(String),

    /// Unknown type prefix byte
    #[error("unknown wire type: {0}")]
    UnknownType(char),

    /// A line-based frame has no terminator
    #[error("malformed {0}: missing terminator")]
    Unterminated(Segment),

    /// A length or count field has no terminator
    #[error("malformed {segment}: missing {field} delimiter")]
    MissingDelimiter {
        segment: Segment,
        field: &'static str,
    },

    /// A length or count field is not a decimal number
    #[error("malformed {segment}: invalid {field}")]
    InvalidLength {
        segment: Segment,
        field: &'static str,
    },

    /// Fewer bytes remain than the frame declares
    #[error("malformed {0}: insufficient data")]
    InsufficientData(Segment),

    /// A bulk payload is not followed by CRLF
    #[error("malformed {0}: payload not followed by terminator")]
    BadTerminator(Segment),

    /// An array element does not start with `$`
    #[error("malformed array: expected bulk string")]
    ExpectedBulkString,

    /// The declared payload exceeds [`MAX_BULK_SIZE`]
    #[error("malformed {segment}: length {size} exceeds maximum {max}")]
    TooLarge {
        segment: Segment,
        size: usize,
        max: usize,
    },

    /// Invalid UTF-8 in a command name or argument
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl DecodeError {
    /// Returns true if more bytes appended to the same buffer could still
    /// complete the frame.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            DecodeError::Unterminated(_)
                | DecodeError::MissingDelimiter { .. }
                | DecodeError::InsufficientData(_)
        )
    }
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decoded length or count field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Null,
    Value(usize),
}

/// Decodes a buffer holding one frame into a command.
///
/// Bytes after the end of the first frame are ignored.
///
/// # Example
///
/// ```
/// use emberkv::protocol::decode;
///
/// let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$5\r\nHello\r\n").unwrap();
/// assert_eq!(cmd.name(), "ECHO");
/// assert_eq!(cmd.args(), &["Hello".to_string()]);
/// ```
pub fn decode(buf: &[u8]) -> DecodeResult<Command> {
    decode_frame(buf).map(|(command, _)| command)
}

/// Decodes the frame at the start of `buf`.
///
/// Returns the command and the number of bytes the frame occupied.
pub fn decode_frame(buf: &[u8]) -> DecodeResult<(Command, usize)> {
    let Some(&tag) = buf.first() else {
        return Err(DecodeError::EmptyInput);
    };

    match tag {
        prefix::SIMPLE_STRING => {
            let (line, consumed) = read_line(buf, Segment::SimpleString)?;
            Ok((Command::new(to_string(line)?, Vec::new()), consumed))
        }
        prefix::ERROR => {
            let (line, _) = read_line(buf, Segment::Error)?;
            Err(DecodeError::ErrorFrame(
                String::from_utf8_lossy(line).into_owned(),
            ))
        }
        prefix::INTEGER => {
            let (line, consumed) = read_line(buf, Segment::Integer)?;
            Ok((Command::new(to_string(line)?, Vec::new()), consumed))
        }
        prefix::BULK_STRING => {
            let (name, consumed) = read_bulk(buf, 0, Segment::BulkString)?;
            Ok((Command::new(name, Vec::new()), consumed))
        }
        prefix::ARRAY => decode_array(buf),
        other => Err(DecodeError::UnknownType(char::from(other))),
    }
}

/// Decodes an array of bulk strings: `*<count>\r\n$<len>\r\n<data>\r\n...`
fn decode_array(buf: &[u8]) -> DecodeResult<(Command, usize)> {
    debug_assert!(buf[0] == prefix::ARRAY);

    let (count, mut pos) = read_length(buf, 1, Segment::Array, "count")?;
    let count = match count {
        Length::Null | Length::Value(0) => return Ok((Command::empty(), pos)),
        Length::Value(n) => n,
    };

    // The count is untrusted, so don't let it size the allocation
    let mut parts = Vec::with_capacity(count.min(16));

    for _ in 0..count {
        match buf.get(pos) {
            None => return Err(DecodeError::InsufficientData(Segment::Array)),
            Some(&prefix::BULK_STRING) => {}
            Some(_) => return Err(DecodeError::ExpectedBulkString),
        }

        let (part, next) = read_bulk(buf, pos, Segment::Array)?;
        parts.push(part);
        pos = next;
    }

    Ok((Command::from_parts(parts), pos))
}

/// Reads the line after a one-byte prefix: `<prefix><line>\r\n`
fn read_line(buf: &[u8], segment: Segment) -> DecodeResult<(&[u8], usize)> {
    match find_crlf(&buf[1..]) {
        Some(pos) => Ok((&buf[1..1 + pos], 1 + pos + 2)),
        None => Err(DecodeError::Unterminated(segment)),
    }
}

/// Reads a bulk string starting at `start`, which must point at the `$`.
///
/// Returns the payload and the position just past its trailing CRLF.
fn read_bulk(buf: &[u8], start: usize, segment: Segment) -> DecodeResult<(String, usize)> {
    debug_assert!(buf[start] == prefix::BULK_STRING);

    let (length, data_start) = read_length(buf, start + 1, segment, "length")?;
    let length = match length {
        Length::Null => return Ok((String::new(), data_start)),
        Length::Value(n) => n,
    };

    if length > MAX_BULK_SIZE {
        return Err(DecodeError::TooLarge {
            segment,
            size: length,
            max: MAX_BULK_SIZE,
        });
    }

    let data_end = data_start + length;
    if buf.len() < data_end + CRLF.len() {
        return Err(DecodeError::InsufficientData(segment));
    }

    if &buf[data_end..data_end + CRLF.len()] != CRLF {
        return Err(DecodeError::BadTerminator(segment));
    }

    let payload = to_string(&buf[data_start..data_end])?;
    Ok((payload, data_end + CRLF.len()))
}

/// Reads a decimal length field starting at `start` and ending at the next CRLF.
///
/// Only ASCII digits are accepted, apart from the literal `-1` (null).
fn read_length(
    buf: &[u8],
    start: usize,
    segment: Segment,
    field: &'static str,
) -> DecodeResult<(Length, usize)> {
    let rest = buf.get(start..).unwrap_or_default();
    let end = find_crlf(rest).ok_or(DecodeError::MissingDelimiter { segment, field })?;
    let digits = &rest[..end];
    let next = start + end + CRLF.len();

    if digits == b"-1" {
        return Ok((Length::Null, next));
    }

    let invalid = DecodeError::InvalidLength { segment, field };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid);
    }

    // All ASCII digits, so only overflow can fail here
    let n = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(invalid)?;

    Ok((Length::Value(n), next))
}

fn to_string(bytes: &[u8]) -> DecodeResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<&str> {
        cmd.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_decode_ping_array() {
        let cmd = decode(b"*1\r\n$4\r\nPING\r\n").unwrap();
        assert_eq!(cmd.name(), "PING");
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_decode_echo_array() {
        let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$5\r\nHello\r\n").unwrap();
        assert_eq!(cmd.name(), "ECHO");
        assert_eq!(args(&cmd), vec!["Hello"]);
    }

    #[test]
    fn test_decode_set_with_options() {
        let input = b"*5\r\n$3\r\nSET\r\n$8\r\nuser:101\r\n$4\r\nAriz\r\n$2\r\nPX\r\n$3\r\n100\r\n";
        let (cmd, consumed) = decode_frame(input).unwrap();
        assert_eq!(cmd.name(), "SET");
        assert_eq!(args(&cmd), vec!["user:101", "Ariz", "PX", "100"]);
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_decode_command_case_is_preserved() {
        let cmd = decode(b"*1\r\n$4\r\nping\r\n").unwrap();
        assert_eq!(cmd.name(), "ping");
    }

    #[test]
    fn test_decode_simple_string() {
        let (cmd, consumed) = decode_frame(b"+PING\r\n").unwrap();
        assert_eq!(cmd.name(), "PING");
        assert!(cmd.args().is_empty());
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_decode_integer_is_verbatim() {
        let cmd = decode(b":0042\r\n").unwrap();
        assert_eq!(cmd.name(), "0042");
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_decode_error_frame() {
        let err = decode(b"-ERR boom\r\n").unwrap_err();
        assert_eq!(err, DecodeError::ErrorFrame("ERR boom".to_string()));
        assert_eq!(err.to_string(), "received error: ERR boom");
    }

    #[test]
    fn test_decode_unterminated_error_frame() {
        let err = decode(b"-ERR").unwrap_err();
        assert_eq!(err, DecodeError::Unterminated(Segment::Error));
        assert_eq!(err.to_string(), "malformed error: missing terminator");
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_decode_bulk_string() {
        let (cmd, consumed) = decode_frame(b"$4\r\nPING\r\n").unwrap();
        assert_eq!(cmd.name(), "PING");
        assert_eq!(consumed, 10);
    }

    #[test]
    fn test_decode_null_bulk_string() {
        let cmd = decode(b"$-1\r\n").unwrap();
        assert!(cmd.is_empty());
    }

    #[test]
    fn test_decode_empty_bulk_string() {
        let cmd = decode(b"$0\r\n\r\n").unwrap();
        assert!(cmd.is_empty());
    }

    #[test]
    fn test_decode_null_and_empty_array() {
        assert!(decode(b"*-1\r\n").unwrap().is_empty());
        assert!(decode(b"*0\r\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_null_element_is_empty_argument() {
        let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$-1\r\n").unwrap();
        assert_eq!(args(&cmd), vec![""]);
    }

    #[test]
    fn test_decode_binary_payload_with_crlf_inside() {
        let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$4\r\na\r\nb\r\n").unwrap();
        assert_eq!(args(&cmd), vec!["a\r\nb"]);
    }

    #[test]
    fn test_decode_empty_input() {
        let err = decode(b"").unwrap_err();
        assert_eq!(err, DecodeError::EmptyInput);
        assert_eq!(err.to_string(), "empty input");
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = decode(b"@PING\r\n").unwrap_err();
        assert_eq!(err, DecodeError::UnknownType('@'));
        assert_eq!(err.to_string(), "unknown wire type: @");
    }

    #[test]
    fn test_decode_invalid_array_count() {
        let err = decode(b"*x\r\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed array: invalid count");
        assert!(!err.is_incomplete());
    }

    #[test]
    fn test_decode_negative_count_other_than_null() {
        let err = decode(b"*-2\r\n").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { .. }));
    }

    #[test]
    fn test_decode_invalid_bulk_length() {
        let err = decode(b"$1a\r\nx\r\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed bulk string: invalid length");

        let err = decode(b"$\r\n\r\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed bulk string: invalid length");
    }

    #[test]
    fn test_decode_overflowing_length() {
        let err = decode(b"*99999999999999999999999999\r\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed array: invalid count");
    }

    #[test]
    fn test_decode_too_large_bulk() {
        let err = decode(b"$600000000\r\n").unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge { .. }));
    }

    #[test]
    fn test_decode_missing_delimiters() {
        let err = decode(b"*1").unwrap_err();
        assert_eq!(err.to_string(), "malformed array: missing count delimiter");
        assert!(err.is_incomplete());

        let err = decode(b"$5").unwrap_err();
        assert_eq!(err.to_string(), "malformed bulk string: missing length delimiter");
        assert!(err.is_incomplete());

        let err = decode(b"+PING").unwrap_err();
        assert_eq!(err, DecodeError::Unterminated(Segment::SimpleString));
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_decode_insufficient_data() {
        let err = decode(b"$5\r\nhel").unwrap_err();
        assert_eq!(err.to_string(), "malformed bulk string: insufficient data");
        assert!(err.is_incomplete());

        let err = decode(b"*2\r\n$3\r\nGET\r\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed array: insufficient data");
        assert!(err.is_incomplete());

        let err = decode(b"*2\r\n$3\r\nGET\r\n$4\r\nna").unwrap_err();
        assert_eq!(err, DecodeError::InsufficientData(Segment::Array));
    }

    #[test]
    fn test_decode_array_element_not_bulk() {
        let err = decode(b"*2\r\n$3\r\nGET\r\n:1\r\n").unwrap_err();
        assert_eq!(err, DecodeError::ExpectedBulkString);
        assert!(!err.is_incomplete());
    }

    #[test]
    fn test_decode_payload_without_terminator() {
        let err = decode(b"$3\r\nabcde\r\n").unwrap_err();
        assert_eq!(err, DecodeError::BadTerminator(Segment::BulkString));
        assert!(!err.is_incomplete());
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode(b"*1\r\n$2\r\n\xff\xfe\r\n").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8(_)));
    }

    #[test]
    fn test_decode_frame_leaves_trailing_bytes() {
        let input = b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n";
        let (cmd, consumed) = decode_frame(input).unwrap();
        assert_eq!(cmd.name(), "PING");
        assert_eq!(consumed, input.len() / 2);
    }

    #[test]
    fn test_decode_client_frame() {
        let sent = Command::new("SET", vec!["k".into(), "v".into()]);
        assert_eq!(decode(&sent.to_frame()).unwrap(), sent);
    }
}
