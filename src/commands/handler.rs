//! Command Handler
//!
//! Validates a decoded [`Command`] and executes it against the storage engine.
//!
//! ## Supported Commands
//!
//! - `PING` - Returns `PONG`
//! - `ECHO message` - Returns the message
//! - `SET key value [EX seconds | PX milliseconds]` - Set a key
//! - `GET key` - Get a key's value (empty bulk string when missing)
//! - `DEL key [key ...]` - Delete keys, returning how many existed
//!
//! Command names are matched exactly as sent. Anything else is answered with
//! `ERR unknown command` and touches nothing.

use crate::protocol::{decode, Command, DecodeError, Reply};
use crate::storage::StorageEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

const ERR_SYNTAX: &str = "ERR syntax error";
const ERR_NOT_INTEGER: &str = "ERR value is not an integer or out of range";

fn wrong_arity(cmd: &str) -> Reply {
    Reply::error(format!("ERR wrong number of arguments for '{}' command", cmd))
}

/// Handles commands by dispatching them to the appropriate handlers.
#[derive(Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// The storage engine this handler executes against.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Executes a command and returns the reply.
    ///
    /// Never fails: misuse of a command is reported as an error reply.
    pub fn execute(&self, command: &Command) -> Reply {
        let args = command.args();

        trace!(command = command.name(), args = args.len(), "Executing command");

        match command.name() {
            "PING" => self.cmd_ping(args),
            "ECHO" => self.cmd_echo(args),
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            _ => Reply::error("ERR unknown command"),
        }
    }

    /// Runs one frame through decode, execute and encode.
    ///
    /// A frame that fails to decode never reaches the store. The error is
    /// returned for the caller to report; it is not encoded as a reply.
    pub fn process(&self, frame: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let command = decode(frame)?;
        Ok(self.execute(&command).encode())
    }

    /// PING
    fn cmd_ping(&self, _args: &[String]) -> Reply {
        Reply::pong()
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[String]) -> Reply {
        match args {
            [message] => Reply::bulk_string(message.clone()),
            _ => wrong_arity("ECHO"),
        }
    }

    /// SET key value [EX seconds] [PX milliseconds]
    ///
    /// Unrecognized trailing words are skipped. All options are validated
    /// before the store is touched.
    fn cmd_set(&self, args: &[String]) -> Reply {
        let [key, value, options @ ..] = args else {
            return wrong_arity("SET");
        };

        let mut ttl: Option<Duration> = None;

        let mut i = 0;
        while i < options.len() {
            let opt = options[i].as_str();
            let to_duration: fn(u64) -> Duration = if opt.eq_ignore_ascii_case("EX") {
                Duration::from_secs
            } else if opt.eq_ignore_ascii_case("PX") {
                Duration::from_millis
            } else {
                i += 1;
                continue;
            };

            let Some(operand) = options.get(i + 1) else {
                return Reply::error(ERR_SYNTAX);
            };

            match parse_positive(operand) {
                Some(n) => ttl = Some(to_duration(n)),
                None => return Reply::error(ERR_NOT_INTEGER),
            }
            i += 2;
        }

        self.storage.set(key.clone(), value.clone(), ttl);
        Reply::ok()
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> Reply {
        let [key] = args else {
            return wrong_arity("GET");
        };

        match self.storage.get(key) {
            Some(value) => Reply::bulk_string(value),
            None => Reply::empty_bulk(),
        }
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[String]) -> Reply {
        if args.is_empty() {
            return wrong_arity("DEL");
        }

        let deleted = self.storage.delete_many(args);
        Reply::integer(deleted as i64)
    }
}

/// Parses a strictly positive integer operand.
fn parse_positive(s: &str) -> Option<u64> {
    s.parse::<i64>().ok().filter(|n| *n > 0).map(|n| n as u64)
}
