//! # emberkv - A Small In-Memory Key-Value Server
//!
//! emberkv keeps string keys and values in memory and speaks the Redis
//! serialization protocol (RESP) over TCP. Keys can carry a time-to-live.
//!
//! ## Request Pipeline
//!
//! ```text
//! bytes ─> Frame Decoder ─> Command ─> CommandHandler ─> Reply ─> Encoder ─> bytes
//!                                            │
//!                                            ▼
//!                                      StorageEngine  <── ExpirySweeper
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use emberkv::commands::CommandHandler;
//! use emberkv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let handler = CommandHandler::new(Arc::new(StorageEngine::new()));
//!
//! let reply = handler.process(b"*3\r\n$3\r\nSET\r\n$4\r\nname\r\n$4\r\nAriz\r\n").unwrap();
//! assert_eq!(reply, b"+OK\r\n");
//!
//! let reply = handler.process(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n").unwrap();
//! assert_eq!(reply, b"$4\r\nAriz\r\n");
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `ECHO message`
//! - `SET key value [EX seconds] [PX milliseconds]`
//! - `GET key`
//! - `DEL key [key ...]`
//!
//! ## Module Overview
//!
//! - [`protocol`]: frame decoder, reply types and encoder
//! - [`commands`]: command validation and execution
//! - [`storage`]: the shared store and its expiry sweeper
//! - [`connection`]: per-client read/write loop
//! - [`config`]: command-line configuration
//!
//! ## Expiry
//!
//! Keys with a TTL are expired in two ways:
//! 1. **Lazy**: a read treats an expired key as absent and removes it
//! 2. **Active**: a background task periodically sweeps expired keys
//!
//! Only the first is needed for correct answers. The second bounds memory.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

pub use commands::CommandHandler;
pub use config::{CliAction, Config, ConfigError};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{decode, decode_frame, Command, DecodeError, Reply};
pub use storage::{ExpiryConfig, ExpirySweeper, StorageEngine};

/// The default port emberkv listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host emberkv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of emberkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
