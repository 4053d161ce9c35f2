//! Connection Handler Module
//!
//! Every accepted client runs in its own Tokio task. The task owns the
//! socket, reassembles frames from the byte stream, and hands each complete
//! frame to the shared [`CommandHandler`](crate::commands::CommandHandler).
//!
//! ```text
//! ┌──────────────┐  accept()  ┌──────────────────────────────────────┐
//! │ TcpListener  │──────────> │ ConnectionHandler (one task/client)  │
//! │  (main.rs)   │            │  read ─> decode ─> execute ─> reply  │
//! └──────────────┘            └──────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use emberkv::connection::{handle_connection, ConnectionStats};
//! use emberkv::commands::CommandHandler;
//! use emberkv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let stats = Arc::new(ConnectionStats::new());
//!
//! let (stream, addr) = listener.accept().await?;
//! let handler = CommandHandler::new(Arc::clone(&storage));
//! tokio::spawn(handle_connection(stream, addr, handler, stats));
//! ```

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
