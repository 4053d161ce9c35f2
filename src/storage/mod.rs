//! Storage Engine Module
//!
//! The shared key-value store and the background task that sweeps it.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        StorageEngine         │
//! │ RwLock<HashMap<key, Entry>>  │
//! └──────────────────────────────┘
//!                ▲
//!                │ sweep()
//!   ┌────────────┴────────────┐
//!   │      ExpirySweeper      │
//!   │ (Background Tokio Task) │
//!   └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use emberkv::storage::StorageEngine;
//! use std::time::Duration;
//!
//! let engine = StorageEngine::new();
//!
//! engine.set("name".into(), "Ariz".into(), None);
//! assert_eq!(engine.get("name"), Some("Ariz".to_string()));
//!
//! engine.set(
//!     "session".into(),
//!     "token123".into(),
//!     Some(Duration::from_secs(3600)),
//! );
//! ```

pub mod engine;
pub mod expiry;

pub use engine::{Entry, StorageEngine, StorageStats};
pub use expiry::{ExpiryConfig, ExpirySweeper};
