//! # locsync Storage
//!
//! Key-value storage backends for locsync.
//!
//! Backends are **opaque byte stores** keyed by string. They do not
//! interpret the bytes they hold; the engine owns the snapshot format.
//!
//! ## Design Principles
//!
//! - Backends are simple async key-value stores (get, set, remove)
//! - No knowledge of snapshot layout or JSON
//! - Must be `Send + Sync` so one store can back several engines
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral caches
//! - [`FileBackend`] - One file per key inside a directory
//!
//! ## Example
//!
//! ```rust
//! use locsync_storage::{InMemoryBackend, KeyValueBackend};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let backend = InMemoryBackend::new();
//! backend.set("greeting", b"hello".to_vec()).await.unwrap();
//! assert_eq!(backend.get("greeting").await.unwrap(), Some(b"hello".to_vec()));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KeyValueBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
