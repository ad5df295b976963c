//! Uniform key-value storage over interchangeable backends.
//!
//! Callers address values with one string key and hold a [`Store`] handle,
//! without knowing whether the active backend partitions data into
//! containers or keeps a flat keyspace.
//!
//! # Backends
//!
//! All backends implement the [`Store`] trait:
//!
//! - [`EmbeddedStore`] -- single-file redb database; the last `/` of a key
//!   separates container from item (see [`address`])
//! - [`DistributedStore`] -- Consul-compatible KV service over HTTP; keys
//!   are used verbatim in one flat namespace
//!
//! `list` and `delete_tree` are backend-defined: container operations for
//! the embedded store, prefix operations for the distributed store.
//!
//! # Design Rules
//!
//! 1. Values are opaque bytes; the store never interprets them.
//! 2. `delete` and absence-tolerant cleanup are idempotent.
//! 3. `get` always distinguishes "absent" from "failed".
//! 4. The container registry is a cache; the engine is the source of truth.
//! 5. All errors are propagated, never retried or silently ignored.

pub mod address;
pub mod config;
pub mod distributed;
pub mod embedded;
pub mod error;
pub mod registry;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use address::{parse_address, Address, DEFAULT_CONTAINER};
pub use config::{open_store, BackendKind, StoreConfig};
pub use distributed::DistributedStore;
pub use embedded::EmbeddedStore;
pub use error::{StoreError, StoreResult};
pub use registry::ContainerRegistry;
pub use traits::Store;
