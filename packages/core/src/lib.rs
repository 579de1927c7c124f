//! # datastore-core
//!
//! The contract shared by content-addressed datastore backends:
//!
//! - [`Key`]: an opaque, slash-separated datastore key
//! - [`ContentId`] and [`KeyEncoder`]: the canonical identifier a key is
//!   stored under, and the strategy that derives it
//! - [`Context`]: cancellation and deadlines passed into every operation
//! - [`Datastore`]: the operations every backend implements
//! - [`Error`]: the failure taxonomy callers branch on
//! - [`registry`]: process-wide lookup of backends by type name
//!
//! # Example
//!
//! ```rust
//! use datastore_core::{Context, Datastore, Key};
//!
//! async fn fetch(store: &dyn Datastore, name: &str) -> datastore_core::Result<Option<Vec<u8>>> {
//!     match store.get(&Context::background(), &Key::new(name)).await {
//!         Ok(bytes) => Ok(Some(bytes.to_vec())),
//!         Err(e) if e.is_not_found() => Ok(None),
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

pub use bytes::Bytes;

mod cid;
mod context;
mod encoder;
mod error;
mod key;
mod query;
pub mod registry;
mod traits;

pub use cid::{multihash, validate_multihash, Codec, ContentId, IDENTITY_HASH};
pub use context::Context;
pub use encoder::{IdentityKeyEncoder, KeyEncoder, MultihashKeyEncoder};
pub use error::{Error, Operation, Result};
pub use key::Key;
pub use query::{Entry, Query};
pub use registry::{ConfigMap, DatastoreConfig, DatastorePlugin, Plugin};
pub use traits::{Batch, Datastore};

// Re-exported so callers can build contexts without a direct dependency.
pub use tokio_util::sync::CancellationToken;
