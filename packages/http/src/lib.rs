//! # datastore-http
//!
//! A content-addressed datastore whose values live in a remote HTTP object
//! store.
//!
//! Keys are converted to content ids by a [`KeyEncoder`](datastore_core::KeyEncoder)
//! and each operation becomes one request:
//!
//! | Operation | Request | Success | Absent |
//! |---|---|---|---|
//! | `put` | `PUT /put/{id}` | 200 | n/a |
//! | `get` | `GET /get/{id}` | 200 + body | 404 → `NotFound` |
//! | `has` | `HEAD /has/{id}` | 200 → `true` | 404 → `false` |
//! | `delete` | `DELETE /delete/{id}` | 200 | 404 → success |
//!
//! ## Store Types
//!
//! ### HttpDatastore
//!
//! Async datastore implementing [`Datastore`](datastore_core::Datastore):
//!
//! ```ignore
//! use datastore_core::{Context, Datastore, Key};
//! use datastore_http::HttpDatastore;
//!
//! let store = HttpDatastore::new("http://127.0.0.1:9500")?;
//! let value = store.get(&Context::background(), &Key::new("/CIQ...")).await?;
//! ```
//!
//! ### BlockingHttpDatastore
//!
//! The same operations for callers without an async runtime (`blocking`
//! feature, on by default):
//!
//! ```ignore
//! use datastore_http::blocking::BlockingHttpDatastore;
//!
//! let store = BlockingHttpDatastore::new("http://127.0.0.1:9500")?;
//! let exists = store.has(&Context::background(), &Key::new("/CIQ..."))?;
//! ```
//!
//! ## Registration
//!
//! [`register`] makes the `ds_http` type available to
//! [`datastore_core::registry`], configured by [`HttpConfig`].

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod config;
pub mod plugin;
pub mod types;

mod error;
mod store;

pub use config::{HttpConfig, DATASTORE_TYPE, DEFAULT_SERVER_URL, SERVER_URL_ENV};
pub use plugin::{register, HttpPlugin};
pub use store::{HttpDatastore, DEFAULT_TIMEOUT};
pub use types::Route;
