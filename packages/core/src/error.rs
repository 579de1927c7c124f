//! Error types for datastore operations.
//!
//! Every failure a datastore can report is a variant of [`Error`]. The
//! variants fall into a handful of kinds that callers branch on:
//!
//! - absence ([`Error::NotFound`]), which is a normal outcome for a read
//! - remote failures ([`Error::Remote`]), where the store answered with a
//!   status the operation does not accept
//! - transport failures ([`Error::Transport`], [`Error::Timeout`],
//!   [`Error::Canceled`], [`Error::DeadlineExceeded`]), where no usable answer
//!   arrived and a retry may succeed
//! - caller errors ([`Error::KeyEncoding`], [`Error::Unsupported`])

use std::fmt;

use crate::key::Key;

/// The datastore operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Put,
    Get,
    Has,
    Delete,
    GetSize,
    Query,
    Batch,
    Sync,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Put => "put",
            Operation::Get => "get",
            Operation::Has => "has",
            Operation::Delete => "delete",
            Operation::GetSize => "get_size",
            Operation::Query => "query",
            Operation::Batch => "batch",
            Operation::Sync => "sync",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by datastore operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The key could not be converted to a content identifier.
    #[error("cannot derive content id from key '{key}': {reason}")]
    KeyEncoding { key: String, reason: String },

    /// The store confirmed that nothing is stored under the key.
    ///
    /// `url` is the request that reported the absence, for remote stores.
    #[error(
        "key not found: {key}{}",
        .url.as_deref().map(|url| format!(" ({})", url)).unwrap_or_default()
    )]
    NotFound { key: Key, url: Option<String> },

    /// The store answered with a status the operation does not accept.
    #[error("{op} {url} failed with HTTP {status}: {body}")]
    Remote {
        op: Operation,
        url: String,
        status: u16,
        body: String,
    },

    /// The request could not be delivered or its response could not be read.
    #[error("{op} {url}: transport error: {source}")]
    Transport {
        op: Operation,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The transport gave up waiting for the store.
    #[error("{op} {url}: request timed out")]
    Timeout { op: Operation, url: String },

    /// The caller canceled the operation.
    #[error("{op} canceled")]
    Canceled { op: Operation },

    /// The caller's deadline passed before the operation finished.
    #[error("{op} deadline exceeded")]
    DeadlineExceeded { op: Operation },

    /// The datastore does not implement this operation.
    #[error("{op} is not supported by this datastore")]
    Unsupported { op: Operation },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("unknown datastore type: {type_name}")]
    UnknownDatastoreType { type_name: String },
}

impl Error {
    pub fn key_encoding(key: &Key, reason: impl Into<String>) -> Self {
        Error::KeyEncoding {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: &Key) -> Self {
        Error::NotFound {
            key: key.clone(),
            url: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// True when the store confirmed the key is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True when no usable answer came back from the store.
    ///
    /// Covers connection failures, client timeouts, cancellation, and caller
    /// deadlines. These are the errors worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::Timeout { .. }
                | Error::Canceled { .. }
                | Error::DeadlineExceeded { .. }
        )
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    /// The HTTP status carried by a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for datastore operations.
pub type Result<T> = std::result::Result<T, Error>;
