//! Mapping HTTP outcomes onto the datastore error taxonomy.

use datastore_core::{Error, Operation};
use http::StatusCode;
use url::Url;

/// Classify a failed reqwest exchange.
pub(crate) fn transport(op: Operation, url: &Url, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout {
            op,
            url: url.to_string(),
        }
    } else {
        Error::Transport {
            op,
            url: url.to_string(),
            source: Box::new(error),
        }
    }
}

/// A status the operation does not accept, with the body kept for diagnostics.
pub(crate) fn unexpected_status(op: Operation, url: &Url, status: StatusCode, body: &[u8]) -> Error {
    Error::Remote {
        op,
        url: url.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

pub(crate) fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Error {
    Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}
