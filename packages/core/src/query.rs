//! Query selectors and results.

use bytes::Bytes;

use crate::key::Key;

/// Selects entries from a datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Only entries under this key.
    pub prefix: Option<Key>,
    /// Skip this many matching entries.
    pub offset: usize,
    /// Return at most this many entries.
    pub limit: Option<usize>,
    /// Leave `Entry::value` empty.
    pub keys_only: bool,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<Key>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self
    }
}

/// One query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Option<Bytes>,
    pub size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let q = Query::all().with_offset(2).with_limit(5).keys_only();
        assert_eq!(q.offset, 2);
        assert_eq!(q.limit, Some(5));
        assert!(q.keys_only);
    }
}
