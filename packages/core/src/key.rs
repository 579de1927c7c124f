//! Datastore keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A slash-separated datastore key.
///
/// Keys are opaque to the datastore: they are never interpreted as content
/// addresses themselves, only converted into one by a
/// [`KeyEncoder`](crate::KeyEncoder).
///
/// [`Key::new`] cleans its input the way a Unix path is cleaned:
///
/// - the key always starts with `/`
/// - repeated separators collapse
/// - `.` components are dropped and `..` removes the previous component
/// - a trailing `/` is removed, except for the root key `/`
///
/// ```rust
/// use datastore_core::Key;
///
/// assert_eq!(Key::new("blocks//CIQA/").as_str(), "/blocks/CIQA");
/// assert_eq!(Key::new("a/./b/../c").as_str(), "/a/c");
/// assert_eq!(Key::new("").as_str(), "/");
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Create a cleaned key.
    pub fn new(s: impl AsRef<str>) -> Self {
        Key(clean(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

fn clean(s: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for component in s.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            c => stack.push(c),
        }
    }
    format!("/{}", stack.join("/"))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
