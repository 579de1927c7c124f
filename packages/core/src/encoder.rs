//! Key-to-content-id strategies.

use data_encoding::BASE32_NOPAD;

use crate::cid::{multihash, validate_multihash, Codec, ContentId, IDENTITY_HASH};
use crate::error::{Error, Result};
use crate::key::Key;

/// Derives the content identifier a key is stored under.
///
/// Implementations must be pure: the same key always produces the same
/// identifier, across instances and over time, and distinct keys in the
/// encoder's key space produce distinct identifiers. A key that cannot be
/// encoded is an error, never a lossy substitution.
pub trait KeyEncoder: Send + Sync {
    fn encode(&self, key: &Key) -> Result<ContentId>;

    /// The codec tag written into every identifier.
    fn codec(&self) -> Codec;
}

/// Encoder for blockstore keys.
///
/// The key's name is the unpadded, uppercase base32 encoding of a multihash
/// (for example `/CIQCZ4SNXJP3BIYOE3UDWKWFXHRJ4GYWDZOB7J2CLZZQIM3CSOFZQJA`).
/// The decoded multihash is wrapped in a CIDv1 carrying the encoder's codec,
/// `dag-pb` by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultihashKeyEncoder {
    codec: Codec,
}

impl MultihashKeyEncoder {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }
}

impl KeyEncoder for MultihashKeyEncoder {
    fn encode(&self, key: &Key) -> Result<ContentId> {
        let encoded = key.as_str().strip_prefix('/').unwrap_or(key.as_str());
        if encoded.is_empty() {
            return Err(Error::key_encoding(key, "empty key"));
        }

        let multihash = BASE32_NOPAD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::key_encoding(key, format!("not base32: {}", e)))?;
        validate_multihash(&multihash).map_err(|reason| Error::key_encoding(key, reason))?;

        Ok(ContentId::new_v1(self.codec, &multihash))
    }

    fn codec(&self) -> Codec {
        self.codec
    }
}

/// Encoder that embeds the whole key in an identity multihash.
///
/// Works for any non-root key, at the cost of identifiers that grow with the
/// key length.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKeyEncoder {
    codec: Codec,
}

impl IdentityKeyEncoder {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }
}

impl KeyEncoder for IdentityKeyEncoder {
    fn encode(&self, key: &Key) -> Result<ContentId> {
        if key.is_root() {
            return Err(Error::key_encoding(key, "empty key"));
        }
        let multihash = multihash(IDENTITY_HASH, key.as_bytes());
        Ok(ContentId::new_v1(self.codec, &multihash))
    }

    fn codec(&self) -> Codec {
        self.codec
    }
}
