//! Content identifiers.
//!
//! A content identifier is a CIDv1: `varint(1) ‖ varint(codec) ‖ multihash`,
//! rendered as multibase base32 (`b` prefix, lowercase, no padding).

use std::fmt;

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use unsigned_varint as varint;

const CID_VERSION: u64 = 1;
const BASE32_MULTIBASE_PREFIX: char = 'b';

/// Multihash code for the identity "hash" (the digest is the input itself).
pub const IDENTITY_HASH: u64 = 0x00;

/// Content codec tag embedded in a content identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Codec {
    Raw,
    #[default]
    DagProtobuf,
    DagCbor,
}

impl Codec {
    /// The multicodec code.
    pub fn code(&self) -> u64 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagProtobuf => 0x70,
            Codec::DagCbor => 0x71,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Raw => "raw",
            Codec::DagProtobuf => "dag-pb",
            Codec::DagCbor => "dag-cbor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "raw" => Some(Codec::Raw),
            "dag-pb" => Some(Codec::DagProtobuf),
            "dag-cbor" => Some(Codec::DagCbor),
            _ => None,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A canonical content identifier string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Build a CIDv1 around an already-validated multihash.
    pub fn new_v1(codec: Codec, multihash: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(multihash.len() + 4);
        encode_varint(CID_VERSION, &mut bytes);
        encode_varint(codec.code(), &mut bytes);
        bytes.extend_from_slice(multihash);

        let mut encoded = String::with_capacity(1 + BASE32_NOPAD.encode_len(bytes.len()));
        encoded.push(BASE32_MULTIBASE_PREFIX);
        encoded.push_str(&BASE32_NOPAD.encode(&bytes).to_ascii_lowercase());
        ContentId(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check that `bytes` is exactly one multihash: `varint code ‖ varint len ‖ digest`.
///
/// Returns the hash code on success.
pub fn validate_multihash(bytes: &[u8]) -> Result<u64, String> {
    let (code, code_len) =
        decode_varint(bytes).ok_or_else(|| "invalid multihash code varint".to_string())?;
    let rest = &bytes[code_len..];
    let (digest_len, len_len) =
        decode_varint(rest).ok_or_else(|| "invalid multihash length varint".to_string())?;
    let digest = &rest[len_len..];

    if digest.len() as u64 != digest_len {
        return Err(format!(
            "multihash declares {} digest bytes but carries {}",
            digest_len,
            digest.len()
        ));
    }
    Ok(code)
}

/// Build a multihash from a code and digest.
pub fn multihash(code: u64, digest: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digest.len() + 4);
    encode_varint(code, &mut out);
    encode_varint(digest.len() as u64, &mut out);
    out.extend_from_slice(digest);
    out
}

/// Append `value` as an unsigned varint.
pub(crate) fn encode_varint(value: u64, out: &mut Vec<u8>) {
    let mut buf = varint::encode::u64_buffer();
    out.extend_from_slice(varint::encode::u64(value, &mut buf));
}

// Multiformats varints are at most 9 bytes.
const MAX_VARINT_LEN: usize = 9;

/// Decode a minimally encoded unsigned varint, returning the value and the
/// bytes consumed.
pub(crate) fn decode_varint(bytes: &[u8]) -> Option<(u64, usize)> {
    let (value, rest) = varint::decode::u64(bytes).ok()?;
    let consumed = bytes.len() - rest.len();
    (consumed <= MAX_VARINT_LEN).then_some((value, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn hello_multihash() -> Vec<u8> {
        let digest: Vec<u8> = (0..HELLO_SHA256.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&HELLO_SHA256[i..i + 2], 16).unwrap())
            .collect();
        multihash(0x12, &digest)
    }

    #[test]
    fn raw_cid_of_known_digest() {
        let cid = ContentId::new_v1(Codec::Raw, &hello_multihash());
        assert_eq!(
            cid.as_str(),
            "bafkreibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq"
        );
    }

    #[test]
    fn dag_pb_cid_of_known_digest() {
        let cid = ContentId::new_v1(Codec::DagProtobuf, &hello_multihash());
        assert_eq!(
            cid.as_str(),
            "bafybeibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq"
        );
    }

    #[test]
    fn varint_encoding() {
        let mut out = Vec::new();
        encode_varint(0x70, &mut out);
        assert_eq!(out, vec![0x70]);

        out.clear();
        encode_varint(300, &mut out);
        assert_eq!(out, vec![0xac, 0x02]);
        assert_eq!(decode_varint(&out), Some((300, 2)));
    }

    #[test]
    fn varint_rejects_non_minimal_and_truncated() {
        assert_eq!(decode_varint(&[0x80, 0x00]), None);
        assert_eq!(decode_varint(&[0x80]), None);
        assert_eq!(decode_varint(&[]), None);
        assert_eq!(decode_varint(&[0xff; 10]), None);
        // Ten bytes is a valid u64 but longer than multiformats allows.
        assert_eq!(
            decode_varint(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01]),
            None
        );
    }

    #[test]
    fn multihash_validation() {
        assert_eq!(validate_multihash(&hello_multihash()), Ok(0x12));

        let mut truncated = hello_multihash();
        truncated.pop();
        assert!(validate_multihash(&truncated).is_err());

        let mut padded = hello_multihash();
        padded.push(0);
        assert!(validate_multihash(&padded).is_err());

        assert!(validate_multihash(&[]).is_err());
    }

    #[test]
    fn codec_names() {
        for codec in [Codec::Raw, Codec::DagProtobuf, Codec::DagCbor] {
            assert_eq!(Codec::from_name(codec.name()), Some(codec));
        }
        assert_eq!(Codec::from_name("git-raw"), None);
        assert_eq!(Codec::default(), Codec::DagProtobuf);
    }
}
