//! Record encoding and key helpers.
//!
//! Records are bincode-encoded. Numeric key segments are big-endian so that
//! byte order equals numeric order under a scan.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::entities::Address;
use crate::store::KvStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record at key {key}: {reason}")]
    Decode { key: String, reason: String },
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode {
        key: hex::encode(key),
        reason: e.to_string(),
    })
}

/// Read and decode a record.
pub fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &[u8]) -> Result<Option<T>, CodecError> {
    store.get(key).map(|bytes| decode(key, &bytes)).transpose()
}

/// Encode and write a record.
pub fn save<T: Serialize>(store: &mut dyn KvStore, key: &[u8], value: &T) -> Result<(), CodecError> {
    let bytes = encode(value)?;
    store.set(key, bytes);
    Ok(())
}

/// Decode every value under `prefix`, in key order.
pub fn load_all<T: DeserializeOwned>(store: &dyn KvStore, prefix: &[u8]) -> Result<Vec<T>, CodecError> {
    store
        .scan(prefix)
        .into_iter()
        .map(|(k, v)| decode(&k, &v))
        .collect()
}

// =============================================================================
// KEY BUILDING
// =============================================================================

pub fn u64_key(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Inverse of [`u64_key`] on the trailing 8 bytes of a key.
pub fn u64_from_key_suffix(key: &[u8]) -> Option<u64> {
    let start = key.len().checked_sub(8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&key[start..]);
    Some(u64::from_be_bytes(buf))
}

/// Concatenate key segments.
pub fn key(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(len);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

pub fn address_key(prefix: &[u8], addr: &Address) -> Vec<u8> {
    key(&[prefix, addr.as_bytes()])
}
