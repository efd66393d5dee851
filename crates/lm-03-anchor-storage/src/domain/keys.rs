//! Store layout.
//!
//! | Key | Value |
//! |-----|-------|
//! | `anchor/chain/{id}` | `AnchoredChain` |
//! | `anchor/moniker/{moniker}` | chain id |
//! | `anchor/next_id` | next id to assign |
//! | `anchor/block/{id}{height}` | `AnchorRecord` |
//! | `anchor/storage/{id}` | `StorageCapacity` |
//!
//! Block keys concatenate two big-endian `u64`s, so a scan of one chain's
//! prefix yields its records in ascending height.

use shared_types::codec::{self, u64_key};

pub const CHAIN_PREFIX: &[u8] = b"anchor/chain/";
pub const MONIKER_PREFIX: &[u8] = b"anchor/moniker/";
pub const NEXT_ID_KEY: &[u8] = b"anchor/next_id";
pub const BLOCK_PREFIX: &[u8] = b"anchor/block/";
pub const STORAGE_PREFIX: &[u8] = b"anchor/storage/";

pub fn chain_key(id: u64) -> Vec<u8> {
    codec::key(&[CHAIN_PREFIX, &u64_key(id)])
}

pub fn moniker_key(moniker: &str) -> Vec<u8> {
    codec::key(&[MONIKER_PREFIX, moniker.as_bytes()])
}

pub fn chain_blocks_prefix(id: u64) -> Vec<u8> {
    codec::key(&[BLOCK_PREFIX, &u64_key(id)])
}

pub fn block_key(id: u64, height: u64) -> Vec<u8> {
    codec::key(&[BLOCK_PREFIX, &u64_key(id), &u64_key(height)])
}

pub fn storage_key(id: u64) -> Vec<u8> {
    codec::key(&[STORAGE_PREFIX, &u64_key(id)])
}
