//! Store layout.
//!
//! | Key | Value |
//! |-----|-------|
//! | `escrow/locked/{addr}` | `LockedBalance` |
//! | `escrow/spent/{addr}` | `SpentBalance` |
//! | `escrow/total_locked` | `Coin` |
//! | `escrow/total_spent` | `Coin` |

use shared_types::codec;
use shared_types::Address;

pub const LOCKED_PREFIX: &[u8] = b"escrow/locked/";
pub const SPENT_PREFIX: &[u8] = b"escrow/spent/";
pub const TOTAL_LOCKED_KEY: &[u8] = b"escrow/total_locked";
pub const TOTAL_SPENT_KEY: &[u8] = b"escrow/total_spent";

pub fn locked_key(addr: &Address) -> Vec<u8> {
    codec::address_key(LOCKED_PREFIX, addr)
}

pub fn spent_key(addr: &Address) -> Vec<u8> {
    codec::address_key(SPENT_PREFIX, addr)
}
