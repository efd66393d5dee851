//! Store layout.
//!
//! | Key | Value |
//! |-----|-------|
//! | `po/order/{id}` | `PurchaseOrder` |
//! | `po/next_id` | next id to assign |
//! | `po/raised/{id}` | marker, raised queue |
//! | `po/accepted/{id}` | marker, accepted queue |
//! | `po/whitelist/{addr}` | marker |

use shared_types::codec::{self, u64_key};
use shared_types::Address;

pub const ORDER_PREFIX: &[u8] = b"po/order/";
pub const NEXT_ID_KEY: &[u8] = b"po/next_id";
pub const RAISED_QUEUE_PREFIX: &[u8] = b"po/raised/";
pub const ACCEPTED_QUEUE_PREFIX: &[u8] = b"po/accepted/";
pub const WHITELIST_PREFIX: &[u8] = b"po/whitelist/";

pub fn order_key(id: u64) -> Vec<u8> {
    codec::key(&[ORDER_PREFIX, &u64_key(id)])
}

pub fn raised_queue_key(id: u64) -> Vec<u8> {
    codec::key(&[RAISED_QUEUE_PREFIX, &u64_key(id)])
}

pub fn accepted_queue_key(id: u64) -> Vec<u8> {
    codec::key(&[ACCEPTED_QUEUE_PREFIX, &u64_key(id)])
}

pub fn whitelist_key(addr: &Address) -> Vec<u8> {
    codec::address_key(WHITELIST_PREFIX, addr)
}
