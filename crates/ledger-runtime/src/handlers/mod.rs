//! # Handlers
//!
//! Message routing from the transaction envelope to the module handlers.

pub mod router;

pub use router::{route, route_all, Keepers, MsgResponse};
