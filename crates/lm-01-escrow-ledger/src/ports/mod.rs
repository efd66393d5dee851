//! Ports: the API other modules consume.

pub mod inbound;

pub use inbound::EscrowApi;
