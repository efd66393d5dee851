//! Domain layer: chains, block records, params and errors.

pub mod entities;
pub mod errors;
pub mod keys;
pub mod params;

pub use entities::*;
pub use errors::*;
pub use params::AnchorParams;
