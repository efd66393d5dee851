//! Domain layer: orders, params, the tally rule and errors.

pub mod entities;
pub mod errors;
pub mod keys;
pub mod params;
pub mod tally;

pub use entities::*;
pub use errors::*;
pub use params::EnterpriseParams;
pub use tally::{evaluate, TallyVerdict};
