pub mod asset;
pub mod error;
pub mod execution;
pub mod plan;
pub mod preview;
pub mod quote;
pub mod venue;

pub use asset::*;
pub use error::*;
pub use execution::*;
pub use plan::*;
pub use preview::*;
pub use quote::*;
pub use venue::*;

/// Basis point denominator shared by every slippage and margin parameter
pub const BPS_DENOMINATOR: u32 = 10_000;
