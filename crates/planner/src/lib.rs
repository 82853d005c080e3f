//! Sizing engine for leverage token mints and redeems.
//!
//! Given a user's equity (or shares) and live swap quotes, the planners compute
//! the flash-loan amount, swap sizes, slippage floors and the on-chain call
//! sequence for a single atomic router transaction. Nothing here submits a
//! transaction; the router enforces the final `minShares` /
//! `minCollateralForSender` checks.

pub mod bindings;
pub mod calls;
pub mod cancel;
pub mod chain;
pub mod error;
pub mod math;
pub mod mint;
pub mod mock;
pub mod redeem;
pub mod router;
pub mod traits;
pub mod validation;

pub use cancel::*;
pub use chain::*;
pub use error::*;
pub use mint::*;
pub use redeem::*;
pub use router::*;
pub use traits::*;
pub use validation::*;
