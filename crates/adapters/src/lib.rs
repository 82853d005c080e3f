//! Quote adapters for the supported swap venues and a JSON-RPC contract reader.
//!
//! Every adapter implements [`leverage_planner_core::Quoter`]. On-chain venues
//! price through a [`leverage_planner_core::ContractReader`]; aggregator venues
//! call their public HTTP APIs. [`build_quoter`] turns a configured
//! [`leverage_planner_types::SwapVenue`] into a ready quoter.

pub mod balmy;
pub mod context;
pub mod error;
pub mod factory;
mod http;
pub mod infinifi;
pub mod lifi;
pub mod pendle;
pub mod rpc;
pub mod uniswap_v2;
pub mod uniswap_v3;
pub mod velora;

pub use balmy::*;
pub use context::*;
pub use error::*;
pub use factory::*;
pub use infinifi::*;
pub use lifi::*;
pub use pendle::*;
pub use rpc::*;
pub use uniswap_v2::*;
pub use uniswap_v3::*;
pub use velora::*;
