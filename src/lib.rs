//! Off-chain planning for leverage token mints and redeems.
//!
//! [`PlannerService`] wires a loaded [`AppConfig`] to on-chain readers, venue
//! quoters and the mint/redeem planners, and returns plans together with the
//! router calldata that executes them.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;

pub use leverage_planner_adapters as adapters;
pub use leverage_planner_config as config;
pub use leverage_planner_core as planner;
pub use leverage_planner_telemetry as telemetry;
pub use leverage_planner_types as types;

pub use leverage_planner_config::{AppConfig, ConfigLoader};
pub use leverage_planner_core::{cancel_pair, CancelHandle, CancelSignal, PlanError};
pub use leverage_planner_telemetry::{init_tracing, PlanId};
pub use leverage_planner_types::{MintPlan, MintStrategy, RedeemPlan};
