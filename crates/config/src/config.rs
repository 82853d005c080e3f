//! Core configuration structures for the leverage token planner

use alloy_primitives::Address;
use leverage_planner_types::{MintStrategy, SwapVenue, BPS_DENOMINATOR};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ConfigError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    /// Chain deployments by name
    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,

    /// Swap venues by name
    #[serde(default)]
    pub venues: HashMap<String, SwapVenue>,

    /// Leverage tokens by name
    #[serde(default)]
    pub tokens: HashMap<String, TokenConfig>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sizing defaults shared by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Mint sizing strategy; V2 unless a token overrides it
    #[serde(default)]
    pub mint_strategy: MintStrategy,

    /// Default slippage tolerance in basis points
    #[serde(default)]
    pub default_slippage_bps: Option<u32>,

    /// Default slippage tolerance as a percentage (`0.5` = 50 bps)
    #[serde(default)]
    pub default_slippage_percent: Option<Decimal>,

    /// Safety margin for clamped or solved flash loans
    #[serde(default)]
    pub epsilon_bps: Option<u32>,

    /// Venue request timeout in milliseconds
    #[serde(default = "default_quote_timeout_ms")]
    pub quote_timeout_ms: u64,
}

/// One chain's RPC endpoint and protocol deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// EVM chain id
    pub chain_id: u64,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Wrapped native token (WETH)
    #[serde(default)]
    pub wrapped_native: Option<Address>,

    pub leverage_manager: Address,

    pub leverage_router: Address,

    /// Contract that executes swap calls inside the router transaction
    pub multicall_executor: Address,

    /// RPC request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// A leverage token and the venues that serve it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub address: Address,

    /// Key into `chains`
    pub chain: String,

    /// Key into `venues` used for the debt -> collateral mint swap
    pub mint_venue: String,

    /// Key into `venues` used for the collateral -> debt redeem swap
    pub redeem_venue: String,

    /// Overrides `planner.mint_strategy`
    #[serde(default)]
    pub mint_strategy: Option<MintStrategy>,
}

/// Slippage used when neither bps nor percent is configured
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_quote_timeout_ms() -> u64 {
    10_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mint_strategy: MintStrategy::default(),
            default_slippage_bps: None,
            default_slippage_percent: None,
            epsilon_bps: None,
            quote_timeout_ms: default_quote_timeout_ms(),
        }
    }
}

/// Convert a percentage to whole basis points, rounding half away from zero
pub fn percent_to_bps(percent: Decimal) -> Result<u32> {
    if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED {
        return Err(ConfigError::LoadError(format!(
            "slippage percent {percent} must be within 0..=100"
        )));
    }
    (percent * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .filter(|bps| *bps <= BPS_DENOMINATOR)
        .ok_or_else(|| ConfigError::LoadError(format!("slippage percent {percent} out of range")))
}

impl PlannerConfig {
    /// Effective default slippage in basis points
    pub fn slippage_bps(&self) -> Result<u32> {
        match (self.default_slippage_bps, self.default_slippage_percent) {
            (Some(bps), _) => Ok(bps),
            (None, Some(percent)) => percent_to_bps(percent),
            (None, None) => Ok(DEFAULT_SLIPPAGE_BPS),
        }
    }
}

impl AppConfig {
    pub fn chain(&self, name: &str) -> Result<&ChainConfig> {
        self.chains.get(name).ok_or_else(|| ConfigError::NotFound {
            kind: "chain",
            name: name.to_string(),
        })
    }

    pub fn venue(&self, name: &str) -> Result<&SwapVenue> {
        self.venues.get(name).ok_or_else(|| ConfigError::NotFound {
            kind: "venue",
            name: name.to_string(),
        })
    }

    pub fn token(&self, name: &str) -> Result<&TokenConfig> {
        self.tokens.get(name).ok_or_else(|| ConfigError::NotFound {
            kind: "token",
            name: name.to_string(),
        })
    }

    /// Strategy for a token, falling back to the planner default
    pub fn mint_strategy_for(&self, token: &TokenConfig) -> MintStrategy {
        token.mint_strategy.unwrap_or(self.planner.mint_strategy)
    }
}
