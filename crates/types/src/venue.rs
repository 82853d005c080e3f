use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Configured swap venue. Each variant carries only the fields its adapter needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwapVenue {
    #[serde(rename = "uniswapV2")]
    UniswapV2 {
        router: Address,
        /// Overrides the chain's wrapped native token
        #[serde(default)]
        wrapped_native: Option<Address>,
        #[serde(default)]
        deadline_secs: Option<u64>,
    },

    #[serde(rename = "uniswapV3")]
    UniswapV3 {
        quoter: Address,
        router: Address,
        /// Pool fee tier in hundredths of a bip (500 = 0.05%)
        fee: u32,
        #[serde(default)]
        wrapped_native: Option<Address>,
    },

    Lifi {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        integrator: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
    },

    Balmy {
        #[serde(default)]
        base_url: Option<String>,
        /// Restrict quoting to these source ids; empty means all
        #[serde(default)]
        sources: Vec<String>,
    },

    Velora {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        partner: Option<String>,
    },

    Pendle {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_true")]
        enable_aggregator: bool,
    },

    Infinifi {
        /// ERC-4626 vault
        vault: Address,
        /// Underlying asset of the vault
        asset: Address,
    },
}

fn default_true() -> bool {
    true
}

impl SwapVenue {
    pub fn kind(&self) -> &'static str {
        match self {
            SwapVenue::UniswapV2 { .. } => "uniswapV2",
            SwapVenue::UniswapV3 { .. } => "uniswapV3",
            SwapVenue::Lifi { .. } => "lifi",
            SwapVenue::Balmy { .. } => "balmy",
            SwapVenue::Velora { .. } => "velora",
            SwapVenue::Pendle { .. } => "pendle",
            SwapVenue::Infinifi { .. } => "infinifi",
        }
    }

    /// Venues that price through `eth_call` and need a contract reader
    pub fn is_onchain(&self) -> bool {
        matches!(
            self,
            SwapVenue::UniswapV2 { .. } | SwapVenue::UniswapV3 { .. } | SwapVenue::Infinifi { .. }
        )
    }
}
