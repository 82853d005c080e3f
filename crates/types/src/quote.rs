use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::Call;

/// Swap sizing mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteIntent {
    /// Fixed input, venue sizes the output
    #[default]
    ExactIn,
    /// Fixed output, venue sizes the input
    ExactOut,
}

/// Request for a swap quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub in_token: Address,
    pub out_token: Address,
    pub amount_in: U256,
    pub amount_out: Option<U256>,
    pub intent: QuoteIntent,
    /// Tolerance the venue should use when deriving its guaranteed output
    pub slippage_bps: u32,
}

impl QuoteRequest {
    pub fn exact_in(in_token: Address, out_token: Address, amount_in: U256, slippage_bps: u32) -> Self {
        Self {
            in_token,
            out_token,
            amount_in,
            amount_out: None,
            intent: QuoteIntent::ExactIn,
            slippage_bps,
        }
    }

    pub fn exact_out(in_token: Address, out_token: Address, amount_out: U256, slippage_bps: u32) -> Self {
        Self {
            in_token,
            out_token,
            amount_in: U256::ZERO,
            amount_out: Some(amount_out),
            intent: QuoteIntent::ExactOut,
            slippage_bps,
        }
    }
}

/// Venue-specific data that travels with a quote without widening the core record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "venue", rename_all = "camelCase")]
pub enum QuoteMetadata {
    #[default]
    None,
    UniswapV2 {
        path: Vec<Address>,
    },
    UniswapV3 {
        fee: u32,
        gas_estimate: U256,
    },
    Lifi {
        tool: Option<String>,
    },
    Balmy {
        source_id: String,
    },
    Velora {
        /// Serialized price route echoed back to the transaction builder
        price_route: serde_json::Value,
    },
    Pendle {
        action: Option<String>,
    },
    Infinifi {
        vault: Address,
    },
}

/// Quote exactly as returned by an adapter; `min_out` may be absent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VenueQuote {
    pub out: U256,
    pub min_out: Option<U256>,
    pub approval_target: Address,
    pub calls: Vec<Call>,
    pub wants_native_in: bool,
    pub metadata: QuoteMetadata,
}

/// Priced and executable swap, with a materialized guaranteed output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Expected output amount
    pub out: U256,

    /// Guaranteed minimum output amount
    pub min_out: U256,

    /// Address that must hold an allowance before `calls` execute
    pub approval_target: Address,

    /// Swap call(s)
    pub calls: Vec<Call>,

    /// True when the swap consumes native currency instead of an ERC-20
    pub wants_native_in: bool,

    pub metadata: QuoteMetadata,
}

impl Quote {
    pub fn new(out: U256, min_out: U256, approval_target: Address, calls: Vec<Call>) -> Self {
        Self {
            out,
            min_out,
            approval_target,
            calls,
            wants_native_in: false,
            metadata: QuoteMetadata::None,
        }
    }

    pub fn with_native_in(mut self, wants_native_in: bool) -> Self {
        self.wants_native_in = wants_native_in;
        self
    }

    pub fn with_metadata(mut self, metadata: QuoteMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Zero guaranteed output means the venue has no usable liquidity
    pub fn is_dry(&self) -> bool {
        self.min_out.is_zero() || self.out.is_zero()
    }
}

/// Materialize `min_out`, falling back to `out` when the venue supplied none.
///
/// A venue-supplied `min_out` above `out` is clamped to `out`.
pub fn ensure_min_out(quote: VenueQuote) -> Quote {
    let min_out = match quote.min_out {
        Some(min_out) => min_out.min(quote.out),
        None => quote.out,
    };

    Quote {
        out: quote.out,
        min_out,
        approval_target: quote.approval_target,
        calls: quote.calls,
        wants_native_in: quote.wants_native_in,
        metadata: quote.metadata,
    }
}

impl From<VenueQuote> for Quote {
    fn from(quote: VenueQuote) -> Self {
        ensure_min_out(quote)
    }
}
