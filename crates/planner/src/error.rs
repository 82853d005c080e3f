use alloy_primitives::{Address, U256};
use leverage_planner_types::{MintDiagnostics, QuoteError, ReadError, RedeemDiagnostics};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("slippage must be between 0 and {max} bps, got {bps}")]
    InvalidSlippage { bps: u32, max: u32 },

    #[error("epsilon must be between 0 and {max} bps, got {bps}")]
    InvalidEpsilon { bps: u32, max: u32 },

    #[error("equity amount must be greater than zero")]
    ZeroEquity,

    #[error("shares to redeem must be greater than zero")]
    ZeroShares,

    #[error("input asset {input} does not match collateral asset {collateral}")]
    InputAssetMismatch { input: Address, collateral: Address },

    #[error(
        "no debt swap needed: target collateral {target_collateral} already covered by {user_collateral}"
    )]
    NoDebtSwapNeeded {
        target_collateral: U256,
        user_collateral: U256,
    },

    #[error("insufficient liquidity: swapping {amount_in} of {in_token} to {out_token} returns nothing")]
    InsufficientLiquidity {
        in_token: Address,
        out_token: Address,
        amount_in: U256,
    },

    #[error("flash loan too large, try increasing slippage tolerance ({0})")]
    FlashLoanTooLarge(Box<MintDiagnostics>),

    #[error("insufficient collateral to repay debt ({0})")]
    InsufficientCollateral(Box<RedeemDiagnostics>),

    #[error("collateral swap does not cover debt, try increasing slippage tolerance ({0})")]
    DebtNotCovered(Box<RedeemDiagnostics>),

    #[error("quote adapter contract violated: {reason}")]
    AdapterContract { reason: String },

    #[error("invalid plan: {reason}")]
    InvalidPlan { reason: String },

    #[error("planning cancelled")]
    Cancelled,

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Read(#[from] ReadError),
}

impl PlanError {
    /// Failures the user can usually fix by widening slippage or retrying
    pub fn is_slippage_related(&self) -> bool {
        matches!(
            self,
            PlanError::FlashLoanTooLarge(_)
                | PlanError::InsufficientLiquidity { .. }
                | PlanError::InsufficientCollateral(_)
                | PlanError::DebtNotCovered(_)
        )
    }

    /// Intermediate sizing values, when the failure carries them
    pub fn diagnostics(&self) -> Option<&MintDiagnostics> {
        match self {
            PlanError::FlashLoanTooLarge(d) => Some(d),
            _ => None,
        }
    }

    /// Redeem sizing values, when the failure carries them
    pub fn redeem_diagnostics(&self) -> Option<&RedeemDiagnostics> {
        match self {
            PlanError::InsufficientCollateral(d) | PlanError::DebtNotCovered(d) => Some(d),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
