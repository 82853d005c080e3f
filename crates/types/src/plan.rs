use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Call, DepositPreview, Quote, RedeemPreview, RouterDepositPreview, SwapPath};

/// Sizing algorithm used to plan a mint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintStrategy {
    /// Rate-sampling linear solver for the V1 router interface
    V1,
    /// Scaling quote loop with a single repayability clamp
    #[default]
    V2,
}

impl fmt::Display for MintStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintStrategy::V1 => write!(f, "v1"),
            MintStrategy::V2 => write!(f, "v2"),
        }
    }
}

/// Sizing result for a mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPlan {
    pub strategy: MintStrategy,
    pub token: Address,

    /// Always the token's collateral asset
    pub input_asset: Address,
    pub debt_asset: Address,

    /// User-supplied equity, in the input asset
    pub equity_in_input_asset: U256,

    /// Debt flash-borrowed and swapped into collateral
    pub flash_loan_amount: U256,

    /// Share floor after slippage tolerance
    pub min_shares: U256,

    pub slippage_bps: u32,

    /// Manager preview at the expected swap outcome
    pub expected_shares: U256,
    pub expected_debt: U256,
    pub expected_total_collateral: U256,

    /// Manager preview at the swap's guaranteed minimum output
    pub worst_case_required_debt: U256,
    pub worst_case_shares: U256,

    /// Debt left over after repaying the flash loan (V1 router only)
    pub expected_excess_debt: Option<U256>,
    pub min_excess_debt: Option<U256>,

    pub swap_path: SwapPath,

    /// Ordered calls to attach to the router transaction
    pub calls: Vec<Call>,
}

impl MintPlan {
    /// Largest flash loan the previews say can be repaid
    pub fn repayable_floor(&self) -> U256 {
        self.expected_debt.min(self.worst_case_required_debt)
    }

    pub fn is_repayable(&self) -> bool {
        self.flash_loan_amount <= self.repayable_floor()
    }
}

/// Sizing result for a redeem
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemPlan {
    pub token: Address,
    pub shares_to_redeem: U256,
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub slippage_bps: u32,

    /// Collateral floor returned to the sender after slippage tolerance
    pub min_collateral_for_sender: U256,

    /// Collateral returned to the sender at the expected swap outcome
    pub expected_collateral: U256,
    pub expected_debt: U256,
    pub expected_total_collateral: U256,

    /// Collateral left over once the debt is covered
    pub expected_excess_collateral: U256,

    /// Collateral sold to repay the debt
    pub collateral_for_swap: U256,

    pub calls: Vec<Call>,
}

/// Intermediate values captured while sizing a mint, attached to failures
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintDiagnostics {
    pub token: Address,
    pub equity: U256,
    pub router_preview: RouterDepositPreview,
    pub needed_from_debt_swap: U256,
    pub flash_loan_amount: U256,
    pub quote_attempts: u32,
    pub quote: Option<Quote>,
    pub expected_preview: Option<DepositPreview>,
    pub worst_case_preview: Option<DepositPreview>,
    pub clamp_candidate: Option<U256>,
    pub clamp_quote: Option<Quote>,
}

impl fmt::Display for MintDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token={} equity={} flash_loan={} needed={} attempts={}",
            self.token,
            self.equity,
            self.flash_loan_amount,
            self.needed_from_debt_swap,
            self.quote_attempts
        )?;
        if let Some(q) = &self.quote {
            write!(f, " quote_out={} quote_min_out={}", q.out, q.min_out)?;
        }
        if let Some(p) = &self.expected_preview {
            write!(f, " expected_debt={}", p.debt)?;
        }
        if let Some(p) = &self.worst_case_preview {
            write!(f, " worst_case_debt={}", p.debt)?;
        }
        if let Some(c) = &self.clamp_candidate {
            write!(f, " clamp_candidate={}", c)?;
        }
        Ok(())
    }
}

/// Intermediate values captured while sizing a redeem, attached to failures
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemDiagnostics {
    pub token: Address,
    pub shares: U256,
    pub preview: RedeemPreview,
    /// Collateral sized to cover the debt after correction
    pub collateral_for_swap: U256,
    /// Quote at the first guess, before correction
    pub estimate_quote: Option<Quote>,
    pub final_quote: Option<Quote>,
}

impl fmt::Display for RedeemDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token={} shares={} collateral={} debt={} collateral_for_swap={}",
            self.token,
            self.shares,
            self.preview.collateral,
            self.preview.debt,
            self.collateral_for_swap
        )?;
        if let Some(q) = &self.estimate_quote {
            write!(f, " estimate_out={}", q.out)?;
        }
        if let Some(q) = &self.final_quote {
            write!(f, " final_out={} final_min_out={}", q.out, q.min_out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(flash: u64, expected_debt: u64, worst_debt: u64) -> MintPlan {
        MintPlan {
            strategy: MintStrategy::V2,
            token: Address::repeat_byte(0x01),
            input_asset: Address::repeat_byte(0x02),
            debt_asset: Address::repeat_byte(0x03),
            equity_in_input_asset: U256::from(1_000u64),
            flash_loan_amount: U256::from(flash),
            min_shares: U256::ZERO,
            slippage_bps: 50,
            expected_shares: U256::ZERO,
            expected_debt: U256::from(expected_debt),
            expected_total_collateral: U256::ZERO,
            worst_case_required_debt: U256::from(worst_debt),
            worst_case_shares: U256::ZERO,
            expected_excess_debt: None,
            min_excess_debt: None,
            swap_path: SwapPath::Erc20,
            calls: vec![],
        }
    }

    #[test]
    fn test_repayable_floor_is_min_of_previews() {
        assert_eq!(plan(0, 500, 480).repayable_floor(), U256::from(480u64));
        assert_eq!(plan(0, 470, 480).repayable_floor(), U256::from(470u64));
    }

    #[test]
    fn test_repayability_boundary() {
        assert!(plan(480, 500, 480).is_repayable());
        assert!(!plan(481, 500, 480).is_repayable());
    }

    #[test]
    fn test_redeem_diagnostics_display() {
        let diagnostics = RedeemDiagnostics {
            token: Address::repeat_byte(0x01),
            shares: U256::from(100u64),
            preview: RedeemPreview {
                collateral: U256::from(10_000u64),
                debt: U256::from(4_000u64),
                shares: U256::from(100u64),
            },
            collateral_for_swap: U256::from(4_123u64),
            ..Default::default()
        };

        let rendered = diagnostics.to_string();
        assert!(rendered.contains("debt=4000"));
        assert!(rendered.contains("collateral_for_swap=4123"));
        assert!(!rendered.contains("final_out"));
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&MintStrategy::V1).unwrap();
        assert_eq!(json, "\"v1\"");
        let parsed: MintStrategy = serde_json::from_str("\"v2\"").unwrap();
        assert_eq!(parsed, MintStrategy::V2);
    }
}
