//! Pure pre-submission checks on finished plans.

use leverage_planner_types::{MintPlan, RedeemPlan, BPS_DENOMINATOR};

use crate::{PlanError, Result};

fn invalid(reason: impl Into<String>) -> PlanError {
    PlanError::InvalidPlan {
        reason: reason.into(),
    }
}

/// A redeem plan is valid iff it redeems shares, its slippage is within
/// 0..=10000 bps and its collateral floor does not exceed the expected amount.
pub fn validate_redeem_plan(plan: &RedeemPlan) -> Result<()> {
    if plan.shares_to_redeem.is_zero() {
        return Err(invalid("shares to redeem must be greater than zero"));
    }
    if plan.slippage_bps > BPS_DENOMINATOR {
        return Err(invalid(format!(
            "slippage {} bps exceeds {}",
            plan.slippage_bps, BPS_DENOMINATOR
        )));
    }
    if plan.min_collateral_for_sender > plan.expected_collateral {
        return Err(invalid(format!(
            "min collateral for sender {} exceeds expected collateral {}",
            plan.min_collateral_for_sender, plan.expected_collateral
        )));
    }
    Ok(())
}

/// A mint plan is valid iff it carries equity, its share floor does not
/// exceed the expected shares and its flash loan is repayable.
pub fn validate_mint_plan(plan: &MintPlan) -> Result<()> {
    if plan.equity_in_input_asset.is_zero() {
        return Err(invalid("equity must be greater than zero"));
    }
    if plan.min_shares > plan.expected_shares {
        return Err(invalid(format!(
            "min shares {} exceeds expected shares {}",
            plan.min_shares, plan.expected_shares
        )));
    }
    if !plan.is_repayable() {
        return Err(invalid(format!(
            "flash loan {} exceeds repayable floor {}",
            plan.flash_loan_amount,
            plan.repayable_floor()
        )));
    }
    if let (Some(min), Some(expected)) = (plan.min_excess_debt, plan.expected_excess_debt) {
        if min > expected {
            return Err(invalid(format!(
                "min excess debt {min} exceeds expected excess debt {expected}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use leverage_planner_types::{MintStrategy, SwapPath};

    fn redeem_plan(min: u64, expected: u64) -> RedeemPlan {
        RedeemPlan {
            token: Address::repeat_byte(0x01),
            shares_to_redeem: U256::from(100u64),
            collateral_asset: Address::repeat_byte(0x02),
            debt_asset: Address::repeat_byte(0x03),
            slippage_bps: 50,
            min_collateral_for_sender: U256::from(min),
            expected_collateral: U256::from(expected),
            expected_debt: U256::ZERO,
            expected_total_collateral: U256::from(expected),
            expected_excess_collateral: U256::from(expected),
            collateral_for_swap: U256::ZERO,
            calls: vec![],
        }
    }

    #[test]
    fn test_redeem_floor_at_equality_is_valid() {
        assert!(validate_redeem_plan(&redeem_plan(6_000, 6_000)).is_ok());
    }

    #[test]
    fn test_redeem_floor_above_expected_is_rejected() {
        assert!(matches!(
            validate_redeem_plan(&redeem_plan(6_001, 6_000)),
            Err(PlanError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn test_redeem_zero_shares_rejected() {
        let mut plan = redeem_plan(0, 0);
        plan.shares_to_redeem = U256::ZERO;
        assert!(validate_redeem_plan(&plan).is_err());
    }

    #[test]
    fn test_redeem_slippage_bounds() {
        let mut plan = redeem_plan(0, 10);
        plan.slippage_bps = 10_000;
        assert!(validate_redeem_plan(&plan).is_ok());
        plan.slippage_bps = 10_001;
        assert!(validate_redeem_plan(&plan).is_err());
    }

    fn mint_plan() -> MintPlan {
        MintPlan {
            strategy: MintStrategy::V1,
            token: Address::repeat_byte(0x01),
            input_asset: Address::repeat_byte(0x02),
            debt_asset: Address::repeat_byte(0x03),
            equity_in_input_asset: U256::from(1_000u64),
            flash_loan_amount: U256::from(500u64),
            min_shares: U256::from(990u64),
            slippage_bps: 100,
            expected_shares: U256::from(1_000u64),
            expected_debt: U256::from(520u64),
            expected_total_collateral: U256::from(1_450u64),
            worst_case_required_debt: U256::from(510u64),
            worst_case_shares: U256::from(995u64),
            expected_excess_debt: Some(U256::from(20u64)),
            min_excess_debt: Some(U256::from(9u64)),
            swap_path: SwapPath::Erc20,
            calls: vec![],
        }
    }

    #[test]
    fn test_mint_plan_checks() {
        assert!(validate_mint_plan(&mint_plan()).is_ok());

        let mut plan = mint_plan();
        plan.flash_loan_amount = U256::from(511u64);
        assert!(validate_mint_plan(&plan).is_err());

        let mut plan = mint_plan();
        plan.min_shares = U256::from(1_001u64);
        assert!(validate_mint_plan(&plan).is_err());

        let mut plan = mint_plan();
        plan.min_excess_debt = Some(U256::from(21u64));
        assert!(validate_mint_plan(&plan).is_err());

        let mut plan = mint_plan();
        plan.equity_in_input_asset = U256::ZERO;
        assert!(validate_mint_plan(&plan).is_err());
    }
}
