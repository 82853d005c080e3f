//! Router transaction payloads built from finished plans.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use leverage_planner_types::{Call, MintPlan, MintStrategy, RedeemPlan};
use serde::{Deserialize, Serialize};

use crate::bindings::{ILeverageRouter, ILeverageRouterV1, RouterCall};

/// Calldata for the router transaction the execution layer submits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterTransaction {
    pub to: Address,
    pub data: Bytes,
}

fn router_calls(calls: &[Call]) -> Vec<RouterCall> {
    calls
        .iter()
        .map(|c| RouterCall {
            target: c.target,
            value: c.value,
            data: c.data.clone(),
        })
        .collect()
}

/// Encode a mint for the router generation its strategy targets
pub fn encode_mint(router: Address, plan: &MintPlan, multicall_executor: Address) -> RouterTransaction {
    let data = match plan.strategy {
        MintStrategy::V2 => ILeverageRouter::depositCall {
            token: plan.token,
            collateralFromSender: plan.equity_in_input_asset,
            flashLoanAmount: plan.flash_loan_amount,
            minShares: plan.min_shares,
            multicallExecutor: multicall_executor,
            swapCalls: router_calls(&plan.calls),
        }
        .abi_encode(),
        MintStrategy::V1 => ILeverageRouterV1::mintCall {
            token: plan.token,
            equityInCollateralAsset: plan.equity_in_input_asset,
            flashLoanAmount: plan.flash_loan_amount,
            minShares: plan.min_shares,
            minExcessDebt: plan.min_excess_debt.unwrap_or_default(),
            swapCalls: router_calls(&plan.calls),
        }
        .abi_encode(),
    };

    RouterTransaction {
        to: router,
        data: data.into(),
    }
}

pub fn encode_redeem(
    router: Address,
    plan: &RedeemPlan,
    multicall_executor: Address,
) -> RouterTransaction {
    let data = ILeverageRouter::redeemCall {
        token: plan.token,
        shares: plan.shares_to_redeem,
        minCollateralForSender: plan.min_collateral_for_sender,
        multicallExecutor: multicall_executor,
        swapCalls: router_calls(&plan.calls),
    }
    .abi_encode();

    RouterTransaction {
        to: router,
        data: data.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use leverage_planner_types::SwapPath;

    fn plan(strategy: MintStrategy) -> MintPlan {
        MintPlan {
            strategy,
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
            calls: vec![Call::new(Address::repeat_byte(0x5a), vec![0xab])],
        }
    }

    #[test]
    fn test_v2_mint_encodes_deposit() {
        let executor = Address::repeat_byte(0xe0);
        let tx = encode_mint(Address::repeat_byte(0x99), &plan(MintStrategy::V2), executor);

        let decoded = ILeverageRouter::depositCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.flashLoanAmount, U256::from(500u64));
        assert_eq!(decoded.minShares, U256::from(990u64));
        assert_eq!(decoded.multicallExecutor, executor);
        assert_eq!(decoded.swapCalls.len(), 1);
        assert_eq!(decoded.swapCalls[0].target, Address::repeat_byte(0x5a));
    }

    #[test]
    fn test_v1_mint_encodes_excess_debt_floor() {
        let tx = encode_mint(
            Address::repeat_byte(0x99),
            &plan(MintStrategy::V1),
            Address::ZERO,
        );

        let decoded = ILeverageRouterV1::mintCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.minExcessDebt, U256::from(9u64));
        assert_eq!(decoded.equityInCollateralAsset, U256::from(1_000u64));
    }
}
