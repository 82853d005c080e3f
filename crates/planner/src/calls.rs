use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use leverage_planner_types::{is_native_asset, Call, Quote, SwapPath};

use crate::bindings::{IWETH9, IERC20};
use crate::PlanError;

/// Check that a quote is consistent with the swap path it was requested for
pub fn check_quote_contract(path: SwapPath, in_token: Address, quote: &Quote) -> Result<(), PlanError> {
    if quote.calls.is_empty() {
        return Err(PlanError::AdapterContract {
            reason: "quote carries no swap calls".to_string(),
        });
    }

    match path {
        SwapPath::Native => {
            if !quote.wants_native_in {
                return Err(PlanError::AdapterContract {
                    reason: "native-input path received a quote that does not want native input"
                        .to_string(),
                });
            }
        }
        SwapPath::Erc20 => {
            if quote.approval_target.is_zero() {
                return Err(PlanError::AdapterContract {
                    reason: "ERC-20 path quote is missing an approval target".to_string(),
                });
            }
            if quote.approval_target == in_token {
                return Err(PlanError::AdapterContract {
                    reason: format!("approval target equals the input token {in_token}"),
                });
            }
        }
    }

    Ok(())
}

pub fn approve_call(token: Address, spender: Address, amount: U256) -> Call {
    Call::new(token, IERC20::approveCall { spender, amount }.abi_encode())
}

pub fn unwrap_call(wrapped_native: Address, amount: U256) -> Call {
    Call::new(wrapped_native, IWETH9::withdrawCall { wad: amount }.abi_encode())
}

/// Swap calls with `amount` of native value attached. Adapters usually set the
/// value themselves; when none does, it goes on the first call.
fn with_native_value(mut calls: Vec<Call>, amount: U256) -> Vec<Call> {
    if !calls.iter().any(Call::carries_value) {
        if let Some(first) = calls.first_mut() {
            first.value = amount;
        }
    }
    calls
}

/// Calls that turn `amount` of flash-borrowed debt into collateral.
///
/// ERC-20: `approve(approval_target, amount)` then the swap.
/// Native: `withdraw(amount)` on the wrapped token then the value-bearing swap.
pub fn build_debt_swap_calls(
    path: SwapPath,
    debt_asset: Address,
    amount: U256,
    quote: &Quote,
) -> Result<Vec<Call>, PlanError> {
    let in_token = match path {
        SwapPath::Erc20 => debt_asset,
        SwapPath::Native => leverage_planner_types::NATIVE_ASSET,
    };
    check_quote_contract(path, in_token, quote)?;

    let mut calls = Vec::with_capacity(quote.calls.len() + 1);
    match path {
        SwapPath::Erc20 => {
            calls.push(approve_call(debt_asset, quote.approval_target, amount));
            calls.extend(quote.calls.iter().cloned());
        }
        SwapPath::Native => {
            calls.push(unwrap_call(debt_asset, amount));
            calls.extend(with_native_value(quote.calls.clone(), amount));
        }
    }
    Ok(calls)
}

/// Swap call(s) that sell `amount` of collateral for debt during a redeem
pub fn build_collateral_swap_calls(
    collateral_asset: Address,
    amount: U256,
    quote: &Quote,
) -> Result<Vec<Call>, PlanError> {
    if quote.calls.is_empty() {
        return Err(PlanError::AdapterContract {
            reason: "quote carries no swap calls".to_string(),
        });
    }

    if is_native_asset(&collateral_asset) {
        Ok(with_native_value(quote.calls.clone(), amount))
    } else {
        Ok(quote.calls.clone())
    }
}
