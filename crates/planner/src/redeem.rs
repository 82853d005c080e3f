use alloy_primitives::{Address, U256};
use leverage_planner_types::{Quote, QuoteRequest, RedeemDiagnostics, RedeemPlan, BPS_DENOMINATOR};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::calls::build_collateral_swap_calls;
use crate::math::{apply_slippage_floor, mul_div_ceil, mul_div_floor};
use crate::{guarded, CancelSignal, LeverageManagerReader, PlanError, Quoter, Result};

/// Inputs to a redeem planning run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedeemParams {
    pub token: Address,
    pub shares_to_redeem: U256,
    pub slippage_bps: u32,
}

impl RedeemParams {
    pub fn new(token: Address, shares_to_redeem: U256, slippage_bps: u32) -> Self {
        Self {
            token,
            shares_to_redeem,
            slippage_bps,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.shares_to_redeem.is_zero() {
            return Err(PlanError::ZeroShares);
        }
        if self.slippage_bps > BPS_DENOMINATOR {
            return Err(PlanError::InvalidSlippage {
                bps: self.slippage_bps,
                max: BPS_DENOMINATOR,
            });
        }
        Ok(())
    }
}

/// Collateral sized to repay a redemption's debt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralEstimate {
    pub collateral_in: U256,
    /// Quote at the first guess
    pub quote: Quote,
}

/// Sizes the collateral-to-debt swap needed to close a redemption's debt
pub struct RedeemPlanner {
    manager: Arc<dyn LeverageManagerReader>,
}

impl RedeemPlanner {
    pub fn new(manager: Arc<dyn LeverageManagerReader>) -> Self {
        Self { manager }
    }

    pub async fn plan_redeem(
        &self,
        params: &RedeemParams,
        quoter: &dyn Quoter,
        cancel: Option<&CancelSignal>,
    ) -> Result<RedeemPlan> {
        params.validate()?;

        let assets = guarded(cancel, self.manager.assets(params.token)).await?;
        let preview = guarded(
            cancel,
            self.manager.preview_redeem(params.token, params.shares_to_redeem),
        )
        .await?;

        let total_collateral = preview.collateral;
        let debt_to_repay = preview.debt;

        if debt_to_repay.is_zero() {
            debug!(token = %params.token, "Redemption carries no debt, skipping swap");
            return Ok(RedeemPlan {
                token: params.token,
                shares_to_redeem: params.shares_to_redeem,
                collateral_asset: assets.collateral,
                debt_asset: assets.debt,
                slippage_bps: params.slippage_bps,
                min_collateral_for_sender: apply_slippage_floor(
                    total_collateral,
                    params.slippage_bps,
                ),
                expected_collateral: total_collateral,
                expected_debt: U256::ZERO,
                expected_total_collateral: total_collateral,
                expected_excess_collateral: total_collateral,
                collateral_for_swap: U256::ZERO,
                calls: vec![],
            });
        }

        let estimate = estimate_collateral_for_debt(
            quoter,
            assets.collateral,
            assets.debt,
            debt_to_repay,
            params.slippage_bps,
            cancel,
        )
        .await?;
        let collateral_needed = estimate.collateral_in;

        let mut diagnostics = RedeemDiagnostics {
            token: params.token,
            shares: params.shares_to_redeem,
            preview,
            collateral_for_swap: collateral_needed,
            estimate_quote: Some(estimate.quote),
            final_quote: None,
        };

        if collateral_needed > total_collateral {
            return Err(PlanError::InsufficientCollateral(Box::new(diagnostics)));
        }

        let remaining = total_collateral - collateral_needed;
        let min_collateral_for_sender = apply_slippage_floor(remaining, params.slippage_bps);

        let request = QuoteRequest::exact_in(
            assets.collateral,
            assets.debt,
            collateral_needed,
            params.slippage_bps,
        );
        let final_quote = guarded(cancel, quoter.quote(&request)).await?;
        if final_quote.is_dry() {
            return Err(PlanError::InsufficientLiquidity {
                in_token: assets.collateral,
                out_token: assets.debt,
                amount_in: collateral_needed,
            });
        }
        if final_quote.out < debt_to_repay {
            diagnostics.final_quote = Some(final_quote);
            warn!(
                token = %params.token,
                diagnostics = %diagnostics,
                "Corrected collateral estimate undershoots debt"
            );
            return Err(PlanError::DebtNotCovered(Box::new(diagnostics)));
        }

        let calls = build_collateral_swap_calls(assets.collateral, collateral_needed, &final_quote)?;

        info!(
            token = %params.token,
            shares = %params.shares_to_redeem,
            collateral_for_swap = %collateral_needed,
            min_collateral_for_sender = %min_collateral_for_sender,
            "Redeem planned"
        );

        Ok(RedeemPlan {
            token: params.token,
            shares_to_redeem: params.shares_to_redeem,
            collateral_asset: assets.collateral,
            debt_asset: assets.debt,
            slippage_bps: params.slippage_bps,
            min_collateral_for_sender,
            expected_collateral: remaining,
            expected_debt: debt_to_repay,
            expected_total_collateral: total_collateral,
            expected_excess_collateral: remaining,
            collateral_for_swap: collateral_needed,
            calls,
        })
    }
}

/// Quote-and-correct sizing of the collateral to sell for `debt_to_repay`.
///
/// The first guess is `debt_to_repay` in collateral units. One proportional
/// correction follows: rounded up when the guess overshoots, down when it
/// undershoots.
pub async fn estimate_collateral_for_debt(
    quoter: &dyn Quoter,
    collateral_asset: Address,
    debt_asset: Address,
    debt_to_repay: U256,
    slippage_bps: u32,
    cancel: Option<&CancelSignal>,
) -> Result<CollateralEstimate> {
    let guess = debt_to_repay;
    let request = QuoteRequest::exact_in(collateral_asset, debt_asset, guess, slippage_bps);
    let quote = guarded(cancel, quoter.quote(&request)).await?;

    if quote.out.is_zero() {
        return Err(PlanError::InsufficientLiquidity {
            in_token: collateral_asset,
            out_token: debt_asset,
            amount_in: guess,
        });
    }

    let collateral_in = if quote.out == debt_to_repay {
        guess
    } else if quote.out > debt_to_repay {
        mul_div_ceil(debt_to_repay, guess, quote.out)
    } else {
        mul_div_floor(debt_to_repay, guess, quote.out)
    };

    debug!(
        guess = %guess,
        quoted_debt_out = %quote.out,
        collateral_in = %collateral_in,
        "Collateral estimate corrected"
    );

    Ok(CollateralEstimate {
        collateral_in,
        quote,
    })
}
