use alloy_primitives::U256;
use async_trait::async_trait;
use leverage_planner_types::{MintDiagnostics, MintPlan, MintStrategy, Quote};
use tracing::{debug, info, warn};

use super::{
    prepare_mint, preview_outcomes, quote_debt_swap, MintEnvironment, MintParams, MintPlanner,
    MintSeed,
};
use crate::calls::build_debt_swap_calls;
use crate::math::{apply_slippage_floor, min, mul_div_ceil};
use crate::{CancelSignal, PlanError, Quoter, Result};

/// Maximum number of sizing quotes for the debt swap
pub const MAX_DEBT_QUOTE_ATTEMPTS: u32 = 3;

/// Debt input and the quote that prices it
#[derive(Clone, Debug)]
pub struct SizedDebtQuote {
    pub debt_in: U256,
    pub quote: Quote,
    pub attempts: u32,
}

/// Mint planner that scales the debt swap until its guaranteed output covers
/// the missing collateral, then clamps once to the repayable floor.
pub struct ScalingMintPlanner {
    env: MintEnvironment,
}

impl ScalingMintPlanner {
    pub fn new(env: MintEnvironment) -> Self {
        Self { env }
    }
}

/// Size the debt input so the swap's guaranteed output covers `needed`.
///
/// Each attempt scales the input by `needed / min_out` (rounded up). Stops
/// after [`MAX_DEBT_QUOTE_ATTEMPTS`] quotes, or early when scaling would not
/// grow the input.
pub(crate) async fn quote_debt_for_missing_collateral(
    quoter: &dyn Quoter,
    seed: &MintSeed,
    needed: U256,
    slippage_bps: u32,
    cancel: Option<&CancelSignal>,
) -> Result<SizedDebtQuote> {
    let mut debt_in = if seed.ideal_debt().is_zero() {
        needed
    } else {
        seed.ideal_debt()
    };

    let mut attempts = 0;
    loop {
        attempts += 1;
        let quote = quote_debt_swap(quoter, seed, debt_in, slippage_bps, cancel).await?;

        debug!(
            attempt = attempts,
            debt_in = %debt_in,
            out = %quote.out,
            min_out = %quote.min_out,
            needed = %needed,
            "Debt swap quoted"
        );

        if quote.min_out >= needed || attempts >= MAX_DEBT_QUOTE_ATTEMPTS {
            return Ok(SizedDebtQuote {
                debt_in,
                quote,
                attempts,
            });
        }

        let scaled = mul_div_ceil(debt_in, needed, quote.min_out);
        if scaled <= debt_in {
            return Ok(SizedDebtQuote {
                debt_in,
                quote,
                attempts,
            });
        }
        debt_in = scaled;
    }
}

#[async_trait]
impl MintPlanner for ScalingMintPlanner {
    fn strategy(&self) -> MintStrategy {
        MintStrategy::V2
    }

    async fn plan_mint(
        &self,
        params: &MintParams,
        quoter: &dyn Quoter,
        cancel: Option<&CancelSignal>,
    ) -> Result<MintPlan> {
        let epsilon_bps = params.validate()?;
        let equity = params.equity_in_input_asset;
        let seed = prepare_mint(&self.env, params, cancel).await?;
        let needed = seed.needed_from_debt_swap;

        let sized =
            quote_debt_for_missing_collateral(quoter, &seed, needed, params.slippage_bps, cancel)
                .await?;
        if sized.quote.min_out < needed {
            warn!(
                token = %params.token,
                min_out = %sized.quote.min_out,
                needed = %needed,
                attempts = sized.attempts,
                "Debt swap does not fully cover target collateral"
            );
        }

        let mut diagnostics = MintDiagnostics {
            token: params.token,
            equity,
            router_preview: seed.router_preview,
            needed_from_debt_swap: needed,
            flash_loan_amount: sized.debt_in,
            quote_attempts: sized.attempts,
            quote: Some(sized.quote.clone()),
            ..Default::default()
        };

        let mut flash_loan_amount = sized.debt_in;
        let mut quote = sized.quote;
        let (mut expected, mut worst) =
            preview_outcomes(&self.env, params.token, equity, &quote, cancel).await?;
        diagnostics.expected_preview = Some(expected);
        diagnostics.worst_case_preview = Some(worst);

        let repayable_floor = min(expected.debt, worst.debt);
        if flash_loan_amount > repayable_floor {
            let candidate = apply_slippage_floor(repayable_floor, epsilon_bps);
            diagnostics.clamp_candidate = Some(candidate);

            if candidate.is_zero() {
                return Err(PlanError::FlashLoanTooLarge(Box::new(diagnostics)));
            }

            let clamp_quote =
                quote_debt_swap(quoter, &seed, candidate, params.slippage_bps, cancel).await?;
            diagnostics.clamp_quote = Some(clamp_quote.clone());

            if clamp_quote.min_out >= needed {
                let (clamped_expected, clamped_worst) =
                    preview_outcomes(&self.env, params.token, equity, &clamp_quote, cancel).await?;

                debug!(
                    from = %flash_loan_amount,
                    to = %candidate,
                    "Flash loan clamped to repayable floor"
                );

                flash_loan_amount = candidate;
                quote = clamp_quote;
                expected = clamped_expected;
                worst = clamped_worst;
                diagnostics.flash_loan_amount = candidate;
                diagnostics.expected_preview = Some(expected);
                diagnostics.worst_case_preview = Some(worst);
            } else {
                warn!(
                    token = %params.token,
                    candidate = %candidate,
                    min_out = %clamp_quote.min_out,
                    needed = %needed,
                    "Clamp candidate no longer covers missing collateral"
                );
            }
        }

        if flash_loan_amount > min(expected.debt, worst.debt) {
            warn!(token = %params.token, diagnostics = %diagnostics, "Flash loan not repayable");
            return Err(PlanError::FlashLoanTooLarge(Box::new(diagnostics)));
        }

        let calls = build_debt_swap_calls(seed.path, seed.assets.debt, flash_loan_amount, &quote)?;
        let min_shares = apply_slippage_floor(expected.shares, params.slippage_bps);

        info!(
            token = %params.token,
            strategy = %MintStrategy::V2,
            flash_loan = %flash_loan_amount,
            expected_shares = %expected.shares,
            min_shares = %min_shares,
            "Mint planned"
        );

        Ok(MintPlan {
            strategy: MintStrategy::V2,
            token: params.token,
            input_asset: seed.assets.collateral,
            debt_asset: seed.assets.debt,
            equity_in_input_asset: equity,
            flash_loan_amount,
            min_shares,
            slippage_bps: params.slippage_bps,
            expected_shares: expected.shares,
            expected_debt: expected.debt,
            expected_total_collateral: equity.saturating_add(quote.out),
            worst_case_required_debt: worst.debt,
            worst_case_shares: worst.shares,
            expected_excess_debt: None,
            min_excess_debt: None,
            swap_path: seed.path,
            calls,
        })
    }
}
