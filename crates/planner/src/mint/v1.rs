use alloy_primitives::U256;
use async_trait::async_trait;
use leverage_planner_types::{MintDiagnostics, MintPlan, MintStrategy};
use tracing::{debug, info, warn};

use super::{prepare_mint, preview_outcomes, quote_debt_swap, MintEnvironment, MintParams, MintPlanner};
use crate::calls::build_debt_swap_calls;
use crate::math::{apply_slippage_floor, min, mul_div_floor, wad_ratio, WAD};
use crate::{guarded, CancelSignal, PlanError, Quoter, Result};

/// One swap sample and one manager sample taken at the router's seed size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateSample {
    /// Debt sold in the sample swap
    pub flash_sample: U256,
    /// Guaranteed collateral bought by the sample swap
    pub swap_out: U256,
    /// Total collateral the manager was previewed at
    pub preview_collateral: U256,
    /// Debt the manager reported for `preview_collateral`
    pub preview_debt: U256,
}

impl RateSample {
    /// Swap-implied debt per collateral, WAD scaled
    pub fn swap_rate(&self) -> U256 {
        wad_ratio(self.flash_sample, self.swap_out)
    }

    /// Manager-implied debt per collateral, WAD scaled
    pub fn preview_rate(&self) -> U256 {
        wad_ratio(self.preview_debt, self.preview_collateral)
    }
}

/// Largest flash loan `F` with `m * (E + F / q) >= F` under a linear model.
///
/// `q` is the swap-implied rate and `m` the manager-implied rate, both debt
/// per collateral. The bound is `F <= m * q * E / (q - m)`. When `q <= m` the
/// model has no finite bound and the smaller of the two sampled debts is used.
pub fn solve_flash_loan_amount_from_implied_rates(equity: U256, sample: &RateSample) -> U256 {
    let q = sample.swap_rate();
    let m = sample.preview_rate();

    if q <= m {
        return min(sample.flash_sample, sample.preview_debt);
    }

    let mq = mul_div_floor(m, q, WAD);
    mul_div_floor(mq, equity, q - m)
}

/// Mint planner for the router interface that takes a minimum-shares and
/// minimum-excess-debt pair.
pub struct RateSamplingMintPlanner {
    env: MintEnvironment,
}

impl RateSamplingMintPlanner {
    pub fn new(env: MintEnvironment) -> Self {
        Self { env }
    }
}

#[async_trait]
impl MintPlanner for RateSamplingMintPlanner {
    fn strategy(&self) -> MintStrategy {
        MintStrategy::V1
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

        let flash_sample = if seed.ideal_debt().is_zero() {
            seed.needed_from_debt_swap
        } else {
            seed.ideal_debt()
        };
        let sample_quote =
            quote_debt_swap(quoter, &seed, flash_sample, params.slippage_bps, cancel).await?;

        let preview_collateral = equity.saturating_add(sample_quote.min_out);
        let sample_preview = guarded(
            cancel,
            self.env.manager.preview_deposit(params.token, preview_collateral),
        )
        .await?;

        let sample = RateSample {
            flash_sample,
            swap_out: sample_quote.min_out,
            preview_collateral,
            preview_debt: sample_preview.debt,
        };
        let solved = solve_flash_loan_amount_from_implied_rates(equity, &sample);
        let flash_loan_amount = apply_slippage_floor(solved, epsilon_bps);

        debug!(
            swap_rate = %sample.swap_rate(),
            preview_rate = %sample.preview_rate(),
            solved = %solved,
            flash_loan = %flash_loan_amount,
            "Flash loan solved from implied rates"
        );

        let mut diagnostics = MintDiagnostics {
            token: params.token,
            equity,
            router_preview: seed.router_preview,
            needed_from_debt_swap: seed.needed_from_debt_swap,
            flash_loan_amount,
            quote_attempts: 1,
            quote: Some(sample_quote),
            ..Default::default()
        };

        if flash_loan_amount.is_zero() {
            return Err(PlanError::InvalidPlan {
                reason: format!("rate solver produced a zero flash loan ({diagnostics})"),
            });
        }

        let quote =
            quote_debt_swap(quoter, &seed, flash_loan_amount, params.slippage_bps, cancel).await?;
        diagnostics.quote_attempts = 2;
        diagnostics.quote = Some(quote.clone());

        let (expected, worst) =
            preview_outcomes(&self.env, params.token, equity, &quote, cancel).await?;
        diagnostics.expected_preview = Some(expected);
        diagnostics.worst_case_preview = Some(worst);

        if flash_loan_amount > min(expected.debt, worst.debt) {
            warn!(token = %params.token, diagnostics = %diagnostics, "Flash loan not repayable");
            return Err(PlanError::FlashLoanTooLarge(Box::new(diagnostics)));
        }

        let expected_excess_debt = expected.debt - flash_loan_amount;
        let min_excess_debt =
            apply_slippage_floor(worst.debt - flash_loan_amount, params.slippage_bps);
        let min_shares = apply_slippage_floor(expected.shares, params.slippage_bps);
        let calls = build_debt_swap_calls(seed.path, seed.assets.debt, flash_loan_amount, &quote)?;

        info!(
            token = %params.token,
            strategy = %MintStrategy::V1,
            flash_loan = %flash_loan_amount,
            expected_shares = %expected.shares,
            min_excess_debt = %min_excess_debt,
            "Mint planned"
        );

        Ok(MintPlan {
            strategy: MintStrategy::V1,
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
            expected_excess_debt: Some(expected_excess_debt),
            min_excess_debt: Some(min_excess_debt),
            swap_path: seed.path,
            calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_closed_form_two_x_leverage() {
        // 1:1 swap, manager borrows 0.5 debt per collateral: F = E
        let sample = RateSample {
            flash_sample: u(500_000),
            swap_out: u(500_000),
            preview_collateral: u(1_500_000),
            preview_debt: u(750_000),
        };
        assert_eq!(sample.swap_rate(), WAD);
        assert_eq!(sample.preview_rate(), WAD / u(2));
        assert_eq!(
            solve_flash_loan_amount_from_implied_rates(u(1_000_000), &sample),
            u(1_000_000)
        );
    }

    #[test]
    fn test_worse_swap_rate_shrinks_flash_loan() {
        let fair = RateSample {
            flash_sample: u(500_000),
            swap_out: u(500_000),
            preview_collateral: u(1_500_000),
            preview_debt: u(750_000),
        };
        let lossy = RateSample {
            swap_out: u(450_000),
            ..fair
        };
        let equity = u(1_000_000);
        assert!(
            solve_flash_loan_amount_from_implied_rates(equity, &lossy)
                < solve_flash_loan_amount_from_implied_rates(equity, &fair)
        );
    }

    #[test]
    fn test_no_finite_bound_falls_back_to_smaller_sample() {
        // manager lends more debt per collateral than the swap costs
        let sample = RateSample {
            flash_sample: u(500_000),
            swap_out: u(1_000_000),
            preview_collateral: u(2_000_000),
            preview_debt: u(1_200_000),
        };
        assert!(sample.swap_rate() <= sample.preview_rate());
        assert_eq!(
            solve_flash_loan_amount_from_implied_rates(u(1_000_000), &sample),
            u(500_000)
        );
    }

    #[test]
    fn test_solution_is_repayable_under_linear_model() {
        let sample = RateSample {
            flash_sample: u(2_000_000),
            swap_out: u(1_000_000),
            preview_collateral: u(3_000_000),
            preview_debt: u(4_500_000),
        };
        let equity = u(2_000_000);
        let f = solve_flash_loan_amount_from_implied_rates(equity, &sample);

        // collateral bought at q = 2 debt per collateral, manager lends m = 1.5
        let total = equity + f / u(2);
        let required = total * u(3) / u(2);
        assert!(f <= required);
        assert!(!f.is_zero());
    }
}
