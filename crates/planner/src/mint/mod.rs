//! Mint sizing.
//!
//! Two strategies sit behind [`MintPlanner`]: the scaling quote loop with a
//! single repayability clamp ([`ScalingMintPlanner`]) and the older
//! rate-sampling solver for the V1 router ([`RateSamplingMintPlanner`]).

mod v1;
mod v2;

pub use v1::*;
pub use v2::*;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use leverage_planner_types::{
    DepositPreview, LeverageTokenAssets, MintStrategy, Quote, QuoteRequest, RouterDepositPreview,
    SwapPath, NATIVE_ASSET,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    guarded, CancelSignal, LeverageManagerReader, LeverageRouterReader, PlanError, Quoter, Result,
};

/// Upper bound on mint slippage tolerance
pub const MAX_MINT_SLIPPAGE_BPS: u32 = 5_000;

/// Upper bound on the clamp/solver safety margin
pub const MAX_EPSILON_BPS: u32 = 100;

/// Inputs to a mint planning run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintParams {
    pub token: Address,
    /// Must be the token's collateral asset
    pub input_asset: Address,
    pub equity_in_input_asset: U256,
    pub slippage_bps: u32,
    /// Safety margin applied to clamped or solved flash-loan amounts
    pub epsilon_bps: Option<u32>,
}

impl MintParams {
    pub fn new(token: Address, input_asset: Address, equity: U256, slippage_bps: u32) -> Self {
        Self {
            token,
            input_asset,
            equity_in_input_asset: equity,
            slippage_bps,
            epsilon_bps: None,
        }
    }

    pub fn with_epsilon(mut self, epsilon_bps: u32) -> Self {
        self.epsilon_bps = Some(epsilon_bps);
        self
    }

    /// Range checks that need no network access; returns the effective epsilon
    pub fn validate(&self) -> Result<u32> {
        if self.slippage_bps > MAX_MINT_SLIPPAGE_BPS {
            return Err(PlanError::InvalidSlippage {
                bps: self.slippage_bps,
                max: MAX_MINT_SLIPPAGE_BPS,
            });
        }
        let epsilon = self.epsilon_bps.unwrap_or(0);
        if epsilon > MAX_EPSILON_BPS {
            return Err(PlanError::InvalidEpsilon {
                bps: epsilon,
                max: MAX_EPSILON_BPS,
            });
        }
        if self.equity_in_input_asset.is_zero() {
            return Err(PlanError::ZeroEquity);
        }
        Ok(epsilon)
    }
}

/// Chain state a mint planner reads
#[derive(Clone)]
pub struct MintEnvironment {
    pub manager: Arc<dyn LeverageManagerReader>,
    pub router: Arc<dyn LeverageRouterReader>,
    /// Chain's wrapped native token; a debt asset equal to it is swapped as native
    pub wrapped_native: Option<Address>,
}

impl MintEnvironment {
    pub fn new(
        manager: Arc<dyn LeverageManagerReader>,
        router: Arc<dyn LeverageRouterReader>,
        wrapped_native: Option<Address>,
    ) -> Self {
        Self {
            manager,
            router,
            wrapped_native,
        }
    }
}

/// Sizes a mint against live quotes and previews
#[async_trait]
pub trait MintPlanner: Send + Sync {
    fn strategy(&self) -> MintStrategy;

    async fn plan_mint(
        &self,
        params: &MintParams,
        quoter: &dyn Quoter,
        cancel: Option<&CancelSignal>,
    ) -> Result<leverage_planner_types::MintPlan>;
}

/// Planner for the configured strategy
pub fn mint_planner(strategy: MintStrategy, env: MintEnvironment) -> Box<dyn MintPlanner> {
    match strategy {
        MintStrategy::V1 => Box::new(RateSamplingMintPlanner::new(env)),
        MintStrategy::V2 => Box::new(ScalingMintPlanner::new(env)),
    }
}

/// Values resolved before any swap is quoted
#[derive(Clone, Debug)]
pub(crate) struct MintSeed {
    pub assets: LeverageTokenAssets,
    pub router_preview: RouterDepositPreview,
    /// Collateral still missing after the user's equity
    pub needed_from_debt_swap: U256,
    pub path: SwapPath,
}

impl MintSeed {
    /// Token the venue is asked to sell
    pub fn quote_in_token(&self) -> Address {
        match self.path {
            SwapPath::Erc20 => self.assets.debt,
            SwapPath::Native => NATIVE_ASSET,
        }
    }

    pub fn debt_quote_request(&self, amount_in: U256, slippage_bps: u32) -> QuoteRequest {
        QuoteRequest::exact_in(
            self.quote_in_token(),
            self.assets.collateral,
            amount_in,
            slippage_bps,
        )
    }

    pub fn ideal_debt(&self) -> U256 {
        self.router_preview.debt
    }
}

/// Resolve assets, enforce the collateral-input rule and read the router seed
pub(crate) async fn prepare_mint(
    env: &MintEnvironment,
    params: &MintParams,
    cancel: Option<&CancelSignal>,
) -> Result<MintSeed> {
    let assets = guarded(cancel, env.manager.assets(params.token)).await?;
    if params.input_asset != assets.collateral {
        return Err(PlanError::InputAssetMismatch {
            input: params.input_asset,
            collateral: assets.collateral,
        });
    }

    let equity = params.equity_in_input_asset;
    let router_preview = guarded(cancel, env.router.preview_deposit(params.token, equity)).await?;

    if router_preview.collateral <= equity {
        return Err(PlanError::NoDebtSwapNeeded {
            target_collateral: router_preview.collateral,
            user_collateral: equity,
        });
    }
    let needed_from_debt_swap = router_preview.collateral - equity;

    let path = if assets.debt_is_wrapped_native(env.wrapped_native) {
        SwapPath::Native
    } else {
        SwapPath::Erc20
    };

    debug!(
        token = %params.token,
        ideal_debt = %router_preview.debt,
        target_collateral = %router_preview.collateral,
        needed = %needed_from_debt_swap,
        path = ?path,
        "Router seed resolved"
    );

    Ok(MintSeed {
        assets,
        router_preview,
        needed_from_debt_swap,
        path,
    })
}

/// Quote once and reject dry liquidity
pub(crate) async fn quote_debt_swap(
    quoter: &dyn Quoter,
    seed: &MintSeed,
    amount_in: U256,
    slippage_bps: u32,
    cancel: Option<&CancelSignal>,
) -> Result<Quote> {
    let request = seed.debt_quote_request(amount_in, slippage_bps);
    let quote = guarded(cancel, quoter.quote(&request)).await?;
    if quote.is_dry() {
        return Err(PlanError::InsufficientLiquidity {
            in_token: request.in_token,
            out_token: request.out_token,
            amount_in,
        });
    }
    Ok(quote)
}

/// Expected and worst-case manager previews, issued concurrently
pub(crate) async fn preview_outcomes(
    env: &MintEnvironment,
    token: Address,
    equity: U256,
    quote: &Quote,
    cancel: Option<&CancelSignal>,
) -> Result<(DepositPreview, DepositPreview)> {
    let expected_total = equity.saturating_add(quote.out);
    let worst_total = equity.saturating_add(quote.min_out);

    futures::try_join!(
        guarded(cancel, env.manager.preview_deposit(token, expected_total)),
        guarded(cancel, env.manager.preview_deposit(token, worst_total)),
    )
}
