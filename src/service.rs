use alloy_primitives::{Address, U256};
use leverage_planner_adapters::{build_quoter, AdapterContext, JsonRpcReader};
use leverage_planner_config::{validate_config, AppConfig, ChainConfig, ConfigError};
use leverage_planner_core::{
    encode_mint, encode_redeem, mint_planner, validate_mint_plan, validate_redeem_plan,
    CancelSignal, ContractReader, LeverageManagerReader, MintEnvironment, MintParams,
    MintPlanner, OnChainLeverageManager, OnChainLeverageRouter, PlanError, Quoter, RedeemParams,
    RedeemPlanner, RouterTransaction,
};
use leverage_planner_telemetry::{PlanErrorContext, PlanId, PlanKind, PlanSpan};
use leverage_planner_types::{MintPlan, MintStrategy, RedeemPlan};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

use crate::{Result, ServiceError};

/// A finished mint plan and the router transaction that executes it
#[derive(Clone, Debug)]
pub struct PlannedMint {
    pub plan_id: PlanId,
    pub plan: MintPlan,
    pub transaction: RouterTransaction,
}

/// A finished redeem plan and the router transaction that executes it
#[derive(Clone, Debug)]
pub struct PlannedRedeem {
    pub plan_id: PlanId,
    pub plan: RedeemPlan,
    pub transaction: RouterTransaction,
}

struct ChainHandle {
    config: ChainConfig,
    env: MintEnvironment,
}

struct TokenHandle {
    address: Address,
    chain: String,
    strategy: MintStrategy,
    mint_quoter: Arc<dyn Quoter>,
    redeem_quoter: Arc<dyn Quoter>,
}

/// Plans mints and redeems for the tokens named in an [`AppConfig`]
pub struct PlannerService {
    config: AppConfig,
    chains: HashMap<String, ChainHandle>,
    tokens: HashMap<String, TokenHandle>,
}

impl PlannerService {
    /// Build the service with a JSON-RPC reader per configured chain
    pub fn from_config(config: AppConfig) -> Result<Self> {
        Self::with_readers(config, |name, chain| {
            let reader = JsonRpcReader::new(&chain.rpc_url, Duration::from_millis(chain.timeout_ms))
                .map_err(|e| ServiceError::adapter(format!("chain {name}"), e))?;
            Ok(Arc::new(reader) as Arc<dyn ContractReader>)
        })
    }

    /// Build the service with caller-supplied contract readers
    ///
    /// Every venue referenced by a token is turned into a quoter up front, so
    /// missing venue settings fail here instead of mid-plan.
    pub fn with_readers<F>(config: AppConfig, mut reader_for: F) -> Result<Self>
    where
        F: FnMut(&str, &ChainConfig) -> Result<Arc<dyn ContractReader>>,
    {
        validate_config(&config)?;
        let quote_timeout = Duration::from_millis(config.planner.quote_timeout_ms);

        let mut chains = HashMap::new();
        let mut contexts = HashMap::new();
        for (name, chain) in &config.chains {
            let reader = reader_for(name, chain)?;

            let manager = OnChainLeverageManager::new(reader.clone(), chain.leverage_manager);
            let router = OnChainLeverageRouter::new(reader.clone(), chain.leverage_router);
            let env = MintEnvironment::new(Arc::new(manager), Arc::new(router), chain.wrapped_native);

            let mut context = AdapterContext::new(chain.chain_id, chain.multicall_executor)
                .with_reader(reader)
                .with_timeout(quote_timeout)
                .map_err(|e| ServiceError::adapter(format!("chain {name}"), e))?;
            if let Some(wrapped_native) = chain.wrapped_native {
                context = context.with_wrapped_native(wrapped_native);
            }

            contexts.insert(name.clone(), context);
            chains.insert(
                name.clone(),
                ChainHandle {
                    config: chain.clone(),
                    env,
                },
            );
        }

        let mut tokens = HashMap::new();
        for (name, token) in &config.tokens {
            let context = contexts.get(&token.chain).ok_or_else(|| {
                ConfigError::NotFound {
                    kind: "chain",
                    name: token.chain.clone(),
                }
            })?;

            let build = |venue_name: &str| -> Result<Arc<dyn Quoter>> {
                let venue = config.venue(venue_name)?;
                build_quoter(venue, context)
                    .map_err(|e| ServiceError::adapter(format!("venue {venue_name}"), e))
            };

            tokens.insert(
                name.clone(),
                TokenHandle {
                    address: token.address,
                    chain: token.chain.clone(),
                    strategy: config.mint_strategy_for(token),
                    mint_quoter: build(&token.mint_venue)?,
                    redeem_quoter: build(&token.redeem_venue)?,
                },
            );
        }

        info!(
            chains = chains.len(),
            tokens = tokens.len(),
            "Planner service ready"
        );

        Ok(Self {
            config,
            chains,
            tokens,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Names of the tokens this service can plan for
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    /// Mint strategy configured for `token`
    pub fn mint_strategy(&self, token: &str) -> Result<MintStrategy> {
        Ok(self.token(token)?.1.strategy)
    }

    fn token(&self, name: &str) -> Result<(&ChainHandle, &TokenHandle)> {
        let handle = self.tokens.get(name).ok_or_else(|| {
            ConfigError::NotFound {
                kind: "token",
                name: name.to_string(),
            }
        })?;
        let chain = self.chains.get(&handle.chain).ok_or_else(|| {
            ConfigError::NotFound {
                kind: "chain",
                name: handle.chain.clone(),
            }
        })?;
        Ok((chain, handle))
    }

    fn slippage_bps(&self, requested: Option<u32>) -> Result<u32> {
        match requested {
            Some(bps) => Ok(bps),
            None => Ok(self.config.planner.slippage_bps()?),
        }
    }

    /// Plan a mint of `token` from `equity` units of its collateral asset
    pub async fn plan_mint(
        &self,
        token: &str,
        equity: U256,
        slippage_bps: Option<u32>,
        cancel: Option<&CancelSignal>,
    ) -> Result<PlannedMint> {
        let (chain, handle) = self.token(token)?;
        let slippage_bps = self.slippage_bps(slippage_bps)?;
        let address = handle.address;
        let span = PlanSpan::new(PlanKind::Mint, token);
        let plan_id = span.plan_id;

        async move {
            let collateral = chain
                .env
                .manager
                .collateral_asset(address)
                .await
                .map_err(PlanError::from)?;

            let mut params = MintParams::new(address, collateral, equity, slippage_bps);
            if let Some(epsilon_bps) = self.config.planner.epsilon_bps {
                params = params.with_epsilon(epsilon_bps);
            }

            let planner = mint_planner(handle.strategy, chain.env.clone());
            let plan = planner
                .plan_mint(&params, handle.mint_quoter.as_ref(), cancel)
                .await?;
            validate_mint_plan(&plan)?;

            let transaction = encode_mint(
                chain.config.leverage_router,
                &plan,
                chain.config.multicall_executor,
            );

            Ok::<_, ServiceError>(PlannedMint {
                plan_id,
                plan,
                transaction,
            })
        }
        .instrument(span.span())
        .await
        .with_plan_id(plan_id)
    }

    /// Plan a redeem of `shares` of `token`
    pub async fn plan_redeem(
        &self,
        token: &str,
        shares: U256,
        slippage_bps: Option<u32>,
        cancel: Option<&CancelSignal>,
    ) -> Result<PlannedRedeem> {
        let (chain, handle) = self.token(token)?;
        let slippage_bps = self.slippage_bps(slippage_bps)?;
        let address = handle.address;
        let span = PlanSpan::new(PlanKind::Redeem, token);
        let plan_id = span.plan_id;

        async move {
            let params = RedeemParams::new(address, shares, slippage_bps);
            let planner = RedeemPlanner::new(chain.env.manager.clone());
            let plan = planner
                .plan_redeem(&params, handle.redeem_quoter.as_ref(), cancel)
                .await?;
            validate_redeem_plan(&plan)?;

            let transaction = encode_redeem(
                chain.config.leverage_router,
                &plan,
                chain.config.multicall_executor,
            );

            Ok::<_, ServiceError>(PlannedRedeem {
                plan_id,
                plan,
                transaction,
            })
        }
        .instrument(span.span())
        .await
        .with_plan_id(plan_id)
    }
}
