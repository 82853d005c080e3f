use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use leverage_planner_types::{
    DepositPreview, LeverageTokenAssets, Quote, QuoteError, QuoteRequest, ReadError,
    RedeemPreview, RouterDepositPreview,
};
use std::sync::Arc;

/// Prices a conversion and returns the calls that execute it
#[async_trait]
pub trait Quoter: Send + Sync {
    /// Venue name for logging
    fn venue(&self) -> &str;

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError>;
}

/// Read-only `eth_call` access
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ReadError>;
}

/// Authoritative position manager queries
#[async_trait]
pub trait LeverageManagerReader: Send + Sync {
    async fn collateral_asset(&self, token: Address) -> Result<Address, ReadError>;

    async fn debt_asset(&self, token: Address) -> Result<Address, ReadError>;

    /// Debt and shares for depositing `total_collateral`
    async fn preview_deposit(
        &self,
        token: Address,
        total_collateral: U256,
    ) -> Result<DepositPreview, ReadError>;

    async fn preview_redeem(&self, token: Address, shares: U256)
        -> Result<RedeemPreview, ReadError>;

    /// Both assets, fetched concurrently
    async fn assets(&self, token: Address) -> Result<LeverageTokenAssets, ReadError> {
        let (collateral, debt) =
            futures::try_join!(self.collateral_asset(token), self.debt_asset(token))?;
        Ok(LeverageTokenAssets::new(collateral, debt))
    }
}

/// Router-level estimate used to seed mint sizing
#[async_trait]
pub trait LeverageRouterReader: Send + Sync {
    async fn preview_deposit(
        &self,
        token: Address,
        collateral_from_sender: U256,
    ) -> Result<RouterDepositPreview, ReadError>;
}

#[async_trait]
impl<T: Quoter + ?Sized> Quoter for Arc<T> {
    fn venue(&self) -> &str {
        (**self).venue()
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        (**self).quote(request).await
    }
}

#[async_trait]
impl<T: ContractReader + ?Sized> ContractReader for Arc<T> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ReadError> {
        (**self).call(to, data).await
    }
}
