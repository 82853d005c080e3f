use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use leverage_planner_types::{DepositPreview, ReadError, RedeemPreview, RouterDepositPreview};
use tracing::trace;

use crate::bindings::{ILeverageManager, ILeverageRouter};
use crate::{ContractReader, LeverageManagerReader, LeverageRouterReader};

/// ABI-encode `call`, `eth_call` it on `to` and decode the return tuple
pub async fn read_contract<C: SolCall, R: ContractReader + ?Sized>(
    reader: &R,
    to: Address,
    call: C,
    name: &'static str,
) -> Result<C::Return, ReadError> {
    trace!(to = %to, call = name, "eth_call");
    let data = reader.call(to, call.abi_encode().into()).await?;
    C::abi_decode_returns(&data, true).map_err(|e| ReadError::Decode {
        call: name,
        reason: e.to_string(),
    })
}

/// Leverage manager reads over a contract reader
pub struct OnChainLeverageManager<R> {
    reader: R,
    manager: Address,
}

impl<R: ContractReader> OnChainLeverageManager<R> {
    pub fn new(reader: R, manager: Address) -> Self {
        Self { reader, manager }
    }

    pub fn address(&self) -> Address {
        self.manager
    }
}

#[async_trait]
impl<R: ContractReader> LeverageManagerReader for OnChainLeverageManager<R> {
    async fn collateral_asset(&self, token: Address) -> Result<Address, ReadError> {
        let ret = read_contract(
            &self.reader,
            self.manager,
            ILeverageManager::getLeverageTokenCollateralAssetCall { token },
            "getLeverageTokenCollateralAsset",
        )
        .await?;
        Ok(ret._0)
    }

    async fn debt_asset(&self, token: Address) -> Result<Address, ReadError> {
        let ret = read_contract(
            &self.reader,
            self.manager,
            ILeverageManager::getLeverageTokenDebtAssetCall { token },
            "getLeverageTokenDebtAsset",
        )
        .await?;
        Ok(ret._0)
    }

    async fn preview_deposit(
        &self,
        token: Address,
        total_collateral: U256,
    ) -> Result<DepositPreview, ReadError> {
        let ret = read_contract(
            &self.reader,
            self.manager,
            ILeverageManager::previewDepositCall {
                token,
                collateral: total_collateral,
            },
            "previewDeposit",
        )
        .await?;
        Ok(DepositPreview {
            debt: ret._0.debt,
            shares: ret._0.shares,
        })
    }

    async fn preview_redeem(
        &self,
        token: Address,
        shares: U256,
    ) -> Result<RedeemPreview, ReadError> {
        let ret = read_contract(
            &self.reader,
            self.manager,
            ILeverageManager::previewRedeemCall { token, shares },
            "previewRedeem",
        )
        .await?;
        Ok(RedeemPreview {
            collateral: ret._0.collateral,
            debt: ret._0.debt,
            shares: ret._0.shares,
        })
    }
}

/// Leverage router reads over a contract reader
pub struct OnChainLeverageRouter<R> {
    reader: R,
    router: Address,
}

impl<R: ContractReader> OnChainLeverageRouter<R> {
    pub fn new(reader: R, router: Address) -> Self {
        Self { reader, router }
    }

    pub fn address(&self) -> Address {
        self.router
    }
}

#[async_trait]
impl<R: ContractReader> LeverageRouterReader for OnChainLeverageRouter<R> {
    async fn preview_deposit(
        &self,
        token: Address,
        collateral_from_sender: U256,
    ) -> Result<RouterDepositPreview, ReadError> {
        let ret = read_contract(
            &self.reader,
            self.router,
            ILeverageRouter::previewDepositCall {
                token,
                collateralFromSender: collateral_from_sender,
            },
            "previewDeposit",
        )
        .await?;
        Ok(RouterDepositPreview {
            collateral: ret._0.collateral,
            debt: ret._0.debt,
            shares: ret._0.shares,
        })
    }
}
