use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Router-level deposit estimate, used only to seed sizing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterDepositPreview {
    /// Total collateral the position would hold after the deposit
    pub collateral: U256,
    /// Debt the router would take through a flash loan
    pub debt: U256,
    pub shares: U256,
}

/// Manager deposit preview at a given total collateral
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPreview {
    /// Debt the manager will borrow and hand back for this collateral
    pub debt: U256,
    pub shares: U256,
}

/// Manager redeem preview at a given share count
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemPreview {
    /// Collateral released by the redemption
    pub collateral: U256,
    /// Debt that must be repaid before the collateral is released
    pub debt: U256,
    pub shares: U256,
}
