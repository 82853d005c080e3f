use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Sentinel address used by swap venues to denote the chain's native currency.
pub const NATIVE_ASSET: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Returns true for the native sentinel and for the zero address, which some
/// aggregators use for the same purpose.
pub fn is_native_asset(asset: &Address) -> bool {
    *asset == NATIVE_ASSET || asset.is_zero()
}

/// Collateral and debt assets of a leverage token, as reported by the manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeverageTokenAssets {
    pub collateral: Address,
    pub debt: Address,
}

impl LeverageTokenAssets {
    pub fn new(collateral: Address, debt: Address) -> Self {
        Self { collateral, debt }
    }

    /// True when the debt leg is the chain's wrapped native token and must be
    /// unwrapped before it can be swapped as native currency.
    pub fn debt_is_wrapped_native(&self, wrapped_native: Option<Address>) -> bool {
        wrapped_native.is_some_and(|w| w == self.debt)
    }
}
