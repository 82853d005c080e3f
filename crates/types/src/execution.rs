use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single on-chain call attached to a router transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Contract to call
    pub target: Address,

    /// ABI-encoded calldata
    pub data: Bytes,

    /// Native currency forwarded with the call
    pub value: U256,
}

impl Call {
    pub fn new(target: Address, data: impl Into<Bytes>) -> Self {
        Self {
            target,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn carries_value(&self) -> bool {
        !self.value.is_zero()
    }
}

/// How the input leg of a swap is funded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPath {
    /// Approve the venue's approval target, then call the swap
    Erc20,
    /// Unwrap the wrapped-native token, then pay `value` into the swap
    Native,
}

/// Sum of native value carried by a call sequence
pub fn total_value(calls: &[Call]) -> U256 {
    calls.iter().fold(U256::ZERO, |acc, c| acc.saturating_add(c.value))
}
