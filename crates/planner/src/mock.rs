//! In-memory collaborators for tests and local simulation.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use leverage_planner_types::{
    Call, DepositPreview, Quote, QuoteError, QuoteRequest, ReadError, RedeemPreview,
    RouterDepositPreview,
};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::math::mul_div_floor;
use crate::{ContractReader, LeverageManagerReader, LeverageRouterReader, Quoter};

type QuoteCurve = Box<dyn Fn(&QuoteRequest) -> Result<Quote, QuoteError> + Send + Sync>;
type DepositCurve = Box<dyn Fn(U256) -> DepositPreview + Send + Sync>;

/// Quoter driven by a pricing closure, recording every request
pub struct MockQuoter {
    curve: QuoteCurve,
    requests: Mutex<Vec<QuoteRequest>>,
}

impl MockQuoter {
    pub fn new(
        curve: impl Fn(&QuoteRequest) -> Result<Quote, QuoteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            curve: Box::new(curve),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `out = amount_in * num / den`, `min_out = out * (10000 - haircut_bps) / 10000`
    pub fn linear(num: u64, den: u64, haircut_bps: u32) -> Self {
        Self::new(move |req| {
            let out = mul_div_floor(req.amount_in, U256::from(num), U256::from(den));
            let min_out = crate::math::apply_slippage_floor(out, haircut_bps);
            Ok(mock_quote(req, out, min_out))
        })
    }

    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

/// Quote with one swap call on a fixed venue address, approving a distinct spender
pub fn mock_quote(req: &QuoteRequest, out: U256, min_out: U256) -> Quote {
    let native = leverage_planner_types::is_native_asset(&req.in_token);
    let value = if native { req.amount_in } else { U256::ZERO };
    Quote::new(
        out,
        min_out,
        MOCK_SPENDER,
        vec![Call::new(MOCK_VENUE, Bytes::from(req.amount_in.to_be_bytes_vec())).with_value(value)],
    )
    .with_native_in(native)
}

pub const MOCK_VENUE: Address = Address::new([0x5a; 20]);
pub const MOCK_SPENDER: Address = Address::new([0xa1; 20]);

#[async_trait]
impl Quoter for MockQuoter {
    fn venue(&self) -> &str {
        "mock"
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        (self.curve)(request)
    }
}

/// Manager whose deposit preview is a closure of total collateral
pub struct MockManager {
    pub collateral: Address,
    pub debt: Address,
    deposit: DepositCurve,
    pub redeem: RedeemPreview,
    deposit_previews: Mutex<Vec<U256>>,
}

impl MockManager {
    pub fn new(
        collateral: Address,
        debt: Address,
        deposit: impl Fn(U256) -> DepositPreview + Send + Sync + 'static,
    ) -> Self {
        Self {
            collateral,
            debt,
            deposit: Box::new(deposit),
            redeem: RedeemPreview::default(),
            deposit_previews: Mutex::new(Vec::new()),
        }
    }

    /// Debt `= total * debt_num / debt_den`, shares equal to total collateral
    pub fn proportional(collateral: Address, debt: Address, debt_num: u64, debt_den: u64) -> Self {
        Self::new(collateral, debt, move |total| DepositPreview {
            debt: mul_div_floor(total, U256::from(debt_num), U256::from(debt_den)),
            shares: total,
        })
    }

    pub fn with_redeem(mut self, collateral: u128, debt: u128, shares: u128) -> Self {
        self.redeem = RedeemPreview {
            collateral: U256::from(collateral),
            debt: U256::from(debt),
            shares: U256::from(shares),
        };
        self
    }

    /// Total collateral values the deposit preview was called with
    pub fn deposit_previews(&self) -> Vec<U256> {
        self.deposit_previews
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeverageManagerReader for MockManager {
    async fn collateral_asset(&self, _token: Address) -> Result<Address, ReadError> {
        Ok(self.collateral)
    }

    async fn debt_asset(&self, _token: Address) -> Result<Address, ReadError> {
        Ok(self.debt)
    }

    async fn preview_deposit(
        &self,
        _token: Address,
        total_collateral: U256,
    ) -> Result<DepositPreview, ReadError> {
        if let Ok(mut previews) = self.deposit_previews.lock() {
            previews.push(total_collateral);
        }
        Ok((self.deposit)(total_collateral))
    }

    async fn preview_redeem(
        &self,
        _token: Address,
        _shares: U256,
    ) -> Result<RedeemPreview, ReadError> {
        Ok(self.redeem)
    }
}

/// Router returning a fixed seed preview
pub struct MockRouter {
    pub preview: RouterDepositPreview,
}

impl MockRouter {
    pub fn new(collateral: u128, debt: u128, shares: u128) -> Self {
        Self {
            preview: RouterDepositPreview {
                collateral: U256::from(collateral),
                debt: U256::from(debt),
                shares: U256::from(shares),
            },
        }
    }
}

#[async_trait]
impl LeverageRouterReader for MockRouter {
    async fn preview_deposit(
        &self,
        _token: Address,
        _collateral_from_sender: U256,
    ) -> Result<RouterDepositPreview, ReadError> {
        Ok(self.preview)
    }
}

/// Contract reader answering by `(target, selector)`; unknown calls revert
#[derive(Default)]
pub struct MockReader {
    responses: HashMap<(Address, [u8; 4]), Bytes>,
    calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, to: Address, selector: [u8; 4], data: impl Into<Bytes>) -> Self {
        self.responses.insert((to, selector), data.into());
        self
    }

    /// Every `(to, calldata)` pair seen so far
    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ContractReader for MockReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ReadError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((to, data.clone()));
        }
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ReadError::Transport("calldata shorter than a selector".into()))?;
        self.responses
            .get(&(to, selector))
            .cloned()
            .ok_or(ReadError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
            })
    }
}
