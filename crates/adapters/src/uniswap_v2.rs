use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use leverage_planner_core::math::apply_slippage_floor;
use leverage_planner_core::{read_contract, ContractReader, Quoter};
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

sol! {
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactETHForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);
    }
}

const VENUE: &str = "uniswapV2";

/// Seconds a swap stays valid when the venue sets no deadline
pub const DEFAULT_DEADLINE_SECS: u64 = 20 * 60;

/// Direct-pair quotes from a Uniswap V2 style router
pub struct UniswapV2Quoter {
    reader: Arc<dyn ContractReader>,
    router: Address,
    wrapped_native: Address,
    executor: Address,
    deadline_secs: u64,
}

impl UniswapV2Quoter {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        router: Address,
        wrapped_native: Address,
        executor: Address,
    ) -> Self {
        Self {
            reader,
            router,
            wrapped_native,
            executor,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }

    pub fn with_deadline_secs(mut self, deadline_secs: u64) -> Self {
        self.deadline_secs = deadline_secs;
        self
    }

    fn deadline(&self) -> U256 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        U256::from(now.saturating_add(self.deadline_secs))
    }

    fn swap_call(&self, request: &QuoteRequest, path: Vec<Address>, min_out: U256) -> Call {
        let deadline = self.deadline();
        if is_native_asset(&request.in_token) {
            let data = IUniswapV2Router02::swapExactETHForTokensCall {
                amountOutMin: min_out,
                path,
                to: self.executor,
                deadline,
            }
            .abi_encode();
            Call::new(self.router, data).with_value(request.amount_in)
        } else {
            let data = IUniswapV2Router02::swapExactTokensForTokensCall {
                amountIn: request.amount_in,
                amountOutMin: min_out,
                path,
                to: self.executor,
                deadline,
            }
            .abi_encode();
            Call::new(self.router, data)
        }
    }
}

#[async_trait]
impl Quoter for UniswapV2Quoter {
    fn venue(&self) -> &str {
        VENUE
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        if request.intent == QuoteIntent::ExactOut {
            return Err(QuoteError::Unsupported {
                venue: VENUE,
                reason: "exact-out quotes".to_string(),
            });
        }
        if is_native_asset(&request.out_token) {
            return Err(QuoteError::Unsupported {
                venue: VENUE,
                reason: "native output".to_string(),
            });
        }

        let native_in = is_native_asset(&request.in_token);
        let token_in = if native_in {
            self.wrapped_native
        } else {
            request.in_token
        };
        let path = vec![token_in, request.out_token];

        let amounts = read_contract(
            self.reader.as_ref(),
            self.router,
            IUniswapV2Router02::getAmountsOutCall {
                amountIn: request.amount_in,
                path: path.clone(),
            },
            "getAmountsOut",
        )
        .await?
        .amounts;

        let out = amounts.last().copied().ok_or(QuoteError::NoRoute { venue: VENUE })?;
        let min_out = apply_slippage_floor(out, request.slippage_bps);

        debug!(
            venue = VENUE,
            amount_in = %request.amount_in,
            out = %out,
            min_out = %min_out,
            "Quoted"
        );

        let call = self.swap_call(request, path.clone(), min_out);
        Ok(VenueQuote {
            out,
            min_out: Some(min_out),
            approval_target: self.router,
            calls: vec![call],
            wants_native_in: native_in,
            metadata: QuoteMetadata::UniswapV2 { path },
        }
        .into())
    }
}
