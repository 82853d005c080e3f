use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use leverage_planner_core::math::apply_slippage_floor;
use leverage_planner_core::{read_contract, ContractReader, Quoter};
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use std::sync::Arc;
use tracing::debug;

sol! {
    struct QuoteExactInputSingleParams {
        address tokenIn;
        address tokenOut;
        uint256 amountIn;
        uint24 fee;
        uint160 sqrtPriceLimitX96;
    }

    struct ExactInputSingleParams {
        address tokenIn;
        address tokenOut;
        uint24 fee;
        address recipient;
        uint256 amountIn;
        uint256 amountOutMinimum;
        uint160 sqrtPriceLimitX96;
    }

    interface IQuoterV2 {
        function quoteExactInputSingle(QuoteExactInputSingleParams memory params)
            external
            returns (
                uint256 amountOut,
                uint160 sqrtPriceX96After,
                uint32 initializedTicksCrossed,
                uint256 gasEstimate
            );
    }

    interface ISwapRouter02 {
        function exactInputSingle(ExactInputSingleParams calldata params)
            external payable returns (uint256 amountOut);
    }
}

const VENUE: &str = "uniswapV3";

/// Pool fee tiers deployed on every Uniswap V3 factory
pub const UNISWAP_V3_FEE_TIERS: [u32; 4] = [100, 500, 3_000, 10_000];

/// Single-pool quotes through QuoterV2, executed on SwapRouter02
pub struct UniswapV3Quoter {
    reader: Arc<dyn ContractReader>,
    quoter: Address,
    router: Address,
    fee: u32,
    wrapped_native: Address,
    executor: Address,
}

impl UniswapV3Quoter {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        quoter: Address,
        router: Address,
        fee: u32,
        wrapped_native: Address,
        executor: Address,
    ) -> Self {
        Self {
            reader,
            quoter,
            router,
            fee,
            wrapped_native,
            executor,
        }
    }
}

#[async_trait]
impl Quoter for UniswapV3Quoter {
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

        let quoted = read_contract(
            self.reader.as_ref(),
            self.quoter,
            IQuoterV2::quoteExactInputSingleCall {
                params: QuoteExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: request.out_token,
                    amountIn: request.amount_in,
                    fee: U24::from(self.fee),
                    sqrtPriceLimitX96: U160::ZERO,
                },
            },
            "quoteExactInputSingle",
        )
        .await?;

        let out = quoted.amountOut;
        if out.is_zero() {
            return Err(QuoteError::NoRoute { venue: VENUE });
        }
        let min_out = apply_slippage_floor(out, request.slippage_bps);

        debug!(
            venue = VENUE,
            fee = self.fee,
            amount_in = %request.amount_in,
            out = %out,
            gas_estimate = %quoted.gasEstimate,
            "Quoted"
        );

        let data = ISwapRouter02::exactInputSingleCall {
            params: ExactInputSingleParams {
                tokenIn: token_in,
                tokenOut: request.out_token,
                fee: U24::from(self.fee),
                recipient: self.executor,
                amountIn: request.amount_in,
                amountOutMinimum: min_out,
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode();
        let value = if native_in {
            request.amount_in
        } else {
            U256::ZERO
        };

        Ok(VenueQuote {
            out,
            min_out: Some(min_out),
            approval_target: self.router,
            calls: vec![Call::new(self.router, data).with_value(value)],
            wants_native_in: native_in,
            metadata: QuoteMetadata::UniswapV3 {
                fee: self.fee,
                gas_estimate: quoted.gasEstimate,
            },
        }
        .into())
    }
}
