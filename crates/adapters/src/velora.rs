use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use leverage_planner_core::bindings::IERC20;
use leverage_planner_core::math::apply_slippage_floor;
use leverage_planner_core::{read_contract, ContractReader, Quoter};
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::http::{
    api_token, get_json, parse_address, parse_bytes, parse_u256, parse_value, post_json,
    NativeSpelling,
};

const VENUE: &str = "velora";

pub const VELORA_DEFAULT_BASE_URL: &str = "https://api.paraswap.io";

const NATIVE_DECIMALS: u8 = 18;

/// Velora (ParaSwap) client: price route first, then a transaction built for it
pub struct VeloraQuoter {
    base_url: String,
    client: reqwest::Client,
    chain_id: u64,
    executor: Address,
    partner: Option<String>,
    /// Used to look up token decimals when present
    reader: Option<Arc<dyn ContractReader>>,
}

impl VeloraQuoter {
    pub fn new(
        base_url: impl Into<String>,
        client: reqwest::Client,
        chain_id: u64,
        executor: Address,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            chain_id,
            executor,
            partner: None,
            reader: None,
        }
    }

    pub fn with_partner(mut self, partner: Option<String>) -> Self {
        self.partner = partner;
        self
    }

    pub fn with_reader(mut self, reader: Option<Arc<dyn ContractReader>>) -> Self {
        self.reader = reader;
        self
    }

    async fn decimals(&self, token: Address) -> Option<u8> {
        if is_native_asset(&token) {
            return Some(NATIVE_DECIMALS);
        }
        let reader = self.reader.as_ref()?;
        match read_contract(reader.as_ref(), token, IERC20::decimalsCall {}, "decimals").await {
            Ok(ret) => Some(ret._0),
            Err(e) => {
                warn!(venue = VENUE, token = %token, error = %e, "Token decimals unavailable");
                None
            }
        }
    }

    async fn prices_query(&self, request: &QuoteRequest) -> PricesQuery {
        let (src_decimals, dest_decimals) = tokio::join!(
            self.decimals(request.in_token),
            self.decimals(request.out_token)
        );
        PricesQuery {
            src_token: api_token(request.in_token, NativeSpelling::Sentinel),
            dest_token: api_token(request.out_token, NativeSpelling::Sentinel),
            amount: request.amount_in.to_string(),
            src_decimals,
            dest_decimals,
            side: "SELL",
            network: self.chain_id,
            user_address: self.executor,
            partner: self.partner.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PricesQuery {
    src_token: Address,
    dest_token: Address,
    amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest_decimals: Option<u8>,
    side: &'static str,
    network: u64,
    user_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricesResponse {
    price_route: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRouteSummary {
    dest_amount: String,
    token_transfer_proxy: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBody<'a> {
    src_token: Address,
    dest_token: Address,
    src_amount: String,
    /// Basis points
    slippage: u32,
    price_route: &'a serde_json::Value,
    user_address: Address,
    receiver: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    to: String,
    data: String,
    value: Option<String>,
}

/// Expected output and spender from an opaque price route
fn summarize_route(route: &serde_json::Value) -> Result<(U256, Address), QuoteError> {
    let summary: PriceRouteSummary =
        serde_json::from_value(route.clone()).map_err(|e| QuoteError::InvalidResponse {
            venue: VENUE,
            reason: format!("priceRoute: {e}"),
        })?;
    let out = parse_u256(VENUE, "destAmount", &summary.dest_amount)?;
    let spender = parse_address(VENUE, "tokenTransferProxy", &summary.token_transfer_proxy)?;
    Ok((out, spender))
}

fn into_venue_quote(
    route: serde_json::Value,
    tx: TransactionResponse,
    slippage_bps: u32,
    native_in: bool,
) -> Result<VenueQuote, QuoteError> {
    let (out, approval_target) = summarize_route(&route)?;
    let target = parse_address(VENUE, "to", &tx.to)?;
    let data = parse_bytes(VENUE, "data", &tx.data)?;
    let value = parse_value(VENUE, tx.value.as_deref())?;

    Ok(VenueQuote {
        out,
        min_out: Some(apply_slippage_floor(out, slippage_bps)),
        approval_target,
        calls: vec![Call::new(target, data).with_value(value)],
        wants_native_in: native_in,
        metadata: QuoteMetadata::Velora { price_route: route },
    })
}

#[async_trait]
impl Quoter for VeloraQuoter {
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

        let prices_url = format!("{}/prices", self.base_url);
        let query = self.prices_query(request).await;
        let prices: PricesResponse = get_json(&self.client, VENUE, &prices_url, &query, &[]).await?;
        let (out, _) = summarize_route(&prices.price_route)?;
        if out.is_zero() {
            return Err(QuoteError::NoRoute { venue: VENUE });
        }

        let tx_url = format!(
            "{}/transactions/{}?ignoreChecks=true",
            self.base_url, self.chain_id
        );
        let body = TransactionBody {
            src_token: query.src_token,
            dest_token: query.dest_token,
            src_amount: request.amount_in.to_string(),
            slippage: request.slippage_bps,
            price_route: &prices.price_route,
            user_address: self.executor,
            receiver: self.executor,
            partner: self.partner.clone(),
        };
        let tx: TransactionResponse = post_json(&self.client, VENUE, &tx_url, &body).await?;

        let quote = into_venue_quote(
            prices.price_route,
            tx,
            request.slippage_bps,
            is_native_asset(&request.in_token),
        )?;

        debug!(
            venue = VENUE,
            amount_in = %request.amount_in,
            out = %quote.out,
            "Quoted"
        );
        Ok(quote.into())
    }
}
