use alloy_primitives::Address;
use async_trait::async_trait;
use leverage_planner_core::Quoter;
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::{
    api_token, bps_to_percent, parse_address, parse_bytes, parse_u256, parse_value, post_json,
    NativeSpelling,
};

const VENUE: &str = "balmy";

pub const BALMY_DEFAULT_BASE_URL: &str = "https://api.balmy.xyz";

/// Balmy meta-aggregator: asks every source, keeps the best output
pub struct BalmyQuoter {
    base_url: String,
    client: reqwest::Client,
    chain_id: u64,
    executor: Address,
    sources: Vec<String>,
}

impl BalmyQuoter {
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
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    fn body(&self, request: &QuoteRequest) -> BalmyQuoteRequest {
        BalmyQuoteRequest {
            chain_id: self.chain_id,
            sell_token: api_token(request.in_token, NativeSpelling::Sentinel),
            buy_token: api_token(request.out_token, NativeSpelling::Sentinel),
            order: BalmyOrder {
                kind: "sell",
                sell_amount: request.amount_in.to_string(),
            },
            slippage_percentage: bps_to_percent(request.slippage_bps)
                .to_f64()
                .unwrap_or_default(),
            taker_address: self.executor,
            recipient: self.executor,
            filters: (!self.sources.is_empty()).then(|| BalmyFilters {
                include_sources: self.sources.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalmyQuoteRequest {
    chain_id: u64,
    sell_token: Address,
    buy_token: Address,
    order: BalmyOrder,
    slippage_percentage: f64,
    taker_address: Address,
    recipient: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<BalmyFilters>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalmyOrder {
    #[serde(rename = "type")]
    kind: &'static str,
    sell_amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalmyFilters {
    include_sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BalmyQuotesResponse {
    #[serde(default)]
    quotes: Vec<BalmySourceQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalmySourceQuote {
    buy_amount: BalmyAmount,
    min_buy_amount: Option<BalmyAmount>,
    source: BalmySource,
    tx: BalmyTx,
}

#[derive(Debug, Deserialize)]
struct BalmyAmount {
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalmySource {
    id: String,
    allowance_target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalmyTx {
    to: String,
    data: String,
    value: Option<String>,
}

fn source_quote(quote: BalmySourceQuote, native_in: bool) -> Result<VenueQuote, QuoteError> {
    let out = parse_u256(VENUE, "buyAmount", &quote.buy_amount.amount)?;
    let min_out = quote
        .min_buy_amount
        .map(|min| parse_u256(VENUE, "minBuyAmount", &min.amount))
        .transpose()?;
    let target = parse_address(VENUE, "tx.to", &quote.tx.to)?;
    let data = parse_bytes(VENUE, "tx.data", &quote.tx.data)?;
    let value = parse_value(VENUE, quote.tx.value.as_deref())?;
    let approval_target = match quote.source.allowance_target.as_deref() {
        Some(raw) => parse_address(VENUE, "allowanceTarget", raw)?,
        None => target,
    };

    Ok(VenueQuote {
        out,
        min_out,
        approval_target,
        calls: vec![Call::new(target, data).with_value(value)],
        wants_native_in: native_in,
        metadata: QuoteMetadata::Balmy {
            source_id: quote.source.id,
        },
    })
}

/// Highest-output quote; sources with unparseable quotes are skipped
fn best_quote(response: BalmyQuotesResponse, native_in: bool) -> Result<VenueQuote, QuoteError> {
    response
        .quotes
        .into_iter()
        .filter_map(|quote| {
            let source = quote.source.id.clone();
            source_quote(quote, native_in)
                .map_err(|e| warn!(venue = VENUE, source = %source, error = %e, "Skipping source"))
                .ok()
        })
        .max_by_key(|quote| quote.out)
        .ok_or(QuoteError::NoRoute { venue: VENUE })
}

#[async_trait]
impl Quoter for BalmyQuoter {
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

        let url = format!(
            "{}/v1/swap/networks/{}/quotes/all",
            self.base_url, self.chain_id
        );
        let response: BalmyQuotesResponse =
            post_json(&self.client, VENUE, &url, &self.body(request)).await?;
        let quote = best_quote(response, is_native_asset(&request.in_token))?;

        debug!(
            venue = VENUE,
            source = ?quote.metadata,
            amount_in = %request.amount_in,
            out = %quote.out,
            "Quoted"
        );
        Ok(quote.into())
    }
}
