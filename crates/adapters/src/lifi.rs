use alloy_primitives::Address;
use async_trait::async_trait;
use leverage_planner_core::Quoter;
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{
    api_token, bps_to_fraction, get_json, parse_address, parse_bytes, parse_u256, parse_value,
    NativeSpelling,
};

const VENUE: &str = "lifi";

pub const LIFI_DEFAULT_BASE_URL: &str = "https://li.quest";

/// LI.FI aggregator client
pub struct LifiQuoter {
    base_url: String,
    client: reqwest::Client,
    chain_id: u64,
    executor: Address,
    integrator: Option<String>,
    api_key: Option<String>,
}

impl LifiQuoter {
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
            integrator: None,
            api_key: None,
        }
    }

    pub fn with_integrator(mut self, integrator: Option<String>) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn query(&self, request: &QuoteRequest) -> LifiQuoteQuery {
        LifiQuoteQuery {
            from_chain: self.chain_id,
            to_chain: self.chain_id,
            from_token: api_token(request.in_token, NativeSpelling::Zero),
            to_token: api_token(request.out_token, NativeSpelling::Zero),
            from_amount: request.amount_in.to_string(),
            from_address: self.executor,
            to_address: self.executor,
            slippage: bps_to_fraction(request.slippage_bps).to_string(),
            integrator: self.integrator.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LifiQuoteQuery {
    from_chain: u64,
    to_chain: u64,
    from_token: Address,
    to_token: Address,
    from_amount: String,
    from_address: Address,
    to_address: Address,
    slippage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    integrator: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiQuoteResponse {
    tool: Option<String>,
    estimate: LifiEstimate,
    transaction_request: LifiTransaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiEstimate {
    to_amount: String,
    to_amount_min: Option<String>,
    approval_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LifiTransaction {
    to: String,
    data: String,
    value: Option<String>,
}

fn into_venue_quote(response: LifiQuoteResponse, native_in: bool) -> Result<VenueQuote, QuoteError> {
    let out = parse_u256(VENUE, "toAmount", &response.estimate.to_amount)?;
    let min_out = response
        .estimate
        .to_amount_min
        .as_deref()
        .map(|raw| parse_u256(VENUE, "toAmountMin", raw))
        .transpose()?;

    let tx = &response.transaction_request;
    let target = parse_address(VENUE, "transactionRequest.to", &tx.to)?;
    let data = parse_bytes(VENUE, "transactionRequest.data", &tx.data)?;
    let value = parse_value(VENUE, tx.value.as_deref())?;

    let approval_target = match response.estimate.approval_address.as_deref() {
        Some(raw) => parse_address(VENUE, "approvalAddress", raw)?,
        None => target,
    };

    Ok(VenueQuote {
        out,
        min_out,
        approval_target,
        calls: vec![Call::new(target, data).with_value(value)],
        wants_native_in: native_in,
        metadata: QuoteMetadata::Lifi {
            tool: response.tool,
        },
    })
}

#[async_trait]
impl Quoter for LifiQuoter {
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

        let url = format!("{}/v1/quote", self.base_url);
        let headers: Vec<(&'static str, String)> = self
            .api_key
            .iter()
            .map(|key| ("x-lifi-api-key", key.clone()))
            .collect();

        let response: LifiQuoteResponse =
            get_json(&self.client, VENUE, &url, &self.query(request), &headers).await?;
        let quote = into_venue_quote(response, is_native_asset(&request.in_token))?;

        debug!(
            venue = VENUE,
            amount_in = %request.amount_in,
            out = %quote.out,
            min_out = ?quote.min_out,
            "Quoted"
        );
        Ok(quote.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use leverage_planner_types::NATIVE_ASSET;

    const FIXTURE: &str = r#"{
        "id": "0x1",
        "type": "lifi",
        "tool": "1inch",
        "estimate": {
            "fromAmount": "1000000",
            "toAmount": "410000000000000",
            "toAmountMin": "407950000000000",
            "approvalAddress": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE"
        },
        "transactionRequest": {
            "to": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
            "data": "0x4630a0d8",
            "value": "0x0",
            "gasLimit": "0x5b8d8"
        }
    }"#;

    #[test]
    fn test_parse_quote() {
        let response: LifiQuoteResponse = serde_json::from_str(FIXTURE).unwrap();
        let quote = into_venue_quote(response, false).unwrap();

        assert_eq!(quote.out, U256::from(410_000_000_000_000u64));
        assert_eq!(quote.min_out, Some(U256::from(407_950_000_000_000u64)));
        assert_eq!(quote.calls.len(), 1);
        assert_eq!(quote.calls[0].value, U256::ZERO);
        assert_eq!(quote.metadata, QuoteMetadata::Lifi { tool: Some("1inch".into()) });
    }

    #[test]
    fn test_query_spells_native_as_zero() {
        let quoter = LifiQuoter::new(
            LIFI_DEFAULT_BASE_URL,
            reqwest::Client::new(),
            1,
            Address::repeat_byte(0xe0),
        );
        let request = QuoteRequest::exact_in(
            NATIVE_ASSET,
            Address::repeat_byte(0x0c),
            U256::from(5u64),
            50,
        );

        let query = serde_json::to_value(quoter.query(&request)).unwrap();
        assert_eq!(query["fromToken"], "0x0000000000000000000000000000000000000000");
        assert_eq!(query["slippage"], "0.005");
        assert_eq!(query["fromAmount"], "5");
        assert!(query.get("integrator").is_none());
    }

    #[test]
    fn test_rejects_malformed_amount() {
        let fixture = FIXTURE.replace("410000000000000", "lots");
        let response: LifiQuoteResponse = serde_json::from_str(&fixture).unwrap();
        assert!(matches!(
            into_venue_quote(response, false),
            Err(QuoteError::InvalidResponse { .. })
        ));
    }
}
