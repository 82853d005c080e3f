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

const VENUE: &str = "pendle";

pub const PENDLE_DEFAULT_BASE_URL: &str = "https://api-v2.pendle.finance";

/// Pendle hosted SDK `convert` endpoint (PT/YT/SY/LP and plain tokens)
pub struct PendleQuoter {
    base_url: String,
    client: reqwest::Client,
    chain_id: u64,
    executor: Address,
    enable_aggregator: bool,
}

impl PendleQuoter {
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
            enable_aggregator: true,
        }
    }

    pub fn with_aggregator(mut self, enable_aggregator: bool) -> Self {
        self.enable_aggregator = enable_aggregator;
        self
    }

    fn query(&self, request: &QuoteRequest) -> ConvertQuery {
        ConvertQuery {
            receiver: self.executor,
            slippage: bps_to_fraction(request.slippage_bps).to_string(),
            enable_aggregator: self.enable_aggregator,
            tokens_in: api_token(request.in_token, NativeSpelling::Zero),
            amounts_in: request.amount_in.to_string(),
            tokens_out: api_token(request.out_token, NativeSpelling::Zero),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertQuery {
    receiver: Address,
    slippage: String,
    enable_aggregator: bool,
    tokens_in: Address,
    amounts_in: String,
    tokens_out: Address,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    action: Option<String>,
    #[serde(default)]
    routes: Vec<ConvertRoute>,
}

#[derive(Debug, Deserialize)]
struct ConvertRoute {
    tx: ConvertTx,
    #[serde(default)]
    outputs: Vec<ConvertOutput>,
}

#[derive(Debug, Deserialize)]
struct ConvertTx {
    to: String,
    data: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConvertOutput {
    token: String,
    amount: String,
}

fn into_venue_quote(
    response: ConvertResponse,
    out_token: Address,
    native_in: bool,
) -> Result<VenueQuote, QuoteError> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(QuoteError::NoRoute { venue: VENUE })?;

    let mut out = None;
    for output in &route.outputs {
        if parse_address(VENUE, "outputs.token", &output.token)? == out_token {
            out = Some(parse_u256(VENUE, "outputs.amount", &output.amount)?);
        }
    }
    let out = out.ok_or_else(|| QuoteError::InvalidResponse {
        venue: VENUE,
        reason: format!("route has no output for {out_token}"),
    })?;

    let target = parse_address(VENUE, "tx.to", &route.tx.to)?;
    let data = parse_bytes(VENUE, "tx.data", &route.tx.data)?;
    let value = parse_value(VENUE, route.tx.value.as_deref())?;

    Ok(VenueQuote {
        out,
        min_out: None,
        approval_target: target,
        calls: vec![Call::new(target, data).with_value(value)],
        wants_native_in: native_in,
        metadata: QuoteMetadata::Pendle {
            action: response.action,
        },
    })
}

#[async_trait]
impl Quoter for PendleQuoter {
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

        let url = format!("{}/core/v1/sdk/{}/convert", self.base_url, self.chain_id);
        let query = self.query(request);
        let response: ConvertResponse = get_json(&self.client, VENUE, &url, &query, &[]).await?;
        let quote = into_venue_quote(
            response,
            query.tokens_out,
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

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use leverage_planner_types::ensure_min_out;

    const PT: &str = "0x6d98a2b6cdbf44939362a3e99793339ba2016af4";

    fn fixture() -> String {
        format!(
            r#"{{
                "action": "swap",
                "routes": [
                    {{
                        "tx": {{
                            "to": "0x888888888889758F76e7103c6CbF23ABbF58F946",
                            "data": "0xc81f847a",
                            "value": "0",
                            "from": "0xe0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0"
                        }},
                        "outputs": [{{ "token": "{PT}", "amount": "1012345" }}],
                        "data": {{ "priceImpact": -0.0001 }}
                    }}
                ]
            }}"#
        )
    }

    #[test]
    fn test_min_out_is_materialized_from_out() {
        let response: ConvertResponse = serde_json::from_str(&fixture()).unwrap();
        let pt: Address = PT.parse().unwrap();

        let venue_quote = into_venue_quote(response, pt, false).unwrap();
        assert_eq!(venue_quote.min_out, None);

        let quote = ensure_min_out(venue_quote);
        assert_eq!(quote.out, U256::from(1_012_345u64));
        assert_eq!(quote.min_out, quote.out);
        assert_eq!(quote.approval_target, quote.calls[0].target);
        assert_eq!(
            quote.metadata,
            QuoteMetadata::Pendle {
                action: Some("swap".into())
            }
        );
    }

    #[test]
    fn test_missing_output_token_is_invalid() {
        let response: ConvertResponse = serde_json::from_str(&fixture()).unwrap();
        assert!(matches!(
            into_venue_quote(response, Address::repeat_byte(0x01), false),
            Err(QuoteError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_no_routes() {
        let response: ConvertResponse =
            serde_json::from_str(r#"{"action":"swap","routes":[]}"#).unwrap();
        assert!(matches!(
            into_venue_quote(response, Address::repeat_byte(0x01), false),
            Err(QuoteError::NoRoute { .. })
        ));
    }
}
