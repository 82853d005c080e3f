//! Shared request plumbing for aggregator venues.

use alloy_primitives::{Address, Bytes, U256};
use leverage_planner_types::{is_native_asset, QuoteError};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::AdapterError;

/// How an API spells the native currency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NativeSpelling {
    /// `0x0000000000000000000000000000000000000000`
    Zero,
    /// `0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE`
    Sentinel,
}

pub(crate) fn api_token(token: Address, spelling: NativeSpelling) -> Address {
    if !is_native_asset(&token) {
        return token;
    }
    match spelling {
        NativeSpelling::Zero => Address::ZERO,
        NativeSpelling::Sentinel => leverage_planner_types::NATIVE_ASSET,
    }
}

/// Basis points as a fraction (`50` -> `0.005`)
pub(crate) fn bps_to_fraction(bps: u32) -> Decimal {
    Decimal::new(i64::from(bps), 4).normalize()
}

/// Basis points as a percentage (`50` -> `0.5`)
pub(crate) fn bps_to_percent(bps: u32) -> Decimal {
    Decimal::new(i64::from(bps), 2).normalize()
}

pub(crate) fn parse_u256(venue: &'static str, field: &str, raw: &str) -> Result<U256, QuoteError> {
    U256::from_str(raw.trim()).map_err(|e| QuoteError::InvalidResponse {
        venue,
        reason: format!("{field} {raw:?}: {e}"),
    })
}

pub(crate) fn parse_address(
    venue: &'static str,
    field: &str,
    raw: &str,
) -> Result<Address, QuoteError> {
    Address::from_str(raw.trim()).map_err(|e| QuoteError::InvalidResponse {
        venue,
        reason: format!("{field} {raw:?}: {e}"),
    })
}

pub(crate) fn parse_bytes(venue: &'static str, field: &str, raw: &str) -> Result<Bytes, QuoteError> {
    Bytes::from_str(raw.trim()).map_err(|e| QuoteError::InvalidResponse {
        venue,
        reason: format!("{field}: {e}"),
    })
}

/// Optional value field; absent or empty means zero
pub(crate) fn parse_value(venue: &'static str, raw: Option<&str>) -> Result<U256, QuoteError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(U256::ZERO),
        Some(raw) => parse_u256(venue, "value", raw),
    }
}

pub(crate) fn validate_base_url(venue: &'static str, url: &str) -> Result<String, AdapterError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| AdapterError::InvalidBaseUrl {
        venue,
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AdapterError::InvalidBaseUrl {
            venue,
            url: url.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}

async fn read_json<T: DeserializeOwned>(
    venue: &'static str,
    response: reqwest::Response,
) -> Result<T, QuoteError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(venue, status = %status, body = %body, "Venue API error");
        return Err(QuoteError::Http {
            venue,
            reason: format!("HTTP {status}: {body}"),
        });
    }

    response
        .json()
        .await
        .map_err(|e| QuoteError::InvalidResponse {
            venue,
            reason: format!("failed to parse response: {e}"),
        })
}

fn transport_error(venue: &'static str, e: reqwest::Error) -> QuoteError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    QuoteError::Http { venue, reason }
}

pub(crate) async fn get_json<T: DeserializeOwned, Q: Serialize + ?Sized>(
    client: &reqwest::Client,
    venue: &'static str,
    url: &str,
    query: &Q,
    headers: &[(&'static str, String)],
) -> Result<T, QuoteError> {
    debug!(venue, url, "GET");
    let mut request = client.get(url).query(query);
    for (name, value) in headers {
        request = request.header(*name, value);
    }
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(venue, e))?;
    read_json(venue, response).await
}

pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
    client: &reqwest::Client,
    venue: &'static str,
    url: &str,
    body: &B,
) -> Result<T, QuoteError> {
    debug!(venue, url, "POST");
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(venue, e))?;
    read_json(venue, response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_conversions() {
        assert_eq!(bps_to_fraction(50).to_string(), "0.005");
        assert_eq!(bps_to_fraction(100).to_string(), "0.01");
        assert_eq!(bps_to_percent(50).to_string(), "0.5");
        assert_eq!(bps_to_percent(300).to_string(), "3");
    }

    #[test]
    fn test_native_spelling() {
        let native = leverage_planner_types::NATIVE_ASSET;
        assert_eq!(api_token(native, NativeSpelling::Zero), Address::ZERO);
        assert_eq!(api_token(Address::ZERO, NativeSpelling::Sentinel), native);
        let token = Address::repeat_byte(0x11);
        assert_eq!(api_token(token, NativeSpelling::Zero), token);
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(parse_u256("t", "amount", "1000").unwrap(), U256::from(1_000u64));
        assert_eq!(parse_u256("t", "amount", "0x3e8").unwrap(), U256::from(1_000u64));
        assert!(parse_u256("t", "amount", "ten").is_err());
        assert_eq!(parse_value("t", None).unwrap(), U256::ZERO);
        assert_eq!(parse_value("t", Some("0x0")).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("t", "https://li.quest/").unwrap(),
            "https://li.quest"
        );
        assert!(validate_base_url("t", "li.quest").is_err());
        assert!(validate_base_url("t", "ftp://li.quest").is_err());
    }
}
