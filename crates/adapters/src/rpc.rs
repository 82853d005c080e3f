use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use leverage_planner_core::ContractReader;
use leverage_planner_types::ReadError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{trace, warn};

use crate::AdapterError;

/// `eth_call` over HTTP JSON-RPC against the latest block
pub struct JsonRpcReader {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcReader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::HttpClient(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallParams<'a>, &'static str),
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    to: &'a Address,
    data: &'a Bytes,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

fn decode_response(response: RpcResponse) -> Result<Bytes, ReadError> {
    if let Some(error) = response.error {
        return Err(ReadError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = response
        .result
        .ok_or_else(|| ReadError::Transport("response carries neither result nor error".into()))?;
    Bytes::from_str(&result).map_err(|e| ReadError::Transport(format!("invalid result hex: {e}")))
}

#[async_trait]
impl ContractReader for JsonRpcReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ReadError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "eth_call",
            params: (CallParams { to: &to, data: &data }, "latest"),
        };
        trace!(to = %to, id = request.id, "eth_call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReadError::Timeout
                } else {
                    ReadError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(url = %self.url, status = %status, "RPC endpoint error");
            return Err(ReadError::Transport(format!("HTTP {status}")));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ReadError::Transport(format!("failed to parse response: {e}")))?;
        decode_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let to = Address::repeat_byte(0x42);
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_call",
            params: (CallParams { to: &to, data: &data }, "latest"),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "eth_call");
        assert_eq!(json["params"][0]["data"], "0xdeadbeef");
        assert_eq!(json["params"][1], "latest");
    }

    #[test]
    fn test_decode_result() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x00ff"}"#).unwrap();
        assert_eq!(decode_response(response).unwrap(), Bytes::from(vec![0x00, 0xff]));
    }

    #[test]
    fn test_decode_revert() {
        let response: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted"}}"#,
        )
        .unwrap();
        assert!(matches!(
            decode_response(response),
            Err(ReadError::Rpc { code: 3, .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_public_rpc_call() {
        let reader = JsonRpcReader::new("https://eth.llamarpc.com", Duration::from_secs(10)).unwrap();
        // WETH9.decimals()
        let weth = Address::from_str("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap();
        let result = reader
            .call(weth, Bytes::from(vec![0x31, 0x3c, 0xe5, 0x67]))
            .await;
        match result {
            Ok(bytes) => assert_eq!(bytes.len(), 32),
            Err(e) => println!("RPC error (expected offline): {e}"),
        }
    }
}
