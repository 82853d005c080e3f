use alloy_primitives::Address;
use leverage_planner_core::ContractReader;
use std::sync::Arc;
use std::time::Duration;

use crate::AdapterError;

/// Default timeout for venue HTTP requests
pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Chain-level settings shared by every adapter built for one chain
#[derive(Clone)]
pub struct AdapterContext {
    pub chain_id: u64,
    /// Chain's wrapped native token (WETH on mainnet)
    pub wrapped_native: Option<Address>,
    /// Contract that executes the swap calls and receives their output
    pub executor: Address,
    pub reader: Option<Arc<dyn ContractReader>>,
    pub client: reqwest::Client,
    pub timeout: Duration,
}

impl AdapterContext {
    pub fn new(chain_id: u64, executor: Address) -> Self {
        Self {
            chain_id,
            wrapped_native: None,
            executor,
            reader: None,
            client: reqwest::Client::new(),
            timeout: DEFAULT_QUOTE_TIMEOUT,
        }
    }

    pub fn with_wrapped_native(mut self, wrapped_native: Address) -> Self {
        self.wrapped_native = Some(wrapped_native);
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn ContractReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Rebuild the HTTP client with a request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AdapterError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::HttpClient(e.to_string()))?;
        self.timeout = timeout;
        Ok(self)
    }

    pub(crate) fn require_reader(
        &self,
        venue: &'static str,
    ) -> Result<Arc<dyn ContractReader>, AdapterError> {
        self.reader
            .clone()
            .ok_or(AdapterError::MissingReader { venue })
    }

    pub(crate) fn require_wrapped_native(
        &self,
        venue: &'static str,
        venue_override: Option<Address>,
    ) -> Result<Address, AdapterError> {
        venue_override
            .or(self.wrapped_native)
            .filter(|addr| !addr.is_zero())
            .ok_or(AdapterError::MissingWrappedNative { venue })
    }
}
