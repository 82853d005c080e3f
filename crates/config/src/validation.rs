//! Configuration validation

use crate::{AppConfig, ChainConfig, ConfigError, Result};
use leverage_planner_core::{MAX_EPSILON_BPS, MAX_MINT_SLIPPAGE_BPS};
use leverage_planner_types::SwapVenue;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let errors = collect_validation_errors(config);
    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Every validation problem in `config`
pub fn collect_validation_errors(config: &AppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    // Planner defaults
    let planner = &config.planner;
    if planner.default_slippage_bps.is_some() && planner.default_slippage_percent.is_some() {
        errors.push(ValidationError::new(
            "planner.default_slippage_percent",
            "set either default_slippage_bps or default_slippage_percent, not both",
        ));
    }
    match planner.slippage_bps() {
        Ok(bps) if bps > MAX_MINT_SLIPPAGE_BPS => errors.push(ValidationError::new(
            "planner.default_slippage_bps",
            format!("must be <= {MAX_MINT_SLIPPAGE_BPS}"),
        )),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(
            "planner.default_slippage_percent",
            e.to_string(),
        )),
    }
    if let Some(epsilon) = planner.epsilon_bps {
        if epsilon > MAX_EPSILON_BPS {
            errors.push(ValidationError::new(
                "planner.epsilon_bps",
                format!("must be <= {MAX_EPSILON_BPS}"),
            ));
        }
    }
    if planner.quote_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "planner.quote_timeout_ms",
            "must be greater than 0",
        ));
    }

    // Chains
    for (chain_name, chain_config) in &config.chains {
        if let Err(e) = validate_chain_config(chain_config) {
            errors.push(ValidationError::new(format!("chains.{chain_name}"), e));
        }
    }

    // Venues
    for (venue_name, venue) in &config.venues {
        if let Some(url) = venue_base_url(venue) {
            if let Err(e) = validate_url(url) {
                errors.push(ValidationError::new(
                    format!("venues.{venue_name}.base_url"),
                    e,
                ));
            }
        }
    }

    // Tokens and their references
    for (token_name, token) in &config.tokens {
        if token.address.is_zero() {
            errors.push(ValidationError::new(
                format!("tokens.{token_name}.address"),
                "token address is required",
            ));
        }

        if !config.chains.contains_key(&token.chain) {
            errors.push(ValidationError::new(
                format!("tokens.{token_name}.chain"),
                format!("chain '{}' not found in chains config", token.chain),
            ));
        }

        for (field, venue) in [
            ("mint_venue", &token.mint_venue),
            ("redeem_venue", &token.redeem_venue),
        ] {
            if !config.venues.contains_key(venue) {
                errors.push(ValidationError::new(
                    format!("tokens.{token_name}.{field}"),
                    format!("venue '{venue}' not found in venues config"),
                ));
            }
        }
    }

    errors
}

fn venue_base_url(venue: &SwapVenue) -> Option<&str> {
    match venue {
        SwapVenue::Lifi { base_url, .. }
        | SwapVenue::Balmy { base_url, .. }
        | SwapVenue::Velora { base_url, .. }
        | SwapVenue::Pendle { base_url, .. } => base_url.as_deref(),
        SwapVenue::UniswapV2 { .. } | SwapVenue::UniswapV3 { .. } | SwapVenue::Infinifi { .. } => {
            None
        }
    }
}

/// Validate a chain configuration
pub fn validate_chain_config(chain: &ChainConfig) -> std::result::Result<(), String> {
    if chain.chain_id == 0 {
        return Err("chain_id must be greater than 0".to_string());
    }

    validate_url(&chain.rpc_url)?;

    if chain.leverage_manager.is_zero() {
        return Err("leverage_manager address is required".to_string());
    }

    if chain.leverage_router.is_zero() {
        return Err("leverage_router address is required".to_string());
    }

    if chain.multicall_executor.is_zero() {
        return Err("multicall_executor address is required".to_string());
    }

    if chain.timeout_ms == 0 {
        return Err("timeout_ms must be greater than 0".to_string());
    }

    Ok(())
}

/// Validate a URL
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    Ok(())
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "logging.level",
            format!("invalid log level '{level}', must be one of: trace, debug, info, warn, error"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggingConfig, PlannerConfig, TokenConfig};
    use alloy_primitives::Address;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn chain() -> ChainConfig {
        ChainConfig {
            chain_id: 1,
            rpc_url: "https://eth.llamarpc.com".to_string(),
            wrapped_native: Some(Address::repeat_byte(0x42)),
            leverage_manager: Address::repeat_byte(0x01),
            leverage_router: Address::repeat_byte(0x02),
            multicall_executor: Address::repeat_byte(0x03),
            timeout_ms: 10_000,
        }
    }

    fn valid_config() -> AppConfig {
        let mut chains = HashMap::new();
        chains.insert("mainnet".to_string(), chain());

        let mut venues = HashMap::new();
        venues.insert(
            "lifi".to_string(),
            SwapVenue::Lifi {
                base_url: Some("https://li.quest".to_string()),
                integrator: None,
                api_key: None,
            },
        );

        let mut tokens = HashMap::new();
        tokens.insert(
            "wsteth-2x".to_string(),
            TokenConfig {
                address: Address::repeat_byte(0x10),
                chain: "mainnet".to_string(),
                mint_venue: "lifi".to_string(),
                redeem_venue: "lifi".to_string(),
                mint_strategy: None,
            },
        );

        AppConfig {
            logging: LoggingConfig::default(),
            planner: PlannerConfig::default(),
            chains,
            venues,
            tokens,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();

        let errors = collect_validation_errors(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "logging.level");
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.planner.default_slippage_bps = Some(6_000);
        config.planner.epsilon_bps = Some(500);
        config.planner.quote_timeout_ms = 0;

        let fields: Vec<_> = collect_validation_errors(&config)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert!(fields.contains(&"planner.default_slippage_bps".to_string()));
        assert!(fields.contains(&"planner.epsilon_bps".to_string()));
        assert!(fields.contains(&"planner.quote_timeout_ms".to_string()));

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("planner.epsilon_bps"));
    }

    #[test]
    fn test_slippage_bps_and_percent_conflict() {
        let mut config = valid_config();
        config.planner.default_slippage_bps = Some(50);
        config.planner.default_slippage_percent = Some(Decimal::ONE);

        let errors = collect_validation_errors(&config);
        assert_eq!(errors[0].field, "planner.default_slippage_percent");
    }

    #[test]
    fn test_dangling_token_references() {
        let mut config = valid_config();
        if let Some(token) = config.tokens.get_mut("wsteth-2x") {
            token.chain = "base".to_string();
            token.redeem_venue = "balmy".to_string();
        }

        let fields: Vec<_> = collect_validation_errors(&config)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert!(fields.contains(&"tokens.wsteth-2x.chain".to_string()));
        assert!(fields.contains(&"tokens.wsteth-2x.redeem_venue".to_string()));
        assert!(!fields.contains(&"tokens.wsteth-2x.mint_venue".to_string()));
    }

    #[test]
    fn test_validate_chain_config() {
        let mut bad = chain();
        bad.multicall_executor = Address::ZERO;
        assert!(validate_chain_config(&bad).is_err());

        let mut bad = chain();
        bad.rpc_url = "localhost:8545".to_string();
        assert!(validate_chain_config(&bad).is_err());
    }

    #[test]
    fn test_validate_venue_url() {
        let mut config = valid_config();
        config.venues.insert(
            "velora".to_string(),
            SwapVenue::Velora {
                base_url: Some("api.paraswap.io".to_string()),
                partner: None,
            },
        );

        let errors = collect_validation_errors(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "venues.velora.base_url");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8545").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("ws://localhost").is_err());
    }
}
