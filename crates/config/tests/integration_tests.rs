//! Integration tests for the config crate

use leverage_planner_config::{validate_config, ConfigLoader, LogFormat};
use leverage_planner_types::{MintStrategy, SwapVenue};
use std::io::Write;
use std::path::{Path, PathBuf};

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
}

#[test]
fn test_load_base_config() {
    let config = ConfigLoader::from_file(&sample("base.toml")).expect("Failed to load base config");

    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.planner.slippage_bps().unwrap(), 50);
    assert_eq!(config.chains["base"].chain_id, 8453);
    assert_eq!(config.venues.len(), 4);

    let token = config.token("cbbtc-usdc-2x").unwrap();
    assert_eq!(config.mint_strategy_for(token), MintStrategy::V1);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_load_local_config() {
    let config = ConfigLoader::from_file(&sample("local.yaml")).expect("Failed to load local config");

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.planner.slippage_bps().unwrap(), 100);
    assert!(matches!(
        config.venue("univ2").unwrap(),
        SwapVenue::UniswapV2 { deadline_secs: None, .. }
    ));
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_env_overrides_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(b"[logging]\nlevel = \"info\"\n\n[planner]\nmint_strategy = \"v2\"\n")
        .unwrap();

    std::env::set_var("LP_ENV_TEST_PLANNER__MINT_STRATEGY", "v1");
    std::env::set_var("LP_ENV_TEST_PLANNER__EPSILON_BPS", "25");

    let config = ConfigLoader::from_file_with_env(file.path(), "LP_ENV_TEST").unwrap();

    std::env::remove_var("LP_ENV_TEST_PLANNER__MINT_STRATEGY");
    std::env::remove_var("LP_ENV_TEST_PLANNER__EPSILON_BPS");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.planner.mint_strategy, MintStrategy::V1);
    assert_eq!(config.planner.epsilon_bps, Some(25));
}

#[test]
fn test_invalid_file_is_rejected_by_validation() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(
        br#"{
            "logging": { "level": "loud" },
            "tokens": {
                "orphan": {
                    "address": "0x0000000000000000000000000000000000000001",
                    "chain": "nowhere",
                    "mint_venue": "none",
                    "redeem_venue": "none"
                }
            }
        }"#,
    )
    .unwrap();

    let config = ConfigLoader::from_file(file.path()).unwrap();
    let message = validate_config(&config).unwrap_err().to_string();

    assert!(message.contains("logging.level"));
    assert!(message.contains("tokens.orphan.chain"));
    assert!(message.contains("tokens.orphan.mint_venue"));
}
