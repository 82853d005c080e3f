//! End-to-end planning through the service with an in-memory contract reader

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use leverage_planner::config::ConfigError;
use leverage_planner::planner::bindings::{ActionData, ILeverageManager, ILeverageRouter};
use leverage_planner::planner::mock::MockReader;
use leverage_planner::planner::ContractReader;
use leverage_planner::{
    cancel_pair, ConfigLoader, MintStrategy, PlanError, PlannerService, ServiceError,
};
use std::sync::Arc;

sol! {
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);
    }
}

const MANAGER: Address = Address::new([0x11; 20]);
const ROUTER: Address = Address::new([0x22; 20]);
const EXECUTOR: Address = Address::new([0x33; 20]);
const UNIV2: Address = Address::new([0x44; 20]);
const TOKEN: Address = Address::new([0x01; 20]);
const COLLATERAL: Address = Address::new([0xc0; 20]);
const DEBT: Address = Address::new([0xd0; 20]);

const CONFIG: &str = r#"
[planner]
default_slippage_bps = 50

[chains.test]
chain_id = 1
rpc_url = "http://127.0.0.1:8545"
wrapped_native = "0x4242424242424242424242424242424242424242"
leverage_manager = "0x1111111111111111111111111111111111111111"
leverage_router = "0x2222222222222222222222222222222222222222"
multicall_executor = "0x3333333333333333333333333333333333333333"

[venues.univ2]
type = "uniswapV2"
router = "0x4444444444444444444444444444444444444444"

[tokens.lt]
address = "0x0101010101010101010101010101010101010101"
chain = "test"
mint_venue = "univ2"
redeem_venue = "univ2"

[tokens.lt-v1]
address = "0x0101010101010101010101010101010101010101"
chain = "test"
mint_venue = "univ2"
redeem_venue = "univ2"
mint_strategy = "v1"
"#;

fn u(v: u64) -> U256 {
    U256::from(v)
}

fn action(collateral: u64, debt: u64, shares: u64) -> ActionData {
    ActionData {
        collateral: u(collateral),
        debt: u(debt),
        shares: u(shares),
        tokenFee: U256::ZERO,
        treasuryFee: U256::ZERO,
    }
}

fn base_reader(swap_out: u64) -> MockReader {
    MockReader::new()
        .with_response(
            MANAGER,
            ILeverageManager::getLeverageTokenCollateralAssetCall::SELECTOR,
            ILeverageManager::getLeverageTokenCollateralAssetCall::abi_encode_returns(&(
                COLLATERAL,
            )),
        )
        .with_response(
            MANAGER,
            ILeverageManager::getLeverageTokenDebtAssetCall::SELECTOR,
            ILeverageManager::getLeverageTokenDebtAssetCall::abi_encode_returns(&(DEBT,)),
        )
        .with_response(
            UNIV2,
            IUniswapV2Router02::getAmountsOutCall::SELECTOR,
            IUniswapV2Router02::getAmountsOutCall::abi_encode_returns(&(vec![
                u(1),
                u(swap_out),
            ],)),
        )
}

fn service(reader: MockReader) -> PlannerService {
    let config = ConfigLoader::from_toml(CONFIG).unwrap();
    let reader: Arc<dyn ContractReader> = Arc::new(reader);
    PlannerService::with_readers(config, |_, _| Ok(reader.clone())).unwrap()
}

#[tokio::test]
async fn test_plan_mint_end_to_end() {
    let reader = base_reader(210_000)
        .with_response(
            ROUTER,
            ILeverageRouter::previewDepositCall::SELECTOR,
            ILeverageRouter::previewDepositCall::abi_encode_returns(&(action(
                300_000, 200_000, 1_000,
            ),)),
        )
        .with_response(
            MANAGER,
            ILeverageManager::previewDepositCall::SELECTOR,
            ILeverageManager::previewDepositCall::abi_encode_returns(&(action(
                310_000, 205_000, 1_000,
            ),)),
        );
    let service = service(reader);

    let planned = service
        .plan_mint("lt", u(100_000), None, None)
        .await
        .unwrap();

    let plan = &planned.plan;
    assert_eq!(plan.strategy, MintStrategy::V2);
    assert_eq!(plan.token, TOKEN);
    assert_eq!(plan.input_asset, COLLATERAL);
    assert_eq!(plan.flash_loan_amount, u(200_000));
    assert_eq!(plan.min_shares, u(995));
    assert_eq!(plan.expected_total_collateral, u(310_000));

    assert_eq!(planned.transaction.to, ROUTER);
    let deposit = ILeverageRouter::depositCall::abi_decode(&planned.transaction.data, true).unwrap();
    assert_eq!(deposit.token, TOKEN);
    assert_eq!(deposit.collateralFromSender, u(100_000));
    assert_eq!(deposit.flashLoanAmount, u(200_000));
    assert_eq!(deposit.minShares, u(995));
    assert_eq!(deposit.multicallExecutor, EXECUTOR);
    assert_eq!(deposit.swapCalls.len(), plan.calls.len());
    assert_eq!(deposit.swapCalls.last().unwrap().target, UNIV2);
}

#[tokio::test]
async fn test_plan_redeem_end_to_end() {
    let reader = base_reader(4_000).with_response(
        MANAGER,
        ILeverageManager::previewRedeemCall::SELECTOR,
        ILeverageManager::previewRedeemCall::abi_encode_returns(&(action(10_000, 4_000, 500),)),
    );
    let service = service(reader);

    let planned = service
        .plan_redeem("lt", u(500), None, None)
        .await
        .unwrap();

    let plan = &planned.plan;
    assert_eq!(plan.collateral_for_swap, u(4_000));
    assert_eq!(plan.expected_collateral, u(6_000));
    assert_eq!(plan.min_collateral_for_sender, u(5_970));
    assert_eq!(plan.calls.len(), 1);
    assert_eq!(plan.calls[0].target, UNIV2);

    let redeem = ILeverageRouter::redeemCall::abi_decode(&planned.transaction.data, true).unwrap();
    assert_eq!(redeem.shares, u(500));
    assert_eq!(redeem.minCollateralForSender, u(5_970));
    assert_eq!(redeem.multicallExecutor, EXECUTOR);
}

#[tokio::test]
async fn test_explicit_slippage_overrides_config() {
    let reader = base_reader(4_000).with_response(
        MANAGER,
        ILeverageManager::previewRedeemCall::SELECTOR,
        ILeverageManager::previewRedeemCall::abi_encode_returns(&(action(10_000, 4_000, 500),)),
    );
    let service = service(reader);

    let planned = service
        .plan_redeem("lt", u(500), Some(100), None)
        .await
        .unwrap();

    assert_eq!(planned.plan.slippage_bps, 100);
    assert_eq!(planned.plan.min_collateral_for_sender, u(5_940));
}

#[tokio::test]
async fn test_token_strategy_override() {
    let service = service(MockReader::new());

    assert_eq!(service.mint_strategy("lt").unwrap(), MintStrategy::V2);
    assert_eq!(service.mint_strategy("lt-v1").unwrap(), MintStrategy::V1);
    assert_eq!(service.tokens().count(), 2);
}

#[tokio::test]
async fn test_unknown_token() {
    let service = service(MockReader::new());

    let err = service
        .plan_redeem("missing", u(1), None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Config(ConfigError::NotFound { kind: "token", .. })
    ));
}

#[tokio::test]
async fn test_cancelled_before_quoting() {
    let service = service(base_reader(4_000));
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let err = service
        .plan_redeem("lt", u(500), None, Some(&signal))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Plan(PlanError::Cancelled)));
}

#[tokio::test]
async fn test_missing_reader_response_surfaces_read_error() {
    let service = service(base_reader(4_000));

    let err = service
        .plan_mint("lt", u(100_000), None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Plan(PlanError::Read(_))));
}

#[test]
fn test_invalid_config_rejected_at_build() {
    let config = ConfigLoader::from_toml(&CONFIG.replace(
        "redeem_venue = \"univ2\"\nmint_strategy",
        "redeem_venue = \"nowhere\"\nmint_strategy",
    ))
    .unwrap();
    let reader: Arc<dyn ContractReader> = Arc::new(MockReader::new());

    let result = PlannerService::with_readers(config, |_, _| Ok(reader.clone()));

    assert!(matches!(
        result,
        Err(ServiceError::Config(ConfigError::ValidationError(_)))
    ));
}
