//! ABI bindings for the leverage token contracts the planner reads and targets.

#![allow(clippy::too_many_arguments)]

use alloy_sol_types::sol;

sol! {
    /// Result of a manager or router deposit/redeem preview.
    struct ActionData {
        uint256 collateral;
        uint256 debt;
        uint256 shares;
        uint256 tokenFee;
        uint256 treasuryFee;
    }

    /// Call executed by the router's multicall executor.
    struct RouterCall {
        address target;
        uint256 value;
        bytes data;
    }

    interface ILeverageManager {
        function getLeverageTokenCollateralAsset(address token) external view returns (address);
        function getLeverageTokenDebtAsset(address token) external view returns (address);
        function previewDeposit(address token, uint256 collateral) external view returns (ActionData memory);
        function previewRedeem(address token, uint256 shares) external view returns (ActionData memory);
    }

    interface ILeverageRouter {
        function previewDeposit(address token, uint256 collateralFromSender) external view returns (ActionData memory);

        function deposit(
            address token,
            uint256 collateralFromSender,
            uint256 flashLoanAmount,
            uint256 minShares,
            address multicallExecutor,
            RouterCall[] calldata swapCalls
        ) external payable;

        function redeem(
            address token,
            uint256 shares,
            uint256 minCollateralForSender,
            address multicallExecutor,
            RouterCall[] calldata swapCalls
        ) external;
    }

    /// Router interface that takes an explicit excess-debt floor.
    interface ILeverageRouterV1 {
        function mint(
            address token,
            uint256 equityInCollateralAsset,
            uint256 flashLoanAmount,
            uint256 minShares,
            uint256 minExcessDebt,
            RouterCall[] calldata swapCalls
        ) external payable;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }

    interface IWETH9 {
        function withdraw(uint256 wad) external;
    }
}
