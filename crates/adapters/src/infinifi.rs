use alloy_primitives::Address;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use leverage_planner_core::{read_contract, ContractReader, Quoter};
use leverage_planner_types::{
    is_native_asset, Call, Quote, QuoteError, QuoteIntent, QuoteMetadata, QuoteRequest, VenueQuote,
};
use std::sync::Arc;
use tracing::debug;

sol! {
    interface IERC4626 {
        function previewDeposit(uint256 assets) external view returns (uint256 shares);
        function previewRedeem(uint256 shares) external view returns (uint256 assets);
        function deposit(uint256 assets, address receiver) external returns (uint256 shares);
        function redeem(uint256 shares, address receiver, address owner)
            external returns (uint256 assets);
    }
}

const VENUE: &str = "infinifi";

/// Conversion direction through the vault
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Deposit,
    Redeem,
}

/// Asset <-> share conversion through an Infinifi ERC-4626 vault.
///
/// Vault previews are exact, so `min_out` equals `out`.
pub struct InfinifiQuoter {
    reader: Arc<dyn ContractReader>,
    vault: Address,
    asset: Address,
    executor: Address,
}

impl InfinifiQuoter {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        vault: Address,
        asset: Address,
        executor: Address,
    ) -> Self {
        Self {
            reader,
            vault,
            asset,
            executor,
        }
    }

    fn direction(&self, request: &QuoteRequest) -> Result<Direction, QuoteError> {
        if is_native_asset(&request.in_token) {
            return Err(QuoteError::Unsupported {
                venue: VENUE,
                reason: "native input".to_string(),
            });
        }
        if request.in_token == self.asset && request.out_token == self.vault {
            Ok(Direction::Deposit)
        } else if request.in_token == self.vault && request.out_token == self.asset {
            Ok(Direction::Redeem)
        } else {
            Err(QuoteError::Unsupported {
                venue: VENUE,
                reason: format!("pair {} -> {}", request.in_token, request.out_token),
            })
        }
    }
}

#[async_trait]
impl Quoter for InfinifiQuoter {
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

        let direction = self.direction(request)?;
        let (out, data, approval_target) = match direction {
            Direction::Deposit => {
                let out = read_contract(
                    self.reader.as_ref(),
                    self.vault,
                    IERC4626::previewDepositCall {
                        assets: request.amount_in,
                    },
                    "previewDeposit",
                )
                .await?
                .shares;
                let data = IERC4626::depositCall {
                    assets: request.amount_in,
                    receiver: self.executor,
                }
                .abi_encode();
                (out, data, self.vault)
            }
            Direction::Redeem => {
                let out = read_contract(
                    self.reader.as_ref(),
                    self.vault,
                    IERC4626::previewRedeemCall {
                        shares: request.amount_in,
                    },
                    "previewRedeem",
                )
                .await?
                .assets;
                let data = IERC4626::redeemCall {
                    shares: request.amount_in,
                    receiver: self.executor,
                    owner: self.executor,
                }
                .abi_encode();
                // The owner redeems its own shares; no allowance is consumed.
                (out, data, self.executor)
            }
        };

        debug!(
            venue = VENUE,
            direction = ?direction,
            amount_in = %request.amount_in,
            out = %out,
            "Quoted"
        );

        Ok(VenueQuote {
            out,
            min_out: Some(out),
            approval_target,
            calls: vec![Call::new(self.vault, data)],
            wants_native_in: false,
            metadata: QuoteMetadata::Infinifi { vault: self.vault },
        }
        .into())
    }
}
