use alloy_primitives::Address;
use leverage_planner_core::Quoter;
use leverage_planner_types::SwapVenue;
use std::sync::Arc;
use tracing::info;

use crate::http::validate_base_url;
use crate::{
    AdapterContext, AdapterError, BalmyQuoter, InfinifiQuoter, LifiQuoter, PendleQuoter,
    UniswapV2Quoter, UniswapV3Quoter, VeloraQuoter, BALMY_DEFAULT_BASE_URL,
    LIFI_DEFAULT_BASE_URL, PENDLE_DEFAULT_BASE_URL, UNISWAP_V3_FEE_TIERS,
    VELORA_DEFAULT_BASE_URL,
};

fn non_zero(venue: &'static str, field: &'static str, addr: Address) -> Result<Address, AdapterError> {
    if addr.is_zero() {
        return Err(AdapterError::ZeroAddress { venue, field });
    }
    Ok(addr)
}

fn base_url(
    venue: &'static str,
    configured: Option<&str>,
    default: &str,
) -> Result<String, AdapterError> {
    validate_base_url(venue, configured.unwrap_or(default))
}

/// Build the quoter for a configured venue.
///
/// Fails before any network access when the venue lacks what it needs: an
/// executor, a contract reader for on-chain venues, a wrapped native token for
/// Uniswap, a deployed fee tier for Uniswap V3, or a well-formed API base URL.
pub fn build_quoter(
    venue: &SwapVenue,
    ctx: &AdapterContext,
) -> Result<Arc<dyn Quoter>, AdapterError> {
    let kind = venue.kind();
    if ctx.executor.is_zero() {
        return Err(AdapterError::MissingExecutor);
    }

    let quoter: Arc<dyn Quoter> = match venue {
        SwapVenue::UniswapV2 {
            router,
            wrapped_native,
            deadline_secs,
        } => {
            let router = non_zero("uniswapV2", "router", *router)?;
            let wrapped_native = ctx.require_wrapped_native("uniswapV2", *wrapped_native)?;
            let reader = ctx.require_reader("uniswapV2")?;
            let mut quoter = UniswapV2Quoter::new(reader, router, wrapped_native, ctx.executor);
            if let Some(secs) = deadline_secs {
                quoter = quoter.with_deadline_secs(*secs);
            }
            Arc::new(quoter)
        }

        SwapVenue::UniswapV3 {
            quoter,
            router,
            fee,
            wrapped_native,
        } => {
            if !UNISWAP_V3_FEE_TIERS.contains(fee) {
                return Err(AdapterError::InvalidFeeTier { fee: *fee });
            }
            let quoter = non_zero("uniswapV3", "quoter", *quoter)?;
            let router = non_zero("uniswapV3", "router", *router)?;
            let wrapped_native = ctx.require_wrapped_native("uniswapV3", *wrapped_native)?;
            let reader = ctx.require_reader("uniswapV3")?;
            Arc::new(UniswapV3Quoter::new(
                reader,
                quoter,
                router,
                *fee,
                wrapped_native,
                ctx.executor,
            ))
        }

        SwapVenue::Lifi {
            base_url: url,
            integrator,
            api_key,
        } => {
            let url = base_url("lifi", url.as_deref(), LIFI_DEFAULT_BASE_URL)?;
            Arc::new(
                LifiQuoter::new(url, ctx.client.clone(), ctx.chain_id, ctx.executor)
                    .with_integrator(integrator.clone())
                    .with_api_key(api_key.clone()),
            )
        }

        SwapVenue::Balmy {
            base_url: url,
            sources,
        } => {
            let url = base_url("balmy", url.as_deref(), BALMY_DEFAULT_BASE_URL)?;
            Arc::new(
                BalmyQuoter::new(url, ctx.client.clone(), ctx.chain_id, ctx.executor)
                    .with_sources(sources.clone()),
            )
        }

        SwapVenue::Velora {
            base_url: url,
            partner,
        } => {
            let url = base_url("velora", url.as_deref(), VELORA_DEFAULT_BASE_URL)?;
            Arc::new(
                VeloraQuoter::new(url, ctx.client.clone(), ctx.chain_id, ctx.executor)
                    .with_partner(partner.clone())
                    .with_reader(ctx.reader.clone()),
            )
        }

        SwapVenue::Pendle {
            base_url: url,
            enable_aggregator,
        } => {
            let url = base_url("pendle", url.as_deref(), PENDLE_DEFAULT_BASE_URL)?;
            Arc::new(
                PendleQuoter::new(url, ctx.client.clone(), ctx.chain_id, ctx.executor)
                    .with_aggregator(*enable_aggregator),
            )
        }

        SwapVenue::Infinifi { vault, asset } => {
            let vault = non_zero("infinifi", "vault", *vault)?;
            let asset = non_zero("infinifi", "asset", *asset)?;
            let reader = ctx.require_reader("infinifi")?;
            Arc::new(InfinifiQuoter::new(reader, vault, asset, ctx.executor))
        }
    };

    info!(venue = kind, chain_id = ctx.chain_id, "Quoter built");
    Ok(quoter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leverage_planner_core::mock::MockReader;

    const EXECUTOR: Address = Address::new([0xe0; 20]);
    const WETH: Address = Address::new([0x42; 20]);

    fn ctx() -> AdapterContext {
        AdapterContext::new(1, EXECUTOR)
            .with_wrapped_native(WETH)
            .with_reader(Arc::new(MockReader::new()))
    }

    fn v3(fee: u32) -> SwapVenue {
        SwapVenue::UniswapV3 {
            quoter: Address::repeat_byte(0x0b),
            router: Address::repeat_byte(0x0a),
            fee,
            wrapped_native: None,
        }
    }

    #[test]
    fn test_builds_every_venue() {
        let venues = vec![
            SwapVenue::UniswapV2 {
                router: Address::repeat_byte(0x0a),
                wrapped_native: None,
                deadline_secs: Some(60),
            },
            v3(3_000),
            SwapVenue::Lifi {
                base_url: None,
                integrator: Some("planner".into()),
                api_key: None,
            },
            SwapVenue::Balmy {
                base_url: None,
                sources: vec![],
            },
            SwapVenue::Velora {
                base_url: Some("https://api.paraswap.io/".into()),
                partner: None,
            },
            SwapVenue::Pendle {
                base_url: None,
                enable_aggregator: false,
            },
            SwapVenue::Infinifi {
                vault: Address::repeat_byte(0x5f),
                asset: Address::repeat_byte(0x0c),
            },
        ];

        for venue in venues {
            let quoter = build_quoter(&venue, &ctx()).unwrap();
            assert_eq!(quoter.venue(), venue.kind());
        }
    }

    #[test]
    fn test_rejects_unknown_fee_tier() {
        assert!(matches!(
            build_quoter(&v3(2_500), &ctx()),
            Err(AdapterError::InvalidFeeTier { fee: 2_500 })
        ));
    }

    #[test]
    fn test_onchain_venue_requires_reader() {
        let ctx = AdapterContext::new(1, EXECUTOR).with_wrapped_native(WETH);
        assert!(matches!(
            build_quoter(&v3(500), &ctx),
            Err(AdapterError::MissingReader { venue: "uniswapV3" })
        ));

        // aggregators do not
        let lifi = SwapVenue::Lifi {
            base_url: None,
            integrator: None,
            api_key: None,
        };
        assert!(build_quoter(&lifi, &ctx).is_ok());
    }

    #[test]
    fn test_uniswap_requires_wrapped_native() {
        let ctx = AdapterContext::new(1, EXECUTOR).with_reader(Arc::new(MockReader::new()));
        assert!(matches!(
            build_quoter(&v3(500), &ctx),
            Err(AdapterError::MissingWrappedNative { .. })
        ));

        let with_override = SwapVenue::UniswapV2 {
            router: Address::repeat_byte(0x0a),
            wrapped_native: Some(WETH),
            deadline_secs: None,
        };
        assert!(build_quoter(&with_override, &ctx).is_ok());
    }

    #[test]
    fn test_requires_executor() {
        let ctx = AdapterContext::new(1, Address::ZERO);
        let pendle = SwapVenue::Pendle {
            base_url: None,
            enable_aggregator: true,
        };
        assert!(matches!(
            build_quoter(&pendle, &ctx),
            Err(AdapterError::MissingExecutor)
        ));
    }

    #[test]
    fn test_rejects_malformed_base_url() {
        let balmy = SwapVenue::Balmy {
            base_url: Some("not a url".into()),
            sources: vec![],
        };
        assert!(matches!(
            build_quoter(&balmy, &ctx()),
            Err(AdapterError::InvalidBaseUrl { venue: "balmy", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_vault() {
        let infinifi = SwapVenue::Infinifi {
            vault: Address::ZERO,
            asset: Address::repeat_byte(0x0c),
        };
        assert!(matches!(
            build_quoter(&infinifi, &ctx()),
            Err(AdapterError::ZeroAddress { field: "vault", .. })
        ));
    }
}
