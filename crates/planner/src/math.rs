//! Integer fixed-point helpers.
//!
//! Every helper rounds in a fixed direction so off-chain floors and ceilings
//! agree with the truncating arithmetic the router enforces on-chain.

use alloy_primitives::{aliases::U512, U256};
use leverage_planner_types::BPS_DENOMINATOR;

/// 1e18, the scale of implied exchange rates
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

const BPS: U256 = U256::from_limbs([BPS_DENOMINATOR as u64, 0, 0, 0]);

fn widen(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(value.as_limbs());
    U512::from_limbs(limbs)
}

fn narrow_saturating(value: U512) -> U256 {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|l| *l != 0) {
        return U256::MAX;
    }
    let mut out = [0u64; 4];
    out.copy_from_slice(&limbs[..4]);
    U256::from_limbs(out)
}

/// `floor(a * b / d)` with a 512-bit intermediate product.
///
/// Returns zero when `d` is zero and saturates at `U256::MAX`.
pub fn mul_div_floor(a: U256, b: U256, d: U256) -> U256 {
    if d.is_zero() {
        return U256::ZERO;
    }
    narrow_saturating(widen(a) * widen(b) / widen(d))
}

/// `ceil(a * b / c)`; zero when `c` is zero, which callers must read as
/// "no valid answer" rather than a sizing result.
pub fn mul_div_ceil(a: U256, b: U256, c: U256) -> U256 {
    if c.is_zero() {
        return U256::ZERO;
    }
    let product = widen(a) * widen(b);
    let divisor = widen(c);
    let quotient = product / divisor;
    if (product % divisor).is_zero() {
        narrow_saturating(quotient)
    } else {
        narrow_saturating(quotient + U512::from(1u64))
    }
}

/// Minimum acceptable amount after `bps` of tolerance, rounded down
pub fn apply_slippage_floor(value: U256, bps: u32) -> U256 {
    if bps == 0 {
        return value;
    }
    if bps >= BPS_DENOMINATOR {
        return U256::ZERO;
    }
    mul_div_floor(value, U256::from(BPS_DENOMINATOR - bps), BPS)
}

/// Maximum amount willing to pay after `bps` of tolerance, rounded up
pub fn apply_slippage_ceiling(value: U256, bps: u32) -> U256 {
    mul_div_ceil(value, U256::from(BPS_DENOMINATOR as u64 + bps as u64), BPS)
}

pub fn min(a: U256, b: U256) -> U256 {
    if a <= b {
        a
    } else {
        b
    }
}

pub fn max(a: U256, b: U256) -> U256 {
    if a >= b {
        a
    } else {
        b
    }
}

/// `numerator / denominator` scaled by [`WAD`]; zero when `denominator` is zero
pub fn wad_ratio(numerator: U256, denominator: U256) -> U256 {
    mul_div_floor(numerator, WAD, denominator)
}
