//! The four cost sub-models. Each one is a closed-form heuristic over order
//! size and band depth; none of them walks the book.

use interface::FeeTier;

/// Depth used by the market impact term when the band holds no liquidity.
pub const MIN_IMPACT_DEPTH: f64 = 1.0;

/// Relative-size heuristic: the larger the order against band depth, the
/// larger the expected price degradation. Result is in percent.
pub fn slippage(quantity: f64, total_depth: f64, volatility: f64) -> f64 {
    let relative_size_impact = quantity / (total_depth + 1.0);
    relative_size_impact * volatility * 100.0
}

pub fn fees(quantity: f64, fee_tier: FeeTier) -> f64 {
    quantity * fee_tier.rate()
}

/// Square-root impact, `sigma * |q| * sqrt(T / V)` with `T = 1` and band
/// depth standing in for volume. Result is in percent.
///
/// `SimulationParams` already rejects negative quantities; the `abs` only
/// matters for callers passing raw numbers.
pub fn market_impact(quantity: f64, volatility: f64, total_depth: f64) -> f64 {
    let time_horizon = 1.0;
    let volume = impact_depth(total_depth);
    volatility * quantity.abs() * (time_horizon / volume).sqrt() * 100.0
}

/// Zero (or negative) depth would divide by zero above; treat it as one unit.
pub fn impact_depth(total_depth: f64) -> f64 {
    if total_depth <= 0.0 {
        MIN_IMPACT_DEPTH
    } else {
        total_depth
    }
}

/// Share of the order expected to rest as maker. 1.0 for tiny orders,
/// bottoming out at 0.1 once the order dominates the band.
pub fn maker_taker_proportion(quantity: f64, total_depth: f64) -> f64 {
    let taker_share = (quantity / (total_depth * 10.0 + 1.0)).min(0.9);
    (1.0 - taker_share).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slippage_guards_zero_depth() {
        assert!((slippage(1.0, 4.0, 0.05) - 1.0).abs() < 1e-12);
        assert_eq!(slippage(10.0, 0.0, 0.05), 50.0);
    }

    #[test]
    fn test_fees_per_tier() {
        assert_eq!(fees(1000.0, FeeTier::Default), 1.0);
        assert!((fees(1000.0, FeeTier::Tier3) - 0.4).abs() < 1e-12);
        assert_eq!(fees(0.0, FeeTier::Tier1), 0.0);
    }

    #[test]
    fn test_market_impact_zero_depth_uses_floor() {
        let impact = market_impact(100.0, 0.05, 0.0);
        assert!(impact.is_finite());
        assert_eq!(impact, market_impact(100.0, 0.05, MIN_IMPACT_DEPTH));
        assert_eq!(impact, 500.0);
    }

    #[test]
    fn test_impact_depth_floor_only_replaces_non_positive() {
        assert_eq!(impact_depth(0.0), 1.0);
        assert_eq!(impact_depth(-3.0), 1.0);
        assert_eq!(impact_depth(0.25), 0.25);
        assert_eq!(impact_depth(7.0), 7.0);
    }

    #[test]
    fn test_maker_taker_bounds() {
        assert_eq!(maker_taker_proportion(0.0, 0.0), 1.0);
        assert_eq!(maker_taker_proportion(1e9, 0.0), 0.1);
        assert_eq!(maker_taker_proportion(1e9, 5.0), 0.1);

        for q in [0.0, 0.5, 1.0, 10.0, 100.0, 1e4, 1e8] {
            for d in [0.0, 0.1, 1.0, 7.0, 1e3, 1e6] {
                let p = maker_taker_proportion(q, d);
                assert!((0.1..=1.0).contains(&p), "q={} d={} p={}", q, d, p);
            }
        }
    }
}
