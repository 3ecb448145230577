//! Acquisition pricing.

use sim_core::Company;

/// Premium paid over annualized revenue plus liquid net assets.
pub const ACQUISITION_PREMIUM: f64 = 1.3;
/// A target with any product growing faster than this (percent, last
/// quarter) cannot be acquired.
pub const BREAKOUT_GROWTH_PCT: f64 = 30.0;

/// Price to acquire `target`: the premium valuation or its market cap,
/// whichever is higher. Only cash and bonds less loans count toward the
/// asset side; campuses are left out and a negative balance counts as zero.
///
/// Example:
/// a company with no revenue, $10k cash, $50k of loans and a $200k
/// market cap is priced at $200k.
pub fn acquisition_price(target: &Company) -> f64 {
    let assets = target.liquid_net_assets().max(0.0);
    let valuation = ACQUISITION_PREMIUM * (target.annualized_revenue() + assets);
    valuation.max(target.market_cap)
}

/// Whether any of the target's products grew past the breakout threshold
/// last quarter.
pub fn has_breakout_growth(target: &Company) -> bool {
    target
        .products
        .values()
        .any(|p| p.last_growth().map_or(false, |g| g > BREAKOUT_GROWTH_PCT))
}
