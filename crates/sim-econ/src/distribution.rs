//! Market revenue distribution.
//!
//! Each quarter a market's churn pool (a fixed share of trailing revenue)
//! and growth pool (annual growth spread over four quarters) are handed to
//! participating products in proportion to their effectiveness.

use sim_core::{Market, Product, World};
use tracing::{debug, trace};

/// Share of revenue that churns away from every product each quarter.
pub const CHURN_RATE: f64 = 0.08;

/// What one market's distribution pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketReport {
    pub market: String,
    pub participants: usize,
    pub churn_pool: f64,
    pub growth_pool: f64,
    pub total_revenue: f64,
}

/// Redistribute one market's revenue across `products`.
///
/// Products owned by `exempt_owner` keep their revenue and effectiveness
/// untouched and do not dilute the shares of others; they still count
/// toward the market's realized total.
pub fn distribute_market(
    market: &mut Market,
    products: &mut [&mut Product],
    exempt_owner: Option<&str>,
) -> MarketReport {
    market.apply_recession();
    let mut report = MarketReport {
        market: market.name.clone(),
        participants: products.len(),
        ..MarketReport::default()
    };
    if products.is_empty() {
        market.last_quarter_total_revenue = 0.0;
        return report;
    }

    if market.last_quarter_total_revenue <= 0.0 {
        market.last_quarter_total_revenue = products.iter().map(|p| p.revenue).sum();
    }
    report.growth_pool = if market.is_in_global_recession {
        0.0
    } else {
        market.size * market.growth_rate / 4.0
    };
    report.churn_pool = CHURN_RATE * market.last_quarter_total_revenue;

    let is_exempt = |p: &Product| exempt_owner.map_or(false, |owner| p.owner == owner);
    let previous: Vec<f64> = products.iter().map(|p| p.revenue).collect();

    for p in products.iter_mut().filter(|p| !is_exempt(p)) {
        p.update_effective_spend();
        p.update_effectiveness();
    }

    let mut total_effectiveness: f64 = products
        .iter()
        .filter(|p| !is_exempt(p))
        .map(|p| p.effectiveness)
        .sum();
    if total_effectiveness <= 0.0 {
        total_effectiveness = 1.0;
    }

    for (p, &before) in products.iter_mut().zip(&previous) {
        if is_exempt(p) {
            continue;
        }
        let share = p.effectiveness / total_effectiveness;
        p.revenue -= p.revenue * CHURN_RATE;
        p.revenue += share * report.churn_pool;
        p.revenue += share * report.growth_pool;
        if before > 0.0 {
            p.record_growth((p.revenue - before) / before * 100.0);
        }
        trace!(owner = %p.owner, market = %market.name, revenue = p.revenue, "product revenue updated");
    }

    report.total_revenue = products.iter().map(|p| p.revenue).sum();
    market.last_quarter_total_revenue = report.total_revenue;
    if !market.is_in_global_recession {
        market.size = report.total_revenue;
    }
    report
}

/// Run [`distribute_market`] over every market in the world.
///
/// `is_initial_turn` exempts the player's products so their opening share
/// stays fixed during the first quarter.
pub fn distribute_all_markets(world: &mut World, is_initial_turn: bool) -> Vec<MarketReport> {
    let World {
        markets,
        player,
        ai_companies,
        ..
    } = world;
    let exempt = if is_initial_turn {
        Some(player.name.clone())
    } else {
        None
    };

    let mut reports = Vec::with_capacity(markets.len());
    for market in markets.iter_mut() {
        let mut seed = market.seed_product.take();
        let name = market.name.clone();
        let mut products: Vec<&mut Product> = player
            .products
            .values_mut()
            .chain(ai_companies.iter_mut().flat_map(|c| c.products.values_mut()))
            .filter(|p| p.market == name)
            .collect();
        if let Some(s) = seed.as_mut() {
            products.push(s);
        }
        let report = distribute_market(market, &mut products, exempt.as_deref());
        drop(products);
        market.seed_product = seed;
        debug!(
            market = %report.market,
            participants = report.participants,
            total = report.total_revenue,
            "market distributed"
        );
        reports.push(report);
    }
    reports
}
