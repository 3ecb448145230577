//! Read-only summaries and the bounded quarterly history.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{usd, Company, Department, GrowthCategory, Market, Tier, World};
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub market: String,
    pub research: u32,
    pub quality_assurance: u32,
    pub marketing: u32,
    pub revenue: Decimal,
    pub effectiveness: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BondSummary {
    pub principal: Decimal,
    pub annual_rate: f64,
    pub term_remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub tier: Option<Tier>,
    pub cash: Decimal,
    /// Outstanding loan principal.
    pub debt: Decimal,
    pub market_cap: Decimal,
    pub employees: u32,
    pub employee_capacity: u32,
    pub quarterly_revenue: Decimal,
    pub products: Vec<ProductSummary>,
    pub bonds: Vec<BondSummary>,
}

impl CompanySummary {
    pub fn of(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            tier: company.tier,
            cash: usd(company.cash),
            debt: usd(company.loan_principal()),
            market_cap: usd(company.market_cap),
            employees: company.employees,
            employee_capacity: company.employee_capacity(),
            quarterly_revenue: usd(company.total_revenue()),
            products: company
                .products
                .iter()
                .map(|(name, p)| ProductSummary {
                    name: name.clone(),
                    market: p.market.clone(),
                    research: p.assigned[Department::Research],
                    quality_assurance: p.assigned[Department::QualityAssurance],
                    marketing: p.assigned[Department::Marketing],
                    revenue: usd(p.revenue),
                    effectiveness: p.effectiveness,
                })
                .collect(),
            bonds: company
                .bonds
                .iter()
                .map(|b| BondSummary {
                    principal: usd(b.principal),
                    annual_rate: b.annual_rate,
                    term_remaining: b.term_remaining,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub name: String,
    pub size: Decimal,
    pub growth_rate: f64,
    pub growth_category: GrowthCategory,
    pub competitors: usize,
    pub is_in_global_recession: bool,
    pub last_quarter_revenue: Decimal,
}

impl MarketSummary {
    pub fn of(market: &Market, world: &World) -> Self {
        Self {
            name: market.name.clone(),
            size: usd(market.size),
            growth_rate: market.growth_rate,
            growth_category: market.growth_category(),
            competitors: world.competitor_count(&market.name),
            is_in_global_recession: market.is_in_global_recession,
            last_quarter_revenue: usd(market.last_quarter_total_revenue),
        }
    }
}

/// State of the world at the end of a quarter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarterSnapshot {
    pub turn: u32,
    /// First day of the quarter the snapshot opens.
    pub date: Option<NaiveDate>,
    pub companies: Vec<CompanySummary>,
    pub markets: Vec<MarketSummary>,
}

impl QuarterSnapshot {
    /// Capture `world` labelled as `turn`.
    pub fn capture(world: &World, turn: u32) -> Self {
        Self {
            turn,
            date: sim_core::GameDate::from_turn(world.start_year, turn).first_day(),
            companies: world.companies().map(CompanySummary::of).collect(),
            markets: world.markets.iter().map(|m| MarketSummary::of(m, world)).collect(),
        }
    }
}

/// Most recent snapshots, oldest evicted first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHistory {
    capacity: usize,
    entries: VecDeque<QuarterSnapshot>,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, snapshot: QuarterSnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&QuarterSnapshot> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QuarterSnapshot> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Campus, Loan, Product, SimConfig};

    fn world() -> World {
        let mut player = Company::new("Player Co", None, 1_234.567, 5)
            .with_campus(Campus::garage())
            .with_product("Cloud", Product::new("Player Co", "Cloud").with_staff(1, 2, 2));
        player.loans.push(Loan::new(10_000.0, 0.09, 60));
        let mut w = World::new(&SimConfig::default(), player);
        w.markets.push(Market::new("Cloud", 30_000_000.0, 0.1));
        w
    }

    #[test]
    fn summaries_round_money_to_cents() {
        let w = world();
        let s = CompanySummary::of(&w.player);
        assert_eq!(s.cash, Decimal::new(123_457, 2));
        assert_eq!(s.debt, Decimal::new(10_000, 0));
        assert_eq!(s.products[0].quality_assurance, 2);
        let m = MarketSummary::of(&w.markets[0], &w);
        assert_eq!(m.competitors, 1);
        assert_eq!(m.growth_category, GrowthCategory::Moderate);
    }

    #[test]
    fn snapshot_dates_follow_turns() {
        let w = world();
        let snap = QuarterSnapshot::capture(&w, 5);
        assert_eq!(snap.date, NaiveDate::from_ymd_opt(2001, 4, 1));
        assert_eq!(snap.companies.len(), 1);
    }

    #[test]
    fn history_evicts_oldest() {
        let w = world();
        let mut h = SnapshotHistory::new(10);
        for turn in 0..13 {
            h.record(QuarterSnapshot::capture(&w, turn));
        }
        assert_eq!(h.len(), 10);
        assert_eq!(h.iter().next().map(|s| s.turn), Some(3));
        assert_eq!(h.latest().map(|s| s.turn), Some(12));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = QuarterSnapshot::capture(&world(), 0);
        let json = serde_json::to_string(&snap).unwrap();
        let back: QuarterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
