//! Explicit world state shared by every simulation phase.

use crate::company::Company;
use crate::config::SimConfig;
use crate::date::GameDate;
use crate::market::Market;
use crate::names::NameGenerator;
use crate::news::NewsFeed;
use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Suffix appended to a product name that collides during a merge.
pub const MERGE_RENAME_SUFFIX: &str = "_acq";

/// An acquisition agreed this quarter and settled the next.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingAcquisition {
    pub acquirer: String,
    pub target: String,
    pub price: f64,
    pub turn_submitted: u32,
}

/// Position of a product's effectiveness within its market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityRank {
    VeryBad,
    Bad,
    Moderate,
    Good,
    VeryGood,
}

impl QualityRank {
    /// Band for `position` (0 = most effective) among `total` products.
    pub fn from_position(position: usize, total: usize) -> Self {
        let quarter = total / 4;
        if position == 0 {
            QualityRank::VeryGood
        } else if position + 1 == total {
            QualityRank::VeryBad
        } else if position <= quarter {
            QualityRank::Good
        } else if position >= 3 * quarter {
            QualityRank::Bad
        } else {
            QualityRank::Moderate
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            QualityRank::VeryBad => "Very Bad",
            QualityRank::Bad => "Bad",
            QualityRank::Moderate => "Moderate",
            QualityRank::Good => "Good",
            QualityRank::VeryGood => "Very Good",
        }
    }
}

impl fmt::Display for QualityRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Address of a product competing in a market.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProductKey {
    /// A company-owned product.
    Owned { owner: String, product: String },
    /// The imaginary product of a spawned market.
    MarketSeed { market: String },
}

impl ProductKey {
    pub fn owned(owner: impl Into<String>, product: impl Into<String>) -> Self {
        ProductKey::Owned {
            owner: owner.into(),
            product: product.into(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            ProductKey::Owned { owner, .. } => Some(owner),
            ProductKey::MarketSeed { .. } => None,
        }
    }
}

/// Summary of assets moved by [`merge_companies`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeSummary {
    pub cash: f64,
    pub employees: u32,
    pub campuses: usize,
    pub loans: usize,
    pub bonds: usize,
    /// `(old, new)` for products renamed on collision.
    pub renamed: Vec<(String, String)>,
    pub products: Vec<String>,
}

/// Move everything `target` owns into `acquirer`. Negative target cash is
/// written off rather than transferred. The target is left empty.
pub fn merge_companies(acquirer: &mut Company, target: &mut Company) -> MergeSummary {
    let mut summary = MergeSummary {
        cash: target.cash.max(0.0),
        employees: target.employees,
        campuses: target.campuses.len(),
        loans: target.loans.len(),
        bonds: target.bonds.len(),
        ..MergeSummary::default()
    };

    acquirer.cash += summary.cash;
    acquirer.employees += target.employees;
    acquirer.campuses.append(&mut target.campuses);
    acquirer.loans.append(&mut target.loans);
    acquirer.bonds.append(&mut target.bonds);

    for (name, mut product) in std::mem::take(&mut target.products) {
        product.owner = acquirer.name.clone();
        let mut key = name.clone();
        while acquirer.products.contains_key(&key) {
            key.push_str(MERGE_RENAME_SUFFIX);
        }
        if key != name {
            summary.renamed.push((name, key.clone()));
        }
        summary.products.push(key.clone());
        acquirer.products.insert(key, product);
    }

    target.cash = 0.0;
    target.employees = 0;
    summary
}

/// Everything the simulation mutates, passed explicitly into each phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Quarters processed so far.
    pub turn: u32,
    pub start_year: i32,
    pub markets: Vec<Market>,
    pub player: Company,
    pub ai_companies: Vec<Company>,
    pub pending_acquisitions: Vec<PendingAcquisition>,
    pub news: NewsFeed,
    /// Moves made by AI competitors.
    pub competitor_news: NewsFeed,
    pub names: NameGenerator,
}

impl World {
    pub fn new(config: &SimConfig, player: Company) -> Self {
        let mut names = NameGenerator::default();
        names.reserve(player.name.clone());
        Self {
            turn: 0,
            start_year: config.start_year,
            markets: Vec::new(),
            player,
            ai_companies: Vec::new(),
            pending_acquisitions: Vec::new(),
            news: NewsFeed::new(config.news_capacity),
            competitor_news: NewsFeed::new(config.news_capacity),
            names,
        }
    }

    pub fn date(&self) -> GameDate {
        GameDate::from_turn(self.start_year, self.turn)
    }

    pub fn market(&self, name: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.name == name)
    }

    pub fn market_mut(&mut self, name: &str) -> Option<&mut Market> {
        self.markets.iter_mut().find(|m| m.name == name)
    }

    /// Player first, then AI companies in roster order.
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        std::iter::once(&self.player).chain(self.ai_companies.iter())
    }

    pub fn companies_mut(&mut self) -> impl Iterator<Item = &mut Company> {
        std::iter::once(&mut self.player).chain(self.ai_companies.iter_mut())
    }

    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies().find(|c| c.name == name)
    }

    pub fn company_mut(&mut self, name: &str) -> Option<&mut Company> {
        self.companies_mut().find(|c| c.name == name)
    }

    pub fn ai_index(&self, name: &str) -> Option<usize> {
        self.ai_companies.iter().position(|c| c.name == name)
    }

    /// Every product competing in `market`: the player's, then AI
    /// products in roster order, then the market's seed product.
    pub fn products_in_market(&self, market: &str) -> Vec<(ProductKey, &Product)> {
        let mut out: Vec<(ProductKey, &Product)> = self
            .companies()
            .flat_map(|c| {
                c.products
                    .iter()
                    .filter(move |(_, p)| p.market == market)
                    .map(move |(name, p)| (ProductKey::owned(c.name.as_str(), name.as_str()), p))
            })
            .collect();
        if let Some(seed) = self.market(market).and_then(|m| m.seed_product.as_ref()) {
            out.push((
                ProductKey::MarketSeed {
                    market: market.to_string(),
                },
                seed,
            ));
        }
        out
    }

    pub fn product(&self, key: &ProductKey) -> Option<&Product> {
        match key {
            ProductKey::Owned { owner, product } => self.company(owner)?.products.get(product),
            ProductKey::MarketSeed { market } => self.market(market)?.seed_product.as_ref(),
        }
    }

    pub fn product_mut(&mut self, key: &ProductKey) -> Option<&mut Product> {
        match key {
            ProductKey::Owned { owner, product } => {
                self.company_mut(owner)?.products.get_mut(product)
            }
            ProductKey::MarketSeed { market } => self.market_mut(market)?.seed_product.as_mut(),
        }
    }

    /// Quality band of a product within its market; ties keep roster order.
    pub fn quality_rank(&self, key: &ProductKey) -> Option<QualityRank> {
        let market = self.product(key)?.market.clone();
        let mut ranked = self.products_in_market(&market);
        ranked.sort_by(|a, b| b.1.effectiveness.total_cmp(&a.1.effectiveness));
        let position = ranked.iter().position(|(k, _)| k == key)?;
        Some(QualityRank::from_position(position, ranked.len()))
    }

    /// Highest-revenue product in a market, seed product included.
    pub fn top_earner(&self, market: &str) -> Option<ProductKey> {
        self.products_in_market(market)
            .into_iter()
            .fold(None, |best: Option<(ProductKey, f64)>, (key, p)| match best {
                Some((_, rev)) if rev >= p.revenue => best,
                _ => Some((key, p.revenue)),
            })
            .map(|(key, _)| key)
    }

    /// Number of companies with a product in `market`.
    pub fn competitor_count(&self, market: &str) -> usize {
        self.companies().filter(|c| c.has_product_in(market)).count()
    }

    pub fn weakest_effectiveness(&self, market: &str) -> Option<f64> {
        self.products_in_market(market)
            .iter()
            .map(|(_, p)| p.effectiveness)
            .reduce(f64::min)
    }

    /// Company with the largest market cap other than `excluded`. The player
    /// wins ties.
    pub fn largest_company_except(&self, excluded: &str) -> Option<&str> {
        let mut best: Option<&Company> = None;
        if self.player.name != excluded {
            best = Some(&self.player);
        }
        for ai in &self.ai_companies {
            if ai.name == excluded {
                continue;
            }
            match best {
                Some(b) if ai.market_cap <= b.market_cap => {}
                _ => best = Some(ai),
            }
        }
        best.map(|c| c.name.as_str())
    }

    /// Merge AI company `target` into `acquirer` and drop it from the roster.
    /// Returns `None` when either side is missing or they are the same company.
    pub fn absorb(&mut self, acquirer: &str, target: &str) -> Option<MergeSummary> {
        if acquirer == target || self.company(acquirer).is_none() {
            return None;
        }
        let idx = self.ai_index(target)?;
        let mut absorbed = self.ai_companies.remove(idx);
        let buyer = self.company_mut(acquirer)?;
        let summary = merge_companies(buyer, &mut absorbed);
        for (_, new_name) in &summary.renamed {
            self.names.reserve(new_name.clone());
        }
        debug!(acquirer, target, products = summary.products.len(), "merged company");
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::Campus;
    use crate::company::Tier;
    use crate::instruments::{Bond, Loan};
    use proptest::prelude::*;

    fn world() -> World {
        let player = Company::new("Player Co", None, 1_000_000.0, 5).with_campus(Campus::garage());
        let mut w = World::new(&SimConfig::default(), player);
        w.markets.push(Market::new("Cloud", 1_000_000.0, 0.1));
        w
    }

    fn ai(name: &str, market_cap: f64) -> Company {
        let mut c = Company::new(name, Some(Tier::Medium), 50_000.0, 3);
        c.market_cap = market_cap;
        c
    }

    #[test]
    fn rank_bands_follow_position() {
        let bands: Vec<_> = (0..8).map(|p| QualityRank::from_position(p, 8)).collect();
        use QualityRank::*;
        assert_eq!(bands, [VeryGood, Good, Good, Moderate, Moderate, Moderate, Bad, VeryBad]);
        assert_eq!(QualityRank::from_position(0, 1), VeryGood);
        assert_eq!(QualityRank::from_position(1, 2), VeryBad);
    }

    #[test]
    fn quality_rank_orders_by_effectiveness() {
        let mut w = world();
        let mut strong = Product::new("A", "Cloud");
        strong.effectiveness = 3.0;
        let mut weak = Product::new("B", "Cloud");
        weak.effectiveness = 0.5;
        w.ai_companies.push(ai("A", 0.0).with_product("Strong", strong));
        w.ai_companies.push(ai("B", 0.0).with_product("Weak", weak));
        assert_eq!(
            w.quality_rank(&ProductKey::owned("A", "Strong")),
            Some(QualityRank::VeryGood)
        );
        assert_eq!(
            w.quality_rank(&ProductKey::owned("B", "Weak")),
            Some(QualityRank::VeryBad)
        );
        assert_eq!(w.competitor_count("Cloud"), 2);
    }

    #[test]
    fn largest_prefers_player_on_ties() {
        let mut w = world();
        w.player.market_cap = 10.0;
        w.ai_companies.push(ai("Same", 10.0));
        w.ai_companies.push(ai("Bankrupt", 99.0));
        assert_eq!(w.largest_company_except("Bankrupt"), Some("Player Co"));
        w.ai_companies.push(ai("Bigger", 11.0));
        assert_eq!(w.largest_company_except("Bankrupt"), Some("Bigger"));
    }

    #[test]
    fn merge_renames_colliding_products() {
        let mut buyer = ai("Buyer", 0.0).with_product("Core", Product::new("Buyer", "Cloud"));
        let mut target = ai("Target", 0.0)
            .with_product("Core", Product::new("Target", "Cloud"))
            .with_product("Core_acq", Product::new("Target", "Cloud"));
        target.cash = -500.0;
        let summary = merge_companies(&mut buyer, &mut target);
        assert_eq!(summary.cash, 0.0);
        assert_eq!(buyer.cash, 50_000.0);
        assert_eq!(buyer.products.len(), 3);
        assert!(buyer.products.contains_key("Core_acq_acq"));
        assert!(buyer.products.values().all(|p| p.owner == "Buyer"));
        assert!(target.products.is_empty());
    }

    #[test]
    fn absorb_removes_target_from_roster() {
        let mut w = world();
        w.ai_companies.push(ai("Target", 0.0));
        let summary = w.absorb("Player Co", "Target");
        assert!(summary.is_some());
        assert!(w.ai_companies.is_empty());
        assert_eq!(w.player.employees, 8);
        assert!(w.absorb("Player Co", "Target").is_none());
    }

    proptest! {
        #[test]
        fn merge_conserves_assets(cash in -1e6f64..1e7,
                                  employees in 0u32..500,
                                  campuses in 0usize..4,
                                  loans in 0usize..4,
                                  bonds in 0usize..4,
                                  products in 0usize..6) {
            let mut buyer = ai("Buyer", 0.0).with_product("P0", Product::new("Buyer", "Cloud"));
            let mut target = Company::new("Target", Some(Tier::Large), cash, employees);
            for _ in 0..campuses {
                target.campuses.push(Campus::garage());
            }
            for _ in 0..loans {
                target.loans.push(Loan::new(10_000.0, 0.09, 60));
            }
            for _ in 0..bonds {
                target.bonds.push(Bond::new(10_000.0, 0.06, 2));
            }
            for i in 0..products {
                target.products.insert(format!("P{i}"), Product::new("Target", "Cloud"));
            }
            let before = buyer.clone();
            merge_companies(&mut buyer, &mut target);

            prop_assert!((buyer.cash - (before.cash + cash.max(0.0))).abs() < 1e-6);
            prop_assert_eq!(buyer.employees, before.employees + employees);
            prop_assert_eq!(buyer.campuses.len(), before.campuses.len() + campuses);
            prop_assert_eq!(buyer.loans.len(), before.loans.len() + loans);
            prop_assert_eq!(buyer.bonds.len(), before.bonds.len() + bonds);
            prop_assert_eq!(buyer.products.len(), before.products.len() + products);
            prop_assert_eq!(target.employees, 0);
            prop_assert_eq!(target.cash, 0.0);
            prop_assert!(target.campuses.is_empty() && target.loans.is_empty());
            prop_assert!(target.bonds.is_empty() && target.products.is_empty());
        }
    }
}
