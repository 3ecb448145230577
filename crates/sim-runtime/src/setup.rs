//! Opening state of a new game.

use rand::seq::index::sample;
use rand::Rng;
use sim_core::{Campus, CampusCatalog, Company, Market, Product, SimConfig, Tier, World};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::info;

pub const INITIAL_MARKETS: [&str; 8] = [
    "Artificial Intelligence",
    "Cloud Computing",
    "Cybersecurity",
    "Enterprise SaaS",
    "E-Commerce",
    "Consumer Hardware",
    "FinTech",
    "Social Media",
];

pub const INITIAL_MARKET_SIZE: RangeInclusive<u64> = 25_000_000..=50_000_000;
/// Annual base growth drawn for every market at setup and on re-rolls.
pub const BASE_GROWTH: RangeInclusive<f64> = 0.05..=0.15;

/// How one tier of opening competitors is built.
#[derive(Clone, Debug, PartialEq)]
pub struct TierProfile {
    pub tier: Tier,
    pub count: usize,
    pub markets: usize,
    pub campus: &'static str,
    pub employees: RangeInclusive<u32>,
    pub cash: RangeInclusive<f64>,
}

pub fn opening_profiles() -> [TierProfile; 4] {
    [
        TierProfile {
            tier: Tier::Startup,
            count: 5,
            markets: 1,
            campus: "Garage",
            employees: 10..=20,
            cash: 500_000.0..=2_000_000.0,
        },
        TierProfile {
            tier: Tier::Medium,
            count: 7,
            markets: 2,
            campus: "Small Office",
            employees: 35..=70,
            cash: 3_000_000.0..=6_000_000.0,
        },
        TierProfile {
            tier: Tier::Large,
            count: 5,
            markets: 4,
            campus: "Large Office",
            employees: 80..=140,
            cash: 12_000_000.0..=18_000_000.0,
        },
        TierProfile {
            tier: Tier::BigTech,
            count: 3,
            markets: 5,
            campus: "Large Building",
            employees: 180..=300,
            cash: 25_000_000.0..=40_000_000.0,
        },
    ]
}

pub(crate) fn catalog_campus(catalog: &CampusCatalog, label: &str) -> Campus {
    catalog.find(label).cloned().unwrap_or_else(Campus::garage)
}

pub fn random_market<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Market {
    let size = rng.gen_range(INITIAL_MARKET_SIZE) as f64;
    Market::new(name, size, rng.gen_range(BASE_GROWTH))
}

/// The player's company before an opening product is chosen.
pub fn new_player(config: &SimConfig) -> Company {
    Company::new(
        config.player_name.as_str(),
        None,
        config.player_starting_cash,
        config.player_starting_employees,
    )
    .with_campus(catalog_campus(&config.campus_catalog, "Garage"))
}

/// Build the opening world: initial markets, the AI roster with their
/// seeded products and opening revenue, and the player.
pub fn new_world<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> World {
    let mut world = World::new(config, new_player(config));
    world.markets = INITIAL_MARKETS.iter().map(|n| random_market(n, rng)).collect();

    for profile in opening_profiles() {
        for _ in 0..profile.count {
            let name = world.names.company_name(rng);
            let mut company = Company::new(
                name.as_str(),
                Some(profile.tier),
                rng.gen_range(profile.cash.clone()),
                rng.gen_range(profile.employees.clone()),
            )
            .with_campus(catalog_campus(&config.campus_catalog, profile.campus));
            let picks = profile.markets.min(world.markets.len());
            for idx in sample(rng, world.markets.len(), picks) {
                let market = world.markets[idx].name.clone();
                let product = Product::new(name.as_str(), market).with_staff(
                    rng.gen_range(1..=3),
                    rng.gen_range(1..=3),
                    rng.gen_range(1..=3),
                );
                let product_name = world.names.product_name(rng);
                company.products.insert(product_name, product);
            }
            world.ai_companies.push(company);
        }
    }
    assign_opening_shares(&mut world);
    info!(
        markets = world.markets.len(),
        companies = world.ai_companies.len(),
        "world created"
    );
    world
}

/// Split a quarter of each market's size across the AI companies in it,
/// weighted by tier, then evenly across each company's products there.
pub fn assign_opening_shares(world: &mut World) {
    for market in &world.markets {
        let mut holders: BTreeMap<usize, usize> = BTreeMap::new();
        for (idx, c) in world.ai_companies.iter().enumerate() {
            let count = c.products.values().filter(|p| p.market == market.name).count();
            if count > 0 {
                holders.insert(idx, count);
            }
        }
        if holders.is_empty() {
            continue;
        }
        let weight = |idx: usize| {
            world.ai_companies[idx]
                .tier
                .map_or(1.0, Tier::share_weight)
        };
        let total_weight: f64 = holders.keys().map(|&i| weight(i)).sum();
        let first_quarter = market.size / 4.0;
        let shares: Vec<(usize, f64)> = holders
            .iter()
            .map(|(&idx, &count)| (idx, weight(idx) / total_weight * first_quarter / count as f64))
            .collect();
        for (idx, each) in shares {
            for p in world.ai_companies[idx].products.values_mut() {
                if p.market == market.name {
                    p.revenue += each;
                }
            }
        }
    }
}
