//! New competitors and new markets arriving during the game.

use crate::setup::INITIAL_MARKETS;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index::sample;
use rand::Rng;
use sim_core::{Campus, Company, Market, PerDepartment, Product, SimConfig, Tier, World};
use std::ops::RangeInclusive;
use tracing::info;

/// Markets opened over the game, in order.
pub const SPAWN_MARKETS: [&str; 12] = [
    "Semiconductors",
    "Autonomous Vehicles",
    "Blockchain",
    "Telecommunications",
    "VR Software",
    "Cloud Gaming",
    "Quantum Computing",
    "Smart Home",
    "Streaming Platforms",
    "GreenTech",
    "Wearables",
    "Video Games",
];

/// Revenue a newcomer's product starts with, taken from the market leader.
pub const ENTRANT_REVENUE: f64 = 1_000.0;
const TIER_WEIGHTS: [f64; 4] = [0.50, 0.25, 0.15, 0.05];

struct EntrantProfile {
    campus: Campus,
    employees: RangeInclusive<u32>,
    cash: RangeInclusive<f64>,
    products: usize,
}

fn entrant_profile(tier: Tier) -> EntrantProfile {
    match tier {
        Tier::Startup => EntrantProfile {
            campus: Campus::garage(),
            employees: 5..=10,
            cash: 500_000.0..=2_000_000.0,
            products: 1,
        },
        Tier::Medium => EntrantProfile {
            campus: Campus::new("Small Office", 400_000.0, 0.02, 50),
            employees: 15..=35,
            cash: 3_000_000.0..=5_000_000.0,
            products: 2,
        },
        Tier::Large => EntrantProfile {
            campus: Campus::new("Large Office", 1_000_000.0, 0.04, 150),
            employees: 40..=70,
            cash: 7_000_000.0..=15_000_000.0,
            products: 3,
        },
        Tier::BigTech => EntrantProfile {
            campus: Campus::new("Large Building", 1_600_000.0, 0.08, 275),
            employees: 80..=140,
            cash: 18_000_000.0..=28_000_000.0,
            products: 4,
        },
    }
}

/// Take up to [`ENTRANT_REVENUE`] from the highest-earning company product
/// in `market`. AI products are checked before the player's.
fn siphon_leader(world: &mut World, market: &str) {
    let mut leader: Option<&mut Product> = None;
    let World {
        player,
        ai_companies,
        ..
    } = world;
    for p in ai_companies
        .iter_mut()
        .chain(std::iter::once(player))
        .flat_map(|c| c.products.values_mut())
        .filter(|p| p.market == market)
    {
        let best = leader.as_ref().map_or(0.0, |l| l.revenue);
        if p.revenue > best {
            leader = Some(p);
        }
    }
    if let Some(p) = leader {
        p.revenue -= p.revenue.min(ENTRANT_REVENUE);
    }
}

/// Add up to `config.ai_spawn_batch` new AI companies without exceeding
/// `config.max_spawned_ai` over the game. Returns the new names.
///
/// Entrants only pick from the opening markets. Each product starts with
/// one employee per department on top of the drawn headcount.
pub fn spawn_ai_companies<R: Rng + ?Sized>(
    world: &mut World,
    config: &SimConfig,
    already_spawned: u32,
    rng: &mut R,
) -> Vec<String> {
    let mut spawned = Vec::new();
    let Ok(tiers) = WeightedIndex::new(TIER_WEIGHTS) else {
        return spawned;
    };
    let pool = world.markets.len().min(INITIAL_MARKETS.len());
    for _ in 0..config.ai_spawn_batch {
        if already_spawned + spawned.len() as u32 >= config.max_spawned_ai {
            break;
        }
        let tier = Tier::ALL[tiers.sample(rng)];
        let profile = entrant_profile(tier);
        let name = world.names.company_name(rng);
        let mut company = Company::new(
            name.as_str(),
            Some(tier),
            rng.gen_range(profile.cash.clone()),
            rng.gen_range(profile.employees.clone()),
        )
        .with_campus(profile.campus.clone());

        for idx in sample(rng, pool, profile.products.min(pool)) {
            let market = world.markets[idx].name.clone();
            let mut product = Product::new(name.as_str(), market.as_str()).with_revenue(ENTRANT_REVENUE);
            product.assigned = PerDepartment::new(1, 1, 1);
            company.employees += 3;
            siphon_leader(world, &market);
            let product_name = world.names.product_name(rng);
            company.products.insert(product_name, product);
        }

        world
            .news
            .push(format!("NEW COMPETITOR ALERT! {name} COMPANY SIZE: {tier}"));
        info!(company = %name, %tier, "competitor entered");
        world.ai_companies.push(company);
        spawned.push(name);
    }
    spawned
}

fn growth_rating(rate: f64) -> &'static str {
    if rate <= 0.11 {
        "Moderate"
    } else if rate <= 0.13 {
        "Good"
    } else {
        "Very Good"
    }
}

fn thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Open the `index`-th market of [`SPAWN_MARKETS`]. Its opening revenue
/// sits in a seed product no company owns.
pub fn spawn_market<R: Rng + ?Sized>(
    world: &mut World,
    config: &SimConfig,
    index: u32,
    rng: &mut R,
) -> Option<String> {
    if index >= config.max_spawned_markets {
        return None;
    }
    let name = SPAWN_MARKETS.get(index as usize)?;
    let size = rng.gen_range(500_000.0..=5_000_000.0);
    let growth = rng.gen_range(0.10..=0.15);
    world.markets.push(Market::seeded(*name, size, growth));
    world.news.push(format!(
        "NEW PRODUCT MARKET! {name} SIZE: ~${} GROWTH: {}",
        thousands(size),
        growth_rating(growth)
    ));
    info!(market = *name, size, growth, "market opened");
    Some(name.to_string())
}
