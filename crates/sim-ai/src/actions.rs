//! Individual AI actions and their outcomes.
//!
//! Actions never fail. When something cannot happen the returned outcome
//! says why, and the world is left as it was.

use crate::policy::{AiConfig, TierPolicy};
use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::{
    CampusCatalog, Company, Downsizing, PendingAcquisition, PerDepartment, Product, ProductKey,
    QualityRank, World, EMPLOYEE_COST_PER_QUARTER,
};
use sim_econ::acquisition_price;
use tracing::debug;

/// Share of market size charged per quarter of entry; four quarters are charged.
pub const ENTRY_COST_SHARE: f64 = 0.05;
/// A newcomer starts at this share of the weakest incumbent's effectiveness.
pub const ENTRY_EFFECTIVENESS_SHARE: f64 = 0.6;
/// Revenue a newcomer takes from the market's top earner.
pub const ENTRY_SIPHON: f64 = 10_000.0;

/// One-off cost of entering `market`.
pub fn entry_cost(market_size: f64) -> f64 {
    market_size * ENTRY_COST_SHARE * 4.0
}

/// Headcount whose base cost is `ratio` of this quarter's revenue.
pub fn target_headcount(company: &Company, ratio: f64) -> u32 {
    (ratio * company.total_revenue() / EMPLOYEE_COST_PER_QUARTER)
        .floor()
        .max(0.0) as u32
}

/// Whole-dollar amount as shown in headlines.
pub fn money(amount: f64) -> String {
    format!("${:.0}", amount)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HireOutcome {
    Hired(u32),
    SkippedInsufficientCash,
    SkippedNoCapacity,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FireOutcome {
    Fired(Downsizing),
    /// Nobody could be let go: no severance cash and nobody over capacity.
    SkippedInsufficientCash,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StaffingOutcome {
    Hire(HireOutcome),
    Fire(FireOutcome),
    Steady,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CampusOutcome {
    Built { label: String, cost: f64 },
    NotNeeded,
    SkippedCashFloor,
    NothingAffordable,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoanOutcome {
    Drawn { amount: f64, annual_rate: f64 },
    NotNeeded,
    SkippedNoHeadroom,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProductOutcome {
    Launched {
        product: String,
        market: String,
        cost: f64,
    },
    NoOpenMarket,
    SkippedUnprofitable,
    SkippedCashBuffer,
    SkippedCostFraction,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionOutcome {
    Queued { target: String, price: f64 },
    Disabled,
    SkippedCooldown,
    NoWeakProduct,
    NoTarget,
    SkippedInsufficientCash,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BondOutcome {
    Bought {
        amount: f64,
        annual_rate: f64,
        term_quarters: u32,
    },
    NotNeeded,
    SkippedByChance,
    SkippedTooSmall,
}

/// Hire toward the policy target, or fire when overstaffed and losing money.
pub fn adjust_staffing(company: &mut Company, policy: &TierPolicy, profit: f64) -> StaffingOutcome {
    let revenue = company.total_revenue();
    let target = target_headcount(company, policy.target_cost_ratio);
    if company.employees < target {
        let room = company.employee_capacity().saturating_sub(company.employees);
        let hires = (target - company.employees).min(room);
        let outcome = if company.cash <= revenue * policy.hire_cash_revenue_multiple {
            HireOutcome::SkippedInsufficientCash
        } else if hires == 0 {
            HireOutcome::SkippedNoCapacity
        } else {
            company.employees += hires;
            HireOutcome::Hired(hires)
        };
        return StaffingOutcome::Hire(outcome);
    }
    let fire_above = (f64::from(target) * policy.fire_threshold).floor() as u32;
    if profit < 0.0 && company.employees > fire_above {
        let downsizing = company.downsize(target);
        let outcome = if downsizing.departed() > 0 {
            FireOutcome::Fired(downsizing)
        } else {
            FireOutcome::SkippedInsufficientCash
        };
        return StaffingOutcome::Fire(outcome);
    }
    StaffingOutcome::Steady
}

/// Build a campus once free capacity runs low.
pub fn expand_campus(
    company: &mut Company,
    policy: &TierPolicy,
    catalog: &CampusCatalog,
) -> CampusOutcome {
    let capacity = company.employee_capacity();
    let free = i64::from(capacity) - i64::from(company.employees);
    if capacity == 0 || free as f64 >= policy.campus_trigger * f64::from(capacity) {
        return CampusOutcome::NotNeeded;
    }
    if company.cash <= policy.campus_cash_floor {
        return CampusOutcome::SkippedCashFloor;
    }
    let affordable = catalog.affordable(company.cash);
    match policy.campus_pick.select(&affordable) {
        Some(campus) => {
            let campus = campus.clone();
            let outcome = CampusOutcome::Built {
                label: campus.label.clone(),
                cost: campus.cost,
            };
            company.build_campus(campus);
            outcome
        }
        None => CampusOutcome::NothingAffordable,
    }
}

/// Draw against the credit limit. Emergency draws take all of it, others half.
pub fn draw_credit(company: &mut Company, emergency: bool, min_loan: f64) -> LoanOutcome {
    let available = company.loan_headroom();
    if available < min_loan {
        return LoanOutcome::SkippedNoHeadroom;
    }
    let amount = if emergency { available } else { available * 0.5 };
    let annual_rate = company.draw_loan(amount).annual_rate;
    LoanOutcome::Drawn {
        amount,
        annual_rate,
    }
}

/// Put a share of cash into a bond when the policy's surplus gate passes.
pub fn invest_surplus<R: Rng + ?Sized>(
    company: &mut Company,
    policy: &TierPolicy,
    config: &AiConfig,
    rng: &mut R,
) -> BondOutcome {
    let revenue = company.total_revenue();
    let bond = &policy.bond;
    if company.cash <= revenue * bond.cash_revenue_multiple || company.cash <= bond.cash_floor {
        return BondOutcome::NotNeeded;
    }
    if rng.gen::<f64>() >= bond.probability {
        return BondOutcome::SkippedByChance;
    }
    let amount = company.cash * config.bond_investment_share;
    if amount < config.min_bond_investment {
        return BondOutcome::SkippedTooSmall;
    }
    company.buy_bond(amount, bond.annual_rate, bond.term_quarters);
    BondOutcome::Bought {
        amount,
        annual_rate: bond.annual_rate,
        term_quarters: bond.term_quarters,
    }
}

/// Put a new product for `owner` into `market`, charging `cost`.
///
/// The newcomer starts at a fraction of the weakest incumbent's
/// effectiveness and takes [`ENTRY_SIPHON`] from the top earner when that
/// product earns more than the siphon amount. Returns the
/// product name, or `None` if the owner or market is missing.
pub fn enter_market<R: Rng + ?Sized>(
    world: &mut World,
    owner: &str,
    market: &str,
    cost: f64,
    staffing: PerDepartment<u32>,
    product_name: Option<String>,
    rng: &mut R,
) -> Option<String> {
    world.market(market)?;
    world.company(owner)?;

    let mut product = Product::new(owner, market);
    product.assigned = staffing;
    if let Some(weakest) = world.weakest_effectiveness(market) {
        product.effectiveness = (weakest * ENTRY_EFFECTIVENESS_SHARE).max(0.0);
    }
    if let Some(top) = world.top_earner(market) {
        if let Some(incumbent) = world.product_mut(&top) {
            if incumbent.revenue > ENTRY_SIPHON {
                incumbent.revenue -= ENTRY_SIPHON;
                product.revenue = ENTRY_SIPHON;
            }
        }
    }

    let name = match product_name {
        Some(name) => {
            world.names.reserve(name.clone());
            name
        }
        None => world.names.product_name(rng),
    };
    let company = world.company_mut(owner)?;
    company.cash -= cost;
    company.products.insert(name.clone(), product);
    debug!(owner, market, product = %name, cost, "entered market");
    Some(name)
}

/// Pick one unoccupied market and enter it if the policy gates allow.
pub fn open_new_product<R: Rng + ?Sized>(
    world: &mut World,
    name: &str,
    policy: &TierPolicy,
    profit: f64,
    rng: &mut R,
) -> ProductOutcome {
    let Some(company) = world.company(name) else {
        return ProductOutcome::NoOpenMarket;
    };
    let open: Vec<(String, f64)> = world
        .markets
        .iter()
        .filter(|m| !company.has_product_in(&m.name))
        .map(|m| (m.name.clone(), m.size))
        .collect();
    let Some((market, size)) = open.choose(rng).cloned() else {
        return ProductOutcome::NoOpenMarket;
    };
    let cost = entry_cost(size);
    let cash = company.cash;
    if profit <= 0.0 {
        return ProductOutcome::SkippedUnprofitable;
    }
    if cash <= cost * policy.entry_cost_multiple {
        return ProductOutcome::SkippedCashBuffer;
    }
    if cost >= cash * policy.entry_cash_fraction || cash < cost {
        return ProductOutcome::SkippedCostFraction;
    }
    match enter_market(world, name, &market, cost, PerDepartment::new(2, 1, 2), None, rng) {
        Some(product) => ProductOutcome::Launched {
            product,
            market,
            cost,
        },
        None => ProductOutcome::NoOpenMarket,
    }
}

/// Queue at most one acquisition of a competitor holding a strong product
/// in a market where this company is weak.
pub fn seek_acquisition(
    world: &mut World,
    name: &str,
    policy: &TierPolicy,
    config: &AiConfig,
) -> AcquisitionOutcome {
    if policy.acquisition_own_ranks.is_empty() {
        return AcquisitionOutcome::Disabled;
    }
    let turn = i64::from(world.turn);
    let (target, price) = match find_acquisition_target(world, name, policy, config, turn) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    world.pending_acquisitions.push(PendingAcquisition {
        acquirer: name.to_string(),
        target: target.clone(),
        price,
        turn_submitted: world.turn,
    });
    if let Some(c) = world.company_mut(name) {
        c.last_acquisition_quarter = turn;
    }
    AcquisitionOutcome::Queued { target, price }
}

fn find_acquisition_target(
    world: &World,
    name: &str,
    policy: &TierPolicy,
    config: &AiConfig,
    turn: i64,
) -> Result<(String, f64), AcquisitionOutcome> {
    let company = world.company(name).ok_or(AcquisitionOutcome::NoTarget)?;
    if turn < i64::from(config.acquisition_min_turn)
        || turn - company.last_acquisition_quarter < i64::from(config.acquisition_cooldown)
    {
        return Err(AcquisitionOutcome::SkippedCooldown);
    }

    let mut saw_weak = false;
    let mut saw_target = false;
    for (product_name, product) in &company.products {
        let own = ProductKey::owned(name, product_name.as_str());
        let weak = world
            .quality_rank(&own)
            .map_or(false, |r| policy.acquisition_own_ranks.contains(&r));
        if !weak {
            continue;
        }
        saw_weak = true;
        for (key, _) in world.products_in_market(&product.market) {
            let Some(owner) = key.owner() else { continue };
            if owner == name || world.ai_index(owner).is_none() {
                continue;
            }
            if !matches!(
                world.quality_rank(&key),
                Some(QualityRank::Good | QualityRank::VeryGood)
            ) {
                continue;
            }
            let Some(target) = world.company(owner) else { continue };
            saw_target = true;
            let price = acquisition_price(target);
            if company.cash >= price {
                return Ok((target.name.clone(), price));
            }
        }
    }
    Err(if !saw_weak {
        AcquisitionOutcome::NoWeakProduct
    } else if saw_target {
        AcquisitionOutcome::SkippedInsufficientCash
    } else {
        AcquisitionOutcome::NoTarget
    })
}

/// Competitor-feed line for an outcome worth reporting.
pub(crate) fn staffing_headline(company: &str, outcome: &StaffingOutcome) -> Option<String> {
    match outcome {
        StaffingOutcome::Hire(HireOutcome::Hired(n)) => Some(format!("{company} hires {n} new employees.")),
        StaffingOutcome::Fire(FireOutcome::Fired(d)) => Some(if d.released > 0 {
            format!(
                "{company} fired {} employees ({} severance) and released {} over campus capacity.",
                d.severed,
                money(d.severance_paid),
                d.released
            )
        } else {
            format!(
                "{company} fired {} employees, incurring {} in severance costs.",
                d.severed,
                money(d.severance_paid)
            )
        }),
        _ => None,
    }
}

pub(crate) fn campus_headline(company: &str, outcome: &CampusOutcome) -> Option<String> {
    match outcome {
        CampusOutcome::Built { label, cost } => Some(format!(
            "{company} built a new campus: {label} for {}.",
            money(*cost)
        )),
        _ => None,
    }
}

pub(crate) fn loan_headline(company: &str, outcome: &LoanOutcome) -> Option<String> {
    match outcome {
        LoanOutcome::Drawn {
            amount,
            annual_rate,
        } => Some(format!(
            "{company} took a loan of {} at {:.1}% interest.",
            money(*amount),
            annual_rate * 100.0
        )),
        _ => None,
    }
}

pub(crate) fn product_headline(company: &str, outcome: &ProductOutcome) -> Option<String> {
    match outcome {
        ProductOutcome::Launched { market, cost, .. } => Some(format!(
            "{company} opened a new product in {market} for {}.",
            money(*cost)
        )),
        _ => None,
    }
}

pub(crate) fn acquisition_headline(company: &str, outcome: &AcquisitionOutcome) -> Option<String> {
    match outcome {
        AcquisitionOutcome::Queued { target, .. } => {
            Some(format!("{company} initiates acquisition of {target}!"))
        }
        _ => None,
    }
}

pub(crate) fn bond_headline(company: &str, outcome: &BondOutcome) -> Option<String> {
    match outcome {
        BondOutcome::Bought {
            amount,
            annual_rate,
            term_quarters,
        } => Some(format!(
            "{company} purchased a {term_quarters}-quarter bond at {:.1}% for {}.",
            annual_rate * 100.0,
            money(*amount)
        )),
        _ => None,
    }
}
