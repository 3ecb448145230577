//! Core domain model for the Technopoly simulation.
//!
//! Serializable entities (markets, products, companies, loans, bonds,
//! campuses), the [`World`] state every phase mutates, and validation
//! helpers guarding configuration and world invariants.

pub mod campus;
pub mod company;
pub mod config;
pub mod date;
pub mod department;
pub mod instruments;
pub mod market;
pub mod names;
pub mod news;
pub mod product;
pub mod world;

pub use campus::{Campus, CampusCatalog};
pub use company::{Company, Downsizing, RollingWindow, Tier};
pub use config::SimConfig;
pub use date::GameDate;
pub use department::{Department, PerDepartment};
pub use instruments::{Bond, BondSettlement, Loan};
pub use market::{GrowthCategory, Market};
pub use names::NameGenerator;
pub use news::NewsFeed;
pub use product::Product;
pub use world::{merge_companies, MergeSummary, PendingAcquisition, ProductKey, QualityRank, World};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Quarterly cost of one employee in USD.
pub const EMPLOYEE_COST_PER_QUARTER: f64 = 25_000.0;
/// One-off cost of letting an employee go.
pub const SEVERANCE_PER_EMPLOYEE: f64 = 20_000.0;

/// Deterministic RNG shared by all phases.
pub type SimRng = ChaCha8Rng;

pub fn rng_from_seed(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Convert a simulated dollar amount to a cent-rounded [`Decimal`] for
/// reporting. Non-finite input maps to zero.
pub fn usd(amount: f64) -> Decimal {
    Decimal::from_f64(amount)
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

/// Validation errors for configuration and world invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    /// Money or size must be non-negative.
    #[error("negative value in {0}")]
    Negative(&'static str),
    /// Names must not be blank.
    #[error("empty name")]
    EmptyName,
    /// Duplicate company or market name.
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    /// Probability or share outside [0, 1].
    #[error("{0} must be within [0,1]")]
    OutOfUnitRange(&'static str),
    /// Campus types must hold at least one employee.
    #[error("campus {0} has zero capacity")]
    ZeroCapacity(String),
    /// Cadence values must be at least one turn.
    #[error("{0} must be at least 1")]
    ZeroInterval(&'static str),
    /// A product points at a market that does not exist.
    #[error("product {product} references unknown market {market}")]
    UnknownMarket { product: String, market: String },
    /// A company has more employees assigned than it employs.
    #[error("company {0} assigns more employees than it has")]
    OverAssigned(String),
}

fn finite(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

fn non_negative(value: f64, field: &'static str) -> Result<(), ValidationError> {
    finite(value, field)?;
    if value < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

/// Validate a campus catalog entry.
pub fn validate_campus(c: &Campus) -> Result<(), ValidationError> {
    if c.label.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    non_negative(c.cost, "campus cost")?;
    if !(0.0..=1.0).contains(&c.overhead) {
        return Err(ValidationError::OutOfUnitRange("campus overhead"));
    }
    if c.capacity == 0 {
        return Err(ValidationError::ZeroCapacity(c.label.clone()));
    }
    Ok(())
}

/// Validate simulation configuration.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    for (value, field) in [
        (cfg.ai_spawn_interval, "ai_spawn_interval"),
        (cfg.market_spawn_interval, "market_spawn_interval"),
        (cfg.growth_reroll_interval, "growth_reroll_interval"),
    ] {
        if value == 0 {
            return Err(ValidationError::ZeroInterval(field));
        }
    }
    finite(cfg.victory_share, "victory_share")?;
    if !(0.0..=1.0).contains(&cfg.victory_share) {
        return Err(ValidationError::OutOfUnitRange("victory_share"));
    }
    if cfg.player_name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    non_negative(cfg.player_starting_cash, "player_starting_cash")?;
    for c in cfg.campus_catalog.entries() {
        validate_campus(c)?;
    }
    Ok(())
}

/// Validate a market.
pub fn validate_market(m: &Market) -> Result<(), ValidationError> {
    if m.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    non_negative(m.size, "market size")?;
    finite(m.growth_rate, "growth rate")?;
    finite(m.base_growth_rate, "base growth rate")?;
    Ok(())
}

/// Validate the world, including cross-references from products to markets.
pub fn validate_world(world: &World) -> Result<(), ValidationError> {
    let mut market_names = std::collections::BTreeSet::new();
    for m in &world.markets {
        validate_market(m)?;
        if !market_names.insert(m.name.as_str()) {
            return Err(ValidationError::DuplicateName(m.name.clone()));
        }
    }
    let mut company_names = std::collections::BTreeSet::new();
    for c in world.companies() {
        if c.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !company_names.insert(c.name.as_str()) {
            return Err(ValidationError::DuplicateName(c.name.clone()));
        }
        finite(c.cash, "company cash")?;
        if c.assigned_total() > c.employees {
            return Err(ValidationError::OverAssigned(c.name.clone()));
        }
        for (name, p) in &c.products {
            non_negative(p.revenue, "product revenue")?;
            if !market_names.contains(p.market.as_str()) {
                return Err(ValidationError::UnknownMarket {
                    product: name.clone(),
                    market: p.market.clone(),
                });
            }
        }
    }
    Ok(())
}
