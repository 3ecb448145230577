//! Per-tier AI policy table.
//!
//! Every tier runs the same decision sequence; the records here supply the
//! numbers and the few rule variants that differ between tiers.

use serde::{Deserialize, Serialize};
use sim_core::{Campus, Company, QualityRank, Tier};

/// When a company goes looking for a loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoanTrigger {
    /// Liquidity below `ratio`. Emergency draws take the whole headroom.
    LiquidityBelow { ratio: f64, emergency: bool },
    /// Negative cash, or low liquidity after several negative quarters.
    Distressed {
        liquidity_below: f64,
        min_negative_quarters: u32,
    },
    /// Cash below a share of market cap while liquidity is low.
    CashBelowMarketCapShare { share: f64, liquidity_below: f64 },
}

impl LoanTrigger {
    /// `Some(emergency)` when a loan should be sought.
    pub fn evaluate(&self, company: &Company, liquidity: f64) -> Option<bool> {
        match *self {
            LoanTrigger::LiquidityBelow { ratio, emergency } => {
                (liquidity < ratio).then_some(emergency)
            }
            LoanTrigger::Distressed {
                liquidity_below,
                min_negative_quarters,
            } => (company.cash < 0.0
                || (liquidity < liquidity_below
                    && company.negative_cash_quarters >= min_negative_quarters))
                .then_some(false),
            LoanTrigger::CashBelowMarketCapShare {
                share,
                liquidity_below,
            } => (company.cash < company.market_cap * share && liquidity < liquidity_below)
                .then_some(false),
        }
    }
}

/// Which affordable campus a tier builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampusPick {
    CheapestButOne,
    SecondPriciest,
    Priciest,
}

impl CampusPick {
    /// `affordable` must be sorted by ascending cost.
    pub fn select<'a>(self, affordable: &[&'a Campus]) -> Option<&'a Campus> {
        let last = affordable.len().checked_sub(1)?;
        let idx = match self {
            CampusPick::CheapestButOne => last.min(1),
            CampusPick::SecondPriciest => last.saturating_sub(1),
            CampusPick::Priciest => last,
        };
        affordable.get(idx).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BondPolicy {
    /// Cash must exceed this multiple of quarterly revenue.
    pub cash_revenue_multiple: f64,
    pub cash_floor: f64,
    /// Chance per eligible quarter of buying.
    pub probability: f64,
    pub term_quarters: u32,
    pub annual_rate: f64,
}

/// Numbers governing one tier's quarterly decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Target employee cost as a share of quarterly revenue.
    pub target_cost_ratio: f64,
    /// Hiring needs cash above this multiple of quarterly revenue.
    pub hire_cash_revenue_multiple: f64,
    /// Unprofitable companies fire once headcount exceeds target by this factor.
    pub fire_threshold: f64,
    /// Expand when free capacity falls under this share of total capacity.
    pub campus_trigger: f64,
    pub campus_cash_floor: f64,
    pub campus_pick: CampusPick,
    pub loan_trigger: LoanTrigger,
    /// Cash must exceed this multiple of a market's entry cost.
    pub entry_cost_multiple: f64,
    /// Entry cost must be below this share of cash.
    pub entry_cash_fraction: f64,
    /// Own-product ranks that justify an acquisition; empty disables them.
    pub acquisition_own_ranks: Vec<QualityRank>,
    pub bond: BondPolicy,
}

impl TierPolicy {
    pub fn startup() -> Self {
        Self {
            target_cost_ratio: 0.8,
            hire_cash_revenue_multiple: 1.0,
            fire_threshold: 1.2,
            campus_trigger: 0.15,
            campus_cash_floor: 250_000.0,
            campus_pick: CampusPick::CheapestButOne,
            loan_trigger: LoanTrigger::LiquidityBelow {
                ratio: 0.5,
                emergency: true,
            },
            entry_cost_multiple: 1.75,
            entry_cash_fraction: 0.25,
            acquisition_own_ranks: Vec::new(),
            bond: BondPolicy {
                cash_revenue_multiple: 1.5,
                cash_floor: 500_000.0,
                probability: 0.05,
                term_quarters: 2,
                annual_rate: 0.06,
            },
        }
    }

    pub fn medium() -> Self {
        Self {
            target_cost_ratio: 0.6,
            hire_cash_revenue_multiple: 2.0,
            fire_threshold: 1.15,
            campus_trigger: 0.20,
            campus_cash_floor: 1_000_000.0,
            campus_pick: CampusPick::CheapestButOne,
            loan_trigger: LoanTrigger::LiquidityBelow {
                ratio: 0.6,
                emergency: false,
            },
            entry_cost_multiple: 2.0,
            entry_cash_fraction: 0.25,
            acquisition_own_ranks: vec![QualityRank::VeryBad, QualityRank::Bad],
            bond: BondPolicy {
                cash_revenue_multiple: 1.5,
                cash_floor: 1_000_000.0,
                probability: 0.15,
                term_quarters: 4,
                annual_rate: 0.07,
            },
        }
    }

    pub fn large() -> Self {
        Self {
            target_cost_ratio: 0.5,
            hire_cash_revenue_multiple: 3.0,
            fire_threshold: 1.10,
            campus_trigger: 0.25,
            campus_cash_floor: 5_000_000.0,
            campus_pick: CampusPick::SecondPriciest,
            loan_trigger: LoanTrigger::Distressed {
                liquidity_below: 0.7,
                min_negative_quarters: 2,
            },
            entry_cost_multiple: 3.0,
            entry_cash_fraction: 0.20,
            acquisition_own_ranks: vec![QualityRank::VeryBad, QualityRank::Bad],
            bond: BondPolicy {
                cash_revenue_multiple: 2.0,
                cash_floor: 5_000_000.0,
                probability: 0.20,
                term_quarters: 4,
                annual_rate: 0.07,
            },
        }
    }

    pub fn big_tech() -> Self {
        Self {
            target_cost_ratio: 0.4,
            hire_cash_revenue_multiple: 4.0,
            fire_threshold: 1.05,
            campus_trigger: 0.30,
            campus_cash_floor: 10_000_000.0,
            campus_pick: CampusPick::Priciest,
            loan_trigger: LoanTrigger::CashBelowMarketCapShare {
                share: 0.1,
                liquidity_below: 0.8,
            },
            entry_cost_multiple: 4.0,
            entry_cash_fraction: 0.30,
            acquisition_own_ranks: vec![
                QualityRank::VeryBad,
                QualityRank::Bad,
                QualityRank::Moderate,
            ],
            bond: BondPolicy {
                cash_revenue_multiple: 2.5,
                cash_floor: 10_000_000.0,
                probability: 0.15,
                term_quarters: 8,
                annual_rate: 0.08,
            },
        }
    }
}

/// AI configuration: one policy per tier plus shared rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub startup: TierPolicy,
    pub medium: TierPolicy,
    pub large: TierPolicy,
    pub big_tech: TierPolicy,
    /// No acquisitions before this turn.
    pub acquisition_min_turn: u32,
    /// Turns between acquisition attempts by the same company.
    pub acquisition_cooldown: u32,
    /// Share of cash put into a bond purchase.
    pub bond_investment_share: f64,
    pub min_bond_investment: f64,
    pub min_loan: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            startup: TierPolicy::startup(),
            medium: TierPolicy::medium(),
            large: TierPolicy::large(),
            big_tech: TierPolicy::big_tech(),
            acquisition_min_turn: 12,
            acquisition_cooldown: 5,
            bond_investment_share: 0.25,
            min_bond_investment: 100_000.0,
            min_loan: 100_000.0,
        }
    }
}

impl AiConfig {
    pub fn policy(&self, tier: Tier) -> &TierPolicy {
        match tier {
            Tier::Startup => &self.startup,
            Tier::Medium => &self.medium,
            Tier::Large => &self.large,
            Tier::BigTech => &self.big_tech,
        }
    }
}
