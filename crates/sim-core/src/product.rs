//! Products: one company's offering in one market.

use crate::department::{Department, PerDepartment};
use crate::EMPLOYEE_COST_PER_QUARTER;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Owner name carried by a market's imaginary seed product.
pub const SEED_PRODUCT_OWNER: &str = "Initial Market Revenue";

/// How many quarter-over-quarter growth figures a product remembers.
pub const GROWTH_HISTORY_LEN: usize = 4;

/// A product competing for revenue in a single market.
///
/// `owner` and `market` are name references; the owning [`crate::Company`]
/// holds the product in its map, markets never do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Name of the owning company.
    pub owner: String,
    /// Name of the market the product competes in.
    pub market: String,
    /// Employees assigned per department.
    pub assigned: PerDepartment<u32>,
    /// Exponentially smoothed dollar spend per department.
    pub effective_spend: PerDepartment<f64>,
    /// Weighted smoothed spend divided by current revenue.
    pub effectiveness: f64,
    /// Revenue earned this quarter.
    pub revenue: f64,
    /// Most recent quarter-over-quarter growth percentages, oldest first.
    pub recent_growth: VecDeque<f64>,
}

impl Product {
    pub fn new(owner: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            market: market.into(),
            assigned: PerDepartment::default(),
            effective_spend: PerDepartment::default(),
            effectiveness: 0.0,
            revenue: 0.0,
            recent_growth: VecDeque::with_capacity(GROWTH_HISTORY_LEN),
        }
    }

    /// Builder: set the initial staffing.
    pub fn with_staff(mut self, research: u32, quality_assurance: u32, marketing: u32) -> Self {
        self.assigned = PerDepartment::new(research, quality_assurance, marketing);
        self
    }

    /// Builder: set the current revenue.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    /// The imaginary product that carries a spawned market's initial revenue.
    pub fn market_seed(market: impl Into<String>, revenue: f64) -> Self {
        Self::new(SEED_PRODUCT_OWNER, market).with_revenue(revenue)
    }

    pub fn assigned_total(&self) -> u32 {
        self.assigned.total()
    }

    /// Dollar spend of a department this quarter.
    pub fn department_spend(&self, dept: Department) -> f64 {
        f64::from(self.assigned[dept]) * EMPLOYEE_COST_PER_QUARTER
    }

    pub fn total_spend(&self) -> f64 {
        Department::ALL
            .iter()
            .map(|&d| self.department_spend(d))
            .sum()
    }

    /// Next smoothed spend for a department: `prev + (actual - prev) / delay`.
    pub fn smoothed_spend(&self, dept: Department) -> f64 {
        let prev = self.effective_spend[dept];
        prev + (self.department_spend(dept) - prev) / dept.smoothing_delay()
    }

    pub fn update_effective_spend(&mut self) {
        for dept in Department::ALL {
            self.effective_spend[dept] = self.smoothed_spend(dept);
        }
    }

    /// Recompute effectiveness from smoothed spend and current revenue.
    /// Revenue below one dollar is treated as one dollar.
    pub fn update_effectiveness(&mut self) {
        let denom = self.revenue.max(1.0);
        let weighted: f64 = Department::ALL
            .iter()
            .map(|&d| d.spend_weight() * self.effective_spend[d])
            .sum();
        self.effectiveness = weighted / denom;
    }

    /// Remember a growth percentage, dropping the oldest past the window.
    pub fn record_growth(&mut self, pct: f64) {
        self.recent_growth.push_back(pct);
        while self.recent_growth.len() > GROWTH_HISTORY_LEN {
            self.recent_growth.pop_front();
        }
    }

    pub fn last_growth(&self) -> Option<f64> {
        self.recent_growth.back().copied()
    }

    pub fn is_market_seed(&self) -> bool {
        self.owner == SEED_PRODUCT_OWNER
    }
}
