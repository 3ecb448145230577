//! Companies and their balance-sheet arithmetic.

use crate::campus::Campus;
use crate::instruments::{Bond, Loan};
use crate::product::Product;
use crate::{EMPLOYEE_COST_PER_QUARTER, SEVERANCE_PER_EMPLOYEE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Consecutive negative-cash quarters after which a company is bankrupt.
pub const BANKRUPTCY_QUARTERS: u32 = 4;
/// Credit limit as a share of annualized revenue.
pub const LOAN_REVENUE_SHARE: f64 = 0.40;
pub const LOAN_BASE_RATE: f64 = 0.09;
/// Added to the base rate for every loan already outstanding.
pub const LOAN_RATE_STEP: f64 = 0.01;
pub const LOAN_TERM_MONTHS: i32 = 60;

/// AI size and strategy class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Startup,
    Medium,
    Large,
    BigTech,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Startup, Tier::Medium, Tier::Large, Tier::BigTech];

    pub const fn label(self) -> &'static str {
        match self {
            Tier::Startup => "Startup",
            Tier::Medium => "Medium",
            Tier::Large => "Large",
            Tier::BigTech => "Big Tech",
        }
    }

    /// Relative weight used when splitting a market's opening revenue.
    pub const fn share_weight(self) -> f64 {
        match self {
            Tier::Startup => 1.0,
            Tier::Medium => 2.0,
            Tier::Large => 4.0,
            Tier::BigTech => 8.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-length window of recent quarterly figures, oldest dropped first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollingWindow(VecDeque<f64>);

impl RollingWindow {
    pub const LEN: usize = 3;

    /// A full window of zero quarters, so early averages divide by `LEN`.
    pub fn zeroed() -> Self {
        Self(VecDeque::from(vec![0.0; Self::LEN]))
    }

    pub fn push(&mut self, value: f64) {
        self.0.push_back(value);
        while self.0.len() > Self::LEN {
            self.0.pop_front();
        }
    }

    pub fn average(&self) -> Option<f64> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.iter().sum::<f64>() / self.0.len() as f64)
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.0.back().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

/// What a headcount reduction actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Downsizing {
    /// Product assignments released before anyone left.
    pub unassigned: u32,
    /// Employees let go with severance.
    pub severed: u32,
    /// Over-capacity employees let go without severance.
    pub released: u32,
    pub severance_paid: f64,
}

impl Downsizing {
    pub fn departed(&self) -> u32 {
        self.severed + self.released
    }
}

/// A company, AI-controlled or the player's.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// AI policy class; `None` for the player.
    pub tier: Option<Tier>,
    pub cash: f64,
    pub employees: u32,
    /// Products keyed by globally unique product name.
    pub products: BTreeMap<String, Product>,
    pub loans: Vec<Loan>,
    pub bonds: Vec<Bond>,
    pub campuses: Vec<Campus>,
    pub market_cap: f64,
    pub past_quarter_profits: RollingWindow,
    pub past_quarter_revenues: RollingWindow,
    pub negative_cash_quarters: u32,
    pub last_acquisition_quarter: i64,
}

impl Company {
    pub fn new(name: impl Into<String>, tier: Option<Tier>, cash: f64, employees: u32) -> Self {
        Self {
            name: name.into(),
            tier,
            cash,
            employees,
            products: BTreeMap::new(),
            loans: Vec::new(),
            bonds: Vec::new(),
            campuses: Vec::new(),
            market_cap: 0.0,
            past_quarter_profits: RollingWindow::zeroed(),
            past_quarter_revenues: RollingWindow::zeroed(),
            negative_cash_quarters: 0,
            last_acquisition_quarter: -100,
        }
    }

    pub fn with_campus(mut self, campus: Campus) -> Self {
        self.campuses.push(campus);
        self
    }

    pub fn with_product(mut self, name: impl Into<String>, product: Product) -> Self {
        self.products.insert(name.into(), product);
        self
    }

    pub fn is_player(&self) -> bool {
        self.tier.is_none()
    }

    pub fn employee_capacity(&self) -> u32 {
        self.campuses.iter().map(|c| c.capacity).sum()
    }

    /// Highest overhead fraction among owned campuses.
    pub fn overhead_rate(&self) -> f64 {
        self.campuses
            .iter()
            .map(|c| c.overhead)
            .fold(0.0, f64::max)
    }

    pub fn total_revenue(&self) -> f64 {
        self.products.values().map(|p| p.revenue).sum()
    }

    pub fn base_employee_cost(&self) -> f64 {
        f64::from(self.employees) * EMPLOYEE_COST_PER_QUARTER
    }

    /// Employee cost plus campus overhead.
    pub fn operating_costs(&self) -> f64 {
        let base = self.base_employee_cost();
        base + base * self.overhead_rate()
    }

    pub fn quarterly_debt_service(&self) -> f64 {
        self.loans.iter().map(Loan::quarterly_payment).sum()
    }

    /// Revenue minus operating costs and scheduled debt service.
    pub fn quarterly_profit(&self) -> f64 {
        self.total_revenue() - (self.operating_costs() + self.quarterly_debt_service())
    }

    /// Advance or reset the consecutive negative-cash counter.
    pub fn update_negative_cash_quarters(&mut self) {
        if self.cash < 0.0 {
            self.negative_cash_quarters += 1;
        } else {
            self.negative_cash_quarters = 0;
        }
    }

    pub fn is_bankrupt(&self) -> bool {
        self.negative_cash_quarters >= BANKRUPTCY_QUARTERS
    }

    pub fn bond_principal(&self) -> f64 {
        self.bonds.iter().map(|b| b.principal).sum()
    }

    pub fn loan_principal(&self) -> f64 {
        self.loans.iter().map(|l| l.principal).sum()
    }

    pub fn campus_book_value(&self) -> f64 {
        self.campuses.iter().map(|c| c.cost).sum()
    }

    /// Cash plus campuses plus bonds, less outstanding loan principal.
    pub fn net_assets(&self) -> f64 {
        self.cash + self.campus_book_value() + self.bond_principal() - self.loan_principal()
    }

    /// Cash plus bonds, less outstanding loan principal. Campuses excluded.
    pub fn liquid_net_assets(&self) -> f64 {
        self.cash + self.bond_principal() - self.loan_principal()
    }

    /// Mean of the revenue window. New companies start with three zero
    /// quarters; an emptied window falls back to this quarter's revenue.
    pub fn average_revenue(&self) -> f64 {
        self.past_quarter_revenues
            .average()
            .unwrap_or_else(|| self.total_revenue())
    }

    pub fn annualized_revenue(&self) -> f64 {
        self.average_revenue() * 4.0
    }

    pub fn recompute_market_cap(&mut self) -> f64 {
        self.market_cap = (self.net_assets() + self.annualized_revenue()).max(0.0);
        self.market_cap
    }

    /// Cash over this quarter's revenue; 10.0 when there is no revenue.
    pub fn liquidity_ratio(&self) -> f64 {
        let revenue = self.total_revenue();
        if revenue > 0.0 {
            self.cash / revenue
        } else {
            10.0
        }
    }

    /// Remaining credit: a share of annualized revenue less existing principal.
    pub fn loan_headroom(&self) -> f64 {
        LOAN_REVENUE_SHARE * self.annualized_revenue() - self.loan_principal()
    }

    pub fn next_loan_rate(&self) -> f64 {
        LOAN_BASE_RATE + LOAN_RATE_STEP * self.loans.len() as f64
    }

    /// Originate a loan at the company's next rate and credit the cash.
    pub fn draw_loan(&mut self, amount: f64) -> &Loan {
        let loan = Loan::new(amount, self.next_loan_rate(), LOAN_TERM_MONTHS);
        self.cash += amount;
        self.loans.push(loan);
        &self.loans[self.loans.len() - 1]
    }

    pub fn buy_bond(&mut self, amount: f64, annual_rate: f64, term_quarters: u32) {
        self.cash -= amount;
        self.bonds.push(Bond::new(amount, annual_rate, term_quarters));
    }

    /// Cash in every bond at principal, forfeiting accrued interest.
    pub fn liquidate_bonds(&mut self) -> f64 {
        let proceeds: f64 = self.bonds.drain(..).map(|b| b.principal).sum();
        self.cash += proceeds;
        proceeds
    }

    pub fn build_campus(&mut self, campus: Campus) {
        self.cash -= campus.cost;
        self.campuses.push(campus);
    }

    pub fn record_quarter(&mut self, revenue: f64, profit: f64) {
        self.past_quarter_revenues.push(revenue);
        self.past_quarter_profits.push(profit);
    }

    pub fn assigned_total(&self) -> u32 {
        self.products.values().map(Product::assigned_total).sum()
    }

    pub fn unassigned(&self) -> u32 {
        self.employees.saturating_sub(self.assigned_total())
    }

    pub fn has_product_in(&self, market: &str) -> bool {
        self.products.values().any(|p| p.market == market)
    }

    /// Reduce headcount toward `target`.
    ///
    /// Assignments above the target are released first, starting with the
    /// least effective product and the lowest priority department. Departing
    /// employees cost severance; whoever is still beyond campus capacity
    /// afterwards leaves without it.
    pub fn downsize(&mut self, target: u32) -> Downsizing {
        let mut outcome = Downsizing::default();
        let excess = self.employees.saturating_sub(target);
        if excess == 0 {
            return outcome;
        }

        let mut to_release = self.assigned_total().saturating_sub(target);
        let mut weakest_first: Vec<&mut Product> = self.products.values_mut().collect();
        weakest_first.sort_by(|a, b| a.effectiveness.total_cmp(&b.effectiveness));
        'products: for product in weakest_first {
            for dept in crate::Department::RELEASE_ORDER {
                if to_release == 0 {
                    break 'products;
                }
                let take = product.assigned[dept].min(to_release);
                product.assigned[dept] -= take;
                to_release -= take;
                outcome.unassigned += take;
            }
        }

        let affordable = (self.cash.max(0.0) / SEVERANCE_PER_EMPLOYEE).floor() as u32;
        outcome.severed = excess.min(affordable);
        outcome.severance_paid = f64::from(outcome.severed) * SEVERANCE_PER_EMPLOYEE;
        self.cash -= outcome.severance_paid;
        self.employees -= outcome.severed;

        outcome.released = self.employees.saturating_sub(self.employee_capacity());
        self.employees -= outcome.released;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn startup() -> Company {
        Company::new("Acme", Some(Tier::Startup), 100_000.0, 8)
            .with_campus(Campus::garage())
            .with_product("Widget", Product::new("Acme", "Cloud").with_staff(2, 2, 2))
    }

    #[test]
    fn bankruptcy_needs_consecutive_quarters() {
        let mut c = startup();
        c.cash = -1.0;
        for _ in 0..3 {
            c.update_negative_cash_quarters();
        }
        assert!(!c.is_bankrupt());
        c.cash = 5.0;
        c.update_negative_cash_quarters();
        assert_eq!(c.negative_cash_quarters, 0);
        c.cash = -1.0;
        for _ in 0..4 {
            c.update_negative_cash_quarters();
        }
        assert!(c.is_bankrupt());
    }

    #[test]
    fn overhead_uses_highest_campus_rate() {
        let c = startup()
            .with_campus(Campus::new("Small Office", 250_000.0, 0.02, 50))
            .with_campus(Campus::new("Annex", 10.0, 0.01, 5));
        assert_eq!(c.overhead_rate(), 0.02);
        assert!((c.operating_costs() - 8.0 * 25_000.0 * 1.02).abs() < 1e-6);
    }

    #[test]
    fn market_cap_is_floored() {
        let mut c = startup();
        c.cash = 10_000.0;
        c.loans.push(Loan::new(500_000.0, 0.09, 60));
        assert_eq!(c.recompute_market_cap(), 0.0);
    }

    #[test]
    fn revenue_window_starts_with_three_empty_quarters() {
        let mut c = startup();
        assert_eq!(c.past_quarter_revenues.len(), RollingWindow::LEN);
        assert_eq!(c.average_revenue(), 0.0);
        c.record_quarter(90_000.0, 0.0);
        assert!((c.average_revenue() - 30_000.0).abs() < 1e-9);
        assert!((c.annualized_revenue() - 120_000.0).abs() < 1e-9);
        assert!((c.loan_headroom() - 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn loan_rate_steps_with_count() {
        let mut c = startup();
        c.draw_loan(100_000.0);
        c.draw_loan(100_000.0);
        assert!((c.loans[1].annual_rate - 0.10).abs() < 1e-12);
        assert_eq!(c.cash, 300_000.0);
    }

    #[test]
    fn downsize_releases_marketing_first_and_pays_severance() {
        let mut c = startup();
        let out = c.downsize(5);
        assert_eq!(out.unassigned, 1);
        assert_eq!(c.products["Widget"].assigned.marketing, 1);
        assert_eq!(out.severed, 3);
        assert_eq!(c.employees, 5);
        assert_eq!(c.cash, 40_000.0);
    }

    #[test]
    fn downsize_without_cash_only_sheds_over_capacity() {
        let mut c = startup();
        c.employees = 14;
        c.cash = 20_000.0;
        let out = c.downsize(6);
        assert_eq!(out.severed, 1);
        assert_eq!(out.released, 3);
        assert_eq!(c.employees, 10);
        assert_eq!(c.cash, 0.0);
    }
}
