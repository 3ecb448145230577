//! Actions the driver takes on behalf of the player.
//!
//! Every operation checks affordability and limits up front and leaves the
//! world untouched when it fails.

use crate::engine::Engine;
use crate::snapshot::QuarterSnapshot;
use sim_ai::actions::money;
use sim_ai::{enter_market, entry_cost};
use sim_core::{
    Department, Loan, PendingAcquisition, PerDepartment, EMPLOYEE_COST_PER_QUARTER,
    SEVERANCE_PER_EMPLOYEE,
};
use sim_econ::acquisition_price;
use thiserror::Error;
use tracing::{info, warn};

/// Bond terms on offer, in quarters, with their annual rate.
pub const BOND_OFFERS: [(u32, f64); 3] = [(2, 0.06), (4, 0.07), (8, 0.08)];

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("no AI company named {0}")]
    UnknownCompany(String),
    #[error("no market named {0}")]
    UnknownMarket(String),
    #[error("no product named {0}")]
    UnknownProduct(String),
    #[error("no campus type named {0}")]
    UnknownCampus(String),
    #[error("insufficient cash: need {needed:.0}, have {available:.0}")]
    InsufficientCash { needed: f64, available: f64 },
    #[error("{requested} employees assigned but only {employees} employed")]
    OverAssigned { requested: u32, employees: u32 },
    #[error("invalid {0}")]
    InvalidAmount(&'static str),
    #[error("already selling in {0}")]
    MarketOccupied(String),
    #[error("campus capacity {capacity} cannot hold {requested} employees")]
    NoCapacity { requested: u32, capacity: u32 },
    #[error("loan of {requested:.0} exceeds available credit {available:.0}")]
    ExceedsCreditLimit { requested: f64, available: f64 },
    #[error("no bond offered for {0} quarters")]
    UnsupportedBondTerm(u32),
    #[error("an acquisition of {0} is already pending")]
    AcquisitionPending(String),
    #[error("initial product already chosen")]
    InitialProductChosen,
    #[error("name {0} is taken")]
    NameTaken(String),
    #[error("empty name")]
    EmptyName,
    #[error("game is over")]
    GameOver,
}

fn reject<T>(action: &'static str, err: ActionError) -> Result<T, ActionError> {
    warn!(action, error = %err, "player action rejected");
    Err(err)
}

fn ensure_funds(action: &'static str, needed: f64, available: f64) -> Result<(), ActionError> {
    if available < needed {
        return reject(action, ActionError::InsufficientCash { needed, available });
    }
    Ok(())
}

fn ensure_positive(action: &'static str, amount: f64, what: &'static str) -> Result<(), ActionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return reject(action, ActionError::InvalidAmount(what));
    }
    Ok(())
}

impl Engine {
    fn ensure_running(&self, action: &'static str) -> Result<(), ActionError> {
        if self.outcome.is_some() {
            return reject(action, ActionError::GameOver);
        }
        Ok(())
    }

    /// Rename the player's company. Products and pending deals follow.
    pub fn rename_player(&mut self, new_name: &str) -> Result<(), ActionError> {
        self.ensure_running("rename")?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return reject("rename", ActionError::EmptyName);
        }
        let old = self.world.player.name.clone();
        if new_name == old {
            return Ok(());
        }
        if self.world.names.is_taken(new_name) {
            return reject("rename", ActionError::NameTaken(new_name.to_string()));
        }

        self.world.names.release(&old);
        self.world.names.reserve(new_name);
        let player = &mut self.world.player;
        player.name = new_name.to_string();
        for p in player.products.values_mut() {
            p.owner = new_name.to_string();
        }
        for deal in &mut self.world.pending_acquisitions {
            if deal.acquirer == old {
                deal.acquirer = new_name.to_string();
            }
        }
        info!(from = %old, to = new_name, "player renamed");
        Ok(())
    }

    /// Open the player's first product, named after its market, and record
    /// the opening snapshot.
    pub fn choose_initial_product(&mut self, market: &str) -> Result<String, ActionError> {
        self.ensure_running("initial product")?;
        if !self.world.player.products.is_empty() {
            return reject("initial product", ActionError::InitialProductChosen);
        }
        if self.world.market(market).is_none() {
            return reject("initial product", ActionError::UnknownMarket(market.to_string()));
        }
        let owner = self.world.player.name.clone();
        let Some(name) = enter_market(
            &mut self.world,
            &owner,
            market,
            0.0,
            PerDepartment::new(0, 0, 0),
            Some(market.to_string()),
            &mut self.rng,
        ) else {
            return reject("initial product", ActionError::UnknownMarket(market.to_string()));
        };
        let turn = self.world.turn;
        self.history.record(QuarterSnapshot::capture(&self.world, turn));
        info!(market, "initial product chosen");
        Ok(name)
    }

    /// Hire `count` employees. Salaries are charged with the quarter's
    /// operating costs; one quarter of pay must be on hand now.
    pub fn hire(&mut self, count: u32) -> Result<u32, ActionError> {
        self.ensure_running("hire")?;
        if count == 0 {
            return reject("hire", ActionError::InvalidAmount("hire count"));
        }
        let player = &self.world.player;
        let requested = player.employees + count;
        let capacity = player.employee_capacity();
        if requested > capacity {
            return reject("hire", ActionError::NoCapacity { requested, capacity });
        }
        ensure_funds("hire", f64::from(count) * EMPLOYEE_COST_PER_QUARTER, player.cash)?;
        self.world.player.employees = requested;
        Ok(requested)
    }

    /// Let `count` employees go, paying severance for each.
    pub fn fire(&mut self, count: u32) -> Result<u32, ActionError> {
        self.ensure_running("fire")?;
        let player = &self.world.player;
        if count == 0 || count > player.employees {
            return reject("fire", ActionError::InvalidAmount("fire count"));
        }
        ensure_funds("fire", f64::from(count) * SEVERANCE_PER_EMPLOYEE, player.cash)?;
        let target = player.employees - count;
        let downsizing = self.world.player.downsize(target);
        Ok(downsizing.departed())
    }

    /// Set the headcount of one department on one product.
    pub fn assign(&mut self, product: &str, dept: Department, count: u32) -> Result<(), ActionError> {
        self.ensure_running("assign")?;
        let player = &self.world.player;
        let Some(current) = player.products.get(product) else {
            return reject("assign", ActionError::UnknownProduct(product.to_string()));
        };
        let requested = player.assigned_total() - current.assigned[dept] + count;
        if requested > player.employees {
            return reject(
                "assign",
                ActionError::OverAssigned {
                    requested,
                    employees: player.employees,
                },
            );
        }
        if let Some(p) = self.world.player.products.get_mut(product) {
            p.assigned[dept] = count;
        }
        Ok(())
    }

    pub fn build_campus(&mut self, label: &str) -> Result<(), ActionError> {
        self.ensure_running("build campus")?;
        let Some(campus) = self.ai.catalog.find(label).cloned() else {
            return reject("build campus", ActionError::UnknownCampus(label.to_string()));
        };
        ensure_funds("build campus", campus.cost, self.world.player.cash)?;
        self.world.player.build_campus(campus);
        info!(campus = label, "player built campus");
        Ok(())
    }

    /// Borrow against revenue, subject to the same credit limit as AI companies.
    pub fn take_loan(&mut self, amount: f64) -> Result<Loan, ActionError> {
        self.ensure_running("loan")?;
        ensure_positive("loan", amount, "loan amount")?;
        let available = self.world.player.loan_headroom();
        if amount > available {
            return reject(
                "loan",
                ActionError::ExceedsCreditLimit {
                    requested: amount,
                    available,
                },
            );
        }
        let loan = self.world.player.draw_loan(amount).clone();
        self.world.news.push(format!(
            "{} took a loan of {} at {:.1}%.",
            self.world.player.name,
            money(amount),
            loan.annual_rate * 100.0
        ));
        Ok(loan)
    }

    /// Buy a bond for one of the terms in [`BOND_OFFERS`].
    pub fn buy_bond(&mut self, amount: f64, term_quarters: u32) -> Result<f64, ActionError> {
        self.ensure_running("bond")?;
        ensure_positive("bond", amount, "bond amount")?;
        let Some(&(_, rate)) = BOND_OFFERS.iter().find(|(term, _)| *term == term_quarters) else {
            return reject("bond", ActionError::UnsupportedBondTerm(term_quarters));
        };
        ensure_funds("bond", amount, self.world.player.cash)?;
        self.world.player.buy_bond(amount, rate, term_quarters);
        Ok(rate)
    }

    /// Offer to buy an AI company. The deal settles next quarter at the
    /// price fixed now. Returns the price.
    pub fn initiate_acquisition(&mut self, target: &str) -> Result<f64, ActionError> {
        self.ensure_running("acquisition")?;
        let Some(idx) = self.world.ai_index(target) else {
            return reject("acquisition", ActionError::UnknownCompany(target.to_string()));
        };
        let player = &self.world.player;
        if let Some(deal) = self
            .world
            .pending_acquisitions
            .iter()
            .find(|d| d.acquirer == player.name)
        {
            return reject("acquisition", ActionError::AcquisitionPending(deal.target.clone()));
        }
        let price = acquisition_price(&self.world.ai_companies[idx]);
        ensure_funds("acquisition", price, player.cash)?;

        let turn = self.world.turn;
        let acquirer = player.name.clone();
        self.world.news.push(format!(
            "{acquirer} offered {} for {target}.",
            money(price)
        ));
        self.world.pending_acquisitions.push(PendingAcquisition {
            acquirer,
            target: target.to_string(),
            price,
            turn_submitted: turn,
        });
        self.world.player.last_acquisition_quarter = i64::from(turn);
        info!(target, price, "player acquisition submitted");
        Ok(price)
    }

    /// Enter a market the player does not yet sell in, paying the entry cost.
    pub fn launch_product(&mut self, market: &str) -> Result<String, ActionError> {
        self.ensure_running("launch product")?;
        let Some(size) = self.world.market(market).map(|m| m.size) else {
            return reject("launch product", ActionError::UnknownMarket(market.to_string()));
        };
        if self.world.player.has_product_in(market) {
            return reject("launch product", ActionError::MarketOccupied(market.to_string()));
        }
        let cost = entry_cost(size);
        ensure_funds("launch product", cost, self.world.player.cash)?;
        let owner = self.world.player.name.clone();
        let Some(name) = enter_market(
            &mut self.world,
            &owner,
            market,
            cost,
            PerDepartment::new(0, 0, 0),
            None,
            &mut self.rng,
        ) else {
            return reject("launch product", ActionError::UnknownMarket(market.to_string()));
        };
        self.world
            .news
            .push(format!("{owner} launched {name} in {market}."));
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::GameOutcome;

    fn engine() -> Engine {
        Engine::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn initial_product_is_named_after_market() {
        let mut e = engine();
        let name = e.choose_initial_product("Cloud Computing").unwrap();
        assert_eq!(name, "Cloud Computing");
        let p = &e.world().player.products["Cloud Computing"];
        assert_eq!(p.assigned_total(), 0);
        assert_eq!(e.history().latest().map(|s| s.turn), Some(0));
        assert_eq!(
            e.choose_initial_product("FinTech"),
            Err(ActionError::InitialProductChosen)
        );
    }

    #[test]
    fn initial_product_needs_known_market() {
        let mut e = engine();
        assert_eq!(
            e.choose_initial_product("Tulips"),
            Err(ActionError::UnknownMarket("Tulips".into()))
        );
        assert!(e.world().player.products.is_empty());
    }

    #[test]
    fn hiring_respects_capacity_and_cash() {
        let mut e = engine();
        assert_eq!(
            e.hire(6),
            Err(ActionError::NoCapacity {
                requested: 11,
                capacity: 10
            })
        );
        assert_eq!(e.hire(5), Ok(10));
        e.fire(5).unwrap();
        e.world_mut().player.cash = 10_000.0;
        assert_eq!(
            e.hire(1),
            Err(ActionError::InsufficientCash {
                needed: 25_000.0,
                available: 10_000.0
            })
        );
        assert_eq!(e.world().player.employees, 5);
    }

    #[test]
    fn firing_pays_severance() {
        let mut e = engine();
        assert_eq!(e.fire(2), Ok(2));
        assert_eq!(e.world().player.employees, 3);
        assert_eq!(e.world().player.cash, 960_000.0);
        assert_eq!(e.fire(4), Err(ActionError::InvalidAmount("fire count")));
    }

    #[test]
    fn assignments_cannot_exceed_headcount() {
        let mut e = engine();
        e.choose_initial_product("FinTech").unwrap();
        e.assign("FinTech", Department::Research, 3).unwrap();
        assert_eq!(
            e.assign("FinTech", Department::Marketing, 3),
            Err(ActionError::OverAssigned {
                requested: 6,
                employees: 5
            })
        );
        e.assign("FinTech", Department::Research, 1).unwrap();
        e.assign("FinTech", Department::Marketing, 4).unwrap();
        assert_eq!(e.world().player.assigned_total(), 5);
        assert!(matches!(
            e.assign("Nope", Department::Research, 1),
            Err(ActionError::UnknownProduct(_))
        ));
    }

    #[test]
    fn campus_comes_from_catalog() {
        let mut e = engine();
        e.build_campus("Small Office").unwrap();
        assert_eq!(e.world().player.cash, 750_000.0);
        assert_eq!(e.world().player.employee_capacity(), 60);
        assert!(matches!(
            e.build_campus("Castle"),
            Err(ActionError::UnknownCampus(_))
        ));
        assert!(matches!(
            e.build_campus("Corporate Park"),
            Err(ActionError::InsufficientCash { .. })
        ));
    }

    #[test]
    fn loans_use_the_shared_credit_limit() {
        let mut e = engine();
        assert!(matches!(
            e.take_loan(1.0),
            Err(ActionError::ExceedsCreditLimit { .. })
        ));
        for _ in 0..3 {
            e.world_mut().player.record_quarter(250_000.0, 0.0);
        }
        let loan = e.take_loan(300_000.0).unwrap();
        assert_eq!(loan.annual_rate, 0.09);
        assert_eq!(e.world().player.cash, 1_300_000.0);
        assert!(matches!(
            e.take_loan(200_000.0),
            Err(ActionError::ExceedsCreditLimit { .. })
        ));
        assert_eq!(e.take_loan(-5.0), Err(ActionError::InvalidAmount("loan amount")));
    }

    #[test]
    fn bonds_use_offered_terms() {
        let mut e = engine();
        assert_eq!(e.buy_bond(100_000.0, 4), Ok(0.07));
        assert_eq!(e.world().player.bonds.len(), 1);
        assert_eq!(e.world().player.cash, 900_000.0);
        assert_eq!(e.buy_bond(100_000.0, 3), Err(ActionError::UnsupportedBondTerm(3)));
        assert!(matches!(
            e.buy_bond(2_000_000.0, 8),
            Err(ActionError::InsufficientCash { .. })
        ));
    }

    #[test]
    fn one_acquisition_at_a_time() {
        let mut e = engine();
        e.world_mut().player.cash = 1e12;
        let target = e.world().ai_companies[0].name.clone();
        let other = e.world().ai_companies[1].name.clone();
        let price = e.initiate_acquisition(&target).unwrap();
        assert!(price > 0.0);
        assert_eq!(e.world().pending_acquisitions.len(), 1);
        assert_eq!(
            e.initiate_acquisition(&other),
            Err(ActionError::AcquisitionPending(target))
        );
        assert!(matches!(
            e.initiate_acquisition("Player Co"),
            Err(ActionError::UnknownCompany(_))
        ));
    }

    #[test]
    fn unaffordable_acquisition_is_rejected() {
        let mut e = engine();
        e.world_mut().player.cash = 0.0;
        let target = e.world().ai_companies[0].name.clone();
        assert!(matches!(
            e.initiate_acquisition(&target),
            Err(ActionError::InsufficientCash { .. })
        ));
        assert!(e.world().pending_acquisitions.is_empty());
    }

    #[test]
    fn rename_carries_products_and_deals() {
        let mut e = engine();
        e.world_mut().player.cash = 1e12;
        e.choose_initial_product("FinTech").unwrap();
        let target = e.world().ai_companies[0].name.clone();
        e.initiate_acquisition(&target).unwrap();
        e.rename_player("Nova Corp").unwrap();
        assert_eq!(e.world().player.name, "Nova Corp");
        assert_eq!(e.world().player.products["FinTech"].owner, "Nova Corp");
        assert_eq!(e.world().pending_acquisitions[0].acquirer, "Nova Corp");
        assert!(e.world().names.is_taken("Nova Corp"));
        assert!(!e.world().names.is_taken("Player Co"));
        assert_eq!(e.rename_player("  "), Err(ActionError::EmptyName));
        assert!(matches!(e.rename_player(&target), Err(ActionError::NameTaken(_))));
    }

    #[test]
    fn launch_charges_entry_cost() {
        let mut e = engine();
        e.choose_initial_product("FinTech").unwrap();
        assert_eq!(
            e.launch_product("FinTech"),
            Err(ActionError::MarketOccupied("FinTech".into()))
        );
        assert!(matches!(
            e.launch_product("Cybersecurity"),
            Err(ActionError::InsufficientCash { .. })
        ));
        e.world_mut().player.cash = 1e9;
        let cost = entry_cost(e.world().market("Cybersecurity").unwrap().size);
        let name = e.launch_product("Cybersecurity").unwrap();
        assert_eq!(e.world().player.products[&name].market, "Cybersecurity");
        assert_eq!(e.world().player.cash, 1e9 - cost);
    }

    #[test]
    fn actions_fail_after_game_over() {
        let mut e = engine();
        e.outcome = Some(GameOutcome::PlayerBankrupt);
        assert_eq!(e.hire(1), Err(ActionError::GameOver));
        assert_eq!(e.choose_initial_product("FinTech"), Err(ActionError::GameOver));
    }
}
