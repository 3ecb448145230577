//! Quarterly settlement of bonds, profit, market cap and loans.
//!
//! Companies are settled independently of one another. Within a company
//! bonds settle first, then profit and market cap, then loan amortization.

use sim_core::{Company, World};
use tracing::debug;

/// Per-company result of [`update_finances`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyLedger {
    pub company: String,
    pub bond_interest: f64,
    pub bond_principal_returned: f64,
    pub bonds_matured: usize,
    /// Revenue less operating costs and scheduled debt service.
    pub profit: f64,
    pub market_cap: f64,
    pub loan_payments: f64,
    pub loans_closed: usize,
}

/// Pay one quarter of interest on every bond and return matured principal.
pub fn settle_bonds(company: &mut Company, ledger: &mut CompanyLedger) {
    let mut cash = 0.0;
    company.bonds.retain_mut(|bond| {
        let settlement = bond.settle_quarter();
        ledger.bond_interest += settlement.interest;
        ledger.bond_principal_returned += settlement.principal_returned;
        cash += settlement.cash();
        if settlement.matured {
            ledger.bonds_matured += 1;
        }
        !settlement.matured
    });
    company.cash += cash;
}

/// Book the quarter's profit, roll the revenue/profit windows and
/// recompute market cap.
///
/// Debt service counts against reported profit but is not debited here;
/// [`amortize_loans`] performs the single cash debit for loans.
pub fn realize_profit(company: &mut Company, ledger: &mut CompanyLedger) {
    let revenue = company.total_revenue();
    let profit = company.quarterly_profit();
    company.cash += revenue - company.operating_costs();
    company.record_quarter(revenue, profit);
    ledger.profit = profit;
    ledger.market_cap = company.recompute_market_cap();
}

/// Amortize every loan by one quarter and debit the payments in one batch.
pub fn amortize_loans(company: &mut Company, ledger: &mut CompanyLedger) {
    let mut paid = 0.0;
    company.loans.retain_mut(|loan| {
        paid += loan.amortize_quarter();
        if loan.is_settled() {
            ledger.loans_closed += 1;
            false
        } else {
            true
        }
    });
    company.cash -= paid;
    ledger.loan_payments = paid;
}

/// Settle every company in the world, player first.
pub fn update_finances(world: &mut World) -> Vec<CompanyLedger> {
    let mut ledgers: Vec<CompanyLedger> = world
        .companies()
        .map(|c| CompanyLedger {
            company: c.name.clone(),
            ..CompanyLedger::default()
        })
        .collect();

    for (company, ledger) in world.companies_mut().zip(ledgers.iter_mut()) {
        settle_bonds(company, ledger);
    }
    for (company, ledger) in world.companies_mut().zip(ledgers.iter_mut()) {
        realize_profit(company, ledger);
    }
    for (company, ledger) in world.companies_mut().zip(ledgers.iter_mut()) {
        amortize_loans(company, ledger);
        debug!(
            company = %ledger.company,
            profit = ledger.profit,
            market_cap = ledger.market_cap,
            cash = company.cash,
            "finances settled"
        );
    }
    ledgers
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Bond, Campus, Loan, Product, Tier};

    fn company() -> Company {
        Company::new("Acme", Some(Tier::Medium), 100_000.0, 4)
            .with_campus(Campus::new("Small Office", 250_000.0, 0.02, 50))
            .with_product("Core", Product::new("Acme", "AI").with_revenue(200_000.0))
    }

    #[test]
    fn bond_returns_principal_after_term() {
        let mut c = company();
        c.cash = 0.0;
        c.bonds.push(Bond::new(100_000.0, 0.08, 3));
        let mut ledger = CompanyLedger::default();
        for _ in 0..3 {
            settle_bonds(&mut c, &mut ledger);
        }
        assert!(c.bonds.is_empty());
        assert_eq!(ledger.bonds_matured, 1);
        assert!((c.cash - (100_000.0 + 3.0 * 2_000.0)).abs() < 1e-9);
    }

    #[test]
    fn profit_counts_debt_service_but_cash_does_not() {
        let mut c = company();
        c.loans.push(Loan::new(300_000.0, 0.09, 60));
        let debt_service = c.quarterly_debt_service();
        let mut ledger = CompanyLedger::default();
        realize_profit(&mut c, &mut ledger);
        let operating = 4.0 * 25_000.0 * 1.02;
        assert!((ledger.profit - (200_000.0 - operating - debt_service)).abs() < 1e-6);
        assert!((c.cash - (100_000.0 + 200_000.0 - operating)).abs() < 1e-6);
        assert_eq!(c.past_quarter_revenues.latest(), Some(200_000.0));
    }

    #[test]
    fn market_cap_uses_balance_sheet_and_revenue() {
        let mut c = company();
        let mut ledger = CompanyLedger::default();
        realize_profit(&mut c, &mut ledger);
        let expected = c.cash + 250_000.0 + 200_000.0 / 3.0 * 4.0;
        assert!((ledger.market_cap - expected).abs() < 1e-6);
    }

    #[test]
    fn loans_are_debited_once_and_dropped_at_term() {
        let mut c = company();
        c.loans.push(Loan::new(30_000.0, 0.09, 3));
        let payment = c.loans[0].quarterly_payment();
        let mut ledger = CompanyLedger::default();
        amortize_loans(&mut c, &mut ledger);
        assert!(c.loans.is_empty());
        assert_eq!(ledger.loans_closed, 1);
        assert!((c.cash - (100_000.0 - payment)).abs() < 1e-9);
    }

    #[test]
    fn world_pass_settles_every_company() {
        let player = Company::new("Player Co", None, 10.0, 0).with_campus(Campus::garage());
        let mut world = World::new(&sim_core::SimConfig::default(), player);
        world.ai_companies.push(company());
        let ledgers = update_finances(&mut world);
        assert_eq!(ledgers.len(), 2);
        assert_eq!(ledgers[1].company, "Acme");
        assert!(world.ai_companies[0].market_cap > 0.0);
    }
}
