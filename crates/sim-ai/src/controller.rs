//! Per-quarter driver for AI companies.

use crate::actions::{
    acquisition_headline, adjust_staffing, bond_headline, campus_headline, draw_credit,
    expand_campus, invest_surplus, loan_headline, money, open_new_product, product_headline,
    seek_acquisition, staffing_headline, AcquisitionOutcome, BondOutcome, CampusOutcome,
    LoanOutcome, ProductOutcome, StaffingOutcome,
};
use crate::policy::AiConfig;
use crate::rebalance::{change_headline, rebalance_assignments, AssignmentChange};
use rand::Rng;
use sim_core::{CampusCatalog, MergeSummary, World};
use tracing::{debug, info, warn};

/// How a bankrupt company left the quarter.
#[derive(Clone, Debug, PartialEq)]
pub enum BankruptcyOutcome {
    /// Selling bonds brought cash back to zero or above.
    AvoidedByLiquidation { proceeds: f64 },
    /// All assets went to the largest remaining company.
    MergedInto {
        acquirer: String,
        liquidated: f64,
        summary: MergeSummary,
    },
    /// No other company existed to take the assets.
    Dissolved,
}

/// Everything one company decided during an ordinary quarter.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnActions {
    pub staffing: StaffingOutcome,
    pub campus: CampusOutcome,
    pub loan: LoanOutcome,
    pub product: ProductOutcome,
    pub acquisition: AcquisitionOutcome,
    pub bond: BondOutcome,
    pub assignments: Vec<AssignmentChange>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TurnReport {
    Bankruptcy(BankruptcyOutcome),
    Acted(Box<TurnActions>),
}

impl TurnReport {
    /// True when the company left the roster this quarter.
    pub fn removed_company(&self) -> bool {
        matches!(
            self,
            TurnReport::Bankruptcy(BankruptcyOutcome::MergedInto { .. } | BankruptcyOutcome::Dissolved)
        )
    }
}

/// Runs the tier policies for every AI company.
#[derive(Clone, Debug, Default)]
pub struct AiController {
    pub config: AiConfig,
    pub catalog: CampusCatalog,
}

impl AiController {
    pub fn new(config: AiConfig, catalog: CampusCatalog) -> Self {
        Self { config, catalog }
    }

    /// One quarter of decisions for AI company `name`.
    ///
    /// Returns `None` if `name` is not an AI company on the roster.
    pub fn take_turn<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        name: &str,
        rng: &mut R,
    ) -> Option<TurnReport> {
        let idx = world.ai_index(name)?;
        let company = &mut world.ai_companies[idx];
        let tier = company.tier?;
        company.update_negative_cash_quarters();
        if company.is_bankrupt() {
            return Some(TurnReport::Bankruptcy(self.handle_bankruptcy(world, name)));
        }

        let policy = self.config.policy(tier);
        let profit = company.quarterly_profit();
        let liquidity = company.liquidity_ratio();

        let staffing = adjust_staffing(company, policy, profit);
        let campus = expand_campus(company, policy, &self.catalog);
        let loan = match policy.loan_trigger.evaluate(company, liquidity) {
            Some(emergency) => draw_credit(company, emergency, self.config.min_loan),
            None => LoanOutcome::NotNeeded,
        };
        let product = open_new_product(world, name, policy, profit, rng);
        let acquisition = seek_acquisition(world, name, policy, &self.config);
        let bond = match world.company_mut(name) {
            Some(c) => invest_surplus(c, policy, &self.config, rng),
            None => BondOutcome::NotNeeded,
        };
        if let Some(c) = world.company_mut(name) {
            c.update_negative_cash_quarters();
        }
        let assignments = rebalance_assignments(world, name);

        let headlines = [
            staffing_headline(name, &staffing),
            campus_headline(name, &campus),
            loan_headline(name, &loan),
            product_headline(name, &product),
            acquisition_headline(name, &acquisition),
            bond_headline(name, &bond),
        ];
        for line in headlines.into_iter().flatten() {
            world.competitor_news.push(line);
        }
        for change in &assignments {
            world.competitor_news.push(change_headline(name, change));
        }
        debug!(company = name, %tier, ?staffing, ?loan, "ai turn");

        Some(TurnReport::Acted(Box::new(TurnActions {
            staffing,
            campus,
            loan,
            product,
            acquisition,
            bond,
            assignments,
        })))
    }

    fn handle_bankruptcy(&self, world: &mut World, name: &str) -> BankruptcyOutcome {
        let mut liquidated = 0.0;
        if let Some(c) = world.company_mut(name) {
            if c.cash < 0.0 && !c.bonds.is_empty() {
                liquidated = c.liquidate_bonds();
            }
            if liquidated > 0.0 {
                let line = format!(
                    "{name} sold all bonds for {} to raise emergency funds.",
                    money(liquidated)
                );
                world.competitor_news.push(line);
            }
        }
        if world.company(name).map_or(false, |c| c.cash >= 0.0) {
            world
                .competitor_news
                .push(format!("{name} avoided bankruptcy after liquidating bonds!"));
            info!(company = name, proceeds = liquidated, "bankruptcy avoided");
            return BankruptcyOutcome::AvoidedByLiquidation {
                proceeds: liquidated,
            };
        }

        let Some(acquirer) = world.largest_company_except(name).map(str::to_string) else {
            if let Some(idx) = world.ai_index(name) {
                world.ai_companies.remove(idx);
            }
            warn!(company = name, "bankrupt with no company left to absorb it");
            world.competitor_news.push(format!("{name} has gone BANKRUPT!"));
            return BankruptcyOutcome::Dissolved;
        };
        match world.absorb(&acquirer, name) {
            Some(summary) => {
                world.competitor_news.push(format!(
                    "{name} has gone BANKRUPT! All assets given to {acquirer}."
                ));
                info!(company = name, %acquirer, "bankrupt company merged");
                BankruptcyOutcome::MergedInto {
                    acquirer,
                    liquidated,
                    summary,
                }
            }
            None => BankruptcyOutcome::Dissolved,
        }
    }

    /// Let every AI company on the roster act once, in roster order.
    ///
    /// Companies merged away earlier in the pass are skipped.
    pub fn run_all<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) -> Vec<(String, TurnReport)> {
        let names: Vec<String> = world.ai_companies.iter().map(|c| c.name.clone()).collect();
        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            if let Some(report) = self.take_turn(world, &name, rng) {
                reports.push((name, report));
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{Bond, Campus, Company, Market, Product, SimConfig, Tier};

    fn world() -> World {
        let mut player = Company::new("Player Co", None, 1_000_000.0, 5).with_campus(Campus::garage());
        player.market_cap = 1_000_000.0;
        let mut w = World::new(&SimConfig::default(), player);
        w.markets.push(Market::new("Cloud", 1_000_000.0, 0.1));
        w
    }

    fn broke(name: &str) -> Company {
        let mut c = Company::new(name, Some(Tier::Startup), -10.0, 4)
            .with_campus(Campus::garage())
            .with_product("Flop", Product::new(name, "Cloud"));
        c.negative_cash_quarters = 3;
        c
    }

    #[test]
    fn bankrupt_company_is_merged_into_largest() {
        let mut w = world();
        w.ai_companies.push(broke("Sinking"));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = AiController::default().take_turn(&mut w, "Sinking", &mut rng).unwrap();
        assert!(report.removed_company());
        assert!(w.ai_companies.is_empty());
        assert_eq!(w.player.employees, 9);
        assert!(w.player.products.contains_key("Flop"));
        assert_eq!(w.player.products["Flop"].owner, "Player Co");
        assert!(w
            .competitor_news
            .latest()
            .unwrap()
            .contains("has gone BANKRUPT! All assets given to Player Co"));
    }

    #[test]
    fn bond_liquidation_can_avert_bankruptcy() {
        let mut w = world();
        let mut c = broke("Sinking");
        c.bonds.push(Bond::new(50.0, 0.06, 2));
        w.ai_companies.push(c);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = AiController::default().take_turn(&mut w, "Sinking", &mut rng).unwrap();
        assert_eq!(
            report,
            TurnReport::Bankruptcy(BankruptcyOutcome::AvoidedByLiquidation { proceeds: 50.0 })
        );
        assert_eq!(w.company("Sinking").unwrap().cash, 40.0);
    }

    #[test]
    fn ordinary_turn_keeps_assignment_invariant() {
        let mut w = world();
        let c = Company::new("Healthy", Some(Tier::Medium), 5_000_000.0, 20)
            .with_campus(Campus::new("Small Office", 250_000.0, 0.02, 50))
            .with_product("Alpha", Product::new("Healthy", "Cloud").with_revenue(1_000_000.0));
        w.ai_companies.push(c);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let reports = AiController::default().run_all(&mut w, &mut rng);
        assert_eq!(reports.len(), 1);
        let TurnReport::Acted(actions) = &reports[0].1 else {
            panic!("expected an ordinary turn");
        };
        // Target is 0.6 * 1M / 25k = 24 employees.
        assert_eq!(actions.staffing, StaffingOutcome::Hire(crate::HireOutcome::Hired(4)));
        let healthy = w.company("Healthy").unwrap();
        assert_eq!(healthy.assigned_total(), healthy.employees);
        assert!(w.competitor_news.iter().any(|l| l == "Healthy hires 4 new employees."));
    }

    #[test]
    fn unknown_or_player_names_are_ignored() {
        let mut w = world();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(AiController::default().take_turn(&mut w, "Player Co", &mut rng).is_none());
        assert!(AiController::default().take_turn(&mut w, "Nobody", &mut rng).is_none());
    }
}
