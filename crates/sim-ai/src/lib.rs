//! AI competitors for Technopoly.
//!
//! One parameterized policy drives every tier; [`policy::TierPolicy`]
//! supplies the numbers. Each action reports an outcome value instead of
//! silently doing nothing, so callers and tests can see why a company did
//! not hire, borrow or expand.

pub mod actions;
pub mod controller;
pub mod policy;
pub mod rebalance;

pub use actions::{
    enter_market, entry_cost, target_headcount, AcquisitionOutcome, BondOutcome, CampusOutcome,
    FireOutcome, HireOutcome, LoanOutcome, ProductOutcome, StaffingOutcome,
};
pub use controller::{AiController, BankruptcyOutcome, TurnActions, TurnReport};
pub use policy::{AiConfig, BondPolicy, CampusPick, LoanTrigger, TierPolicy};
pub use rebalance::{plan_headcount, rebalance_assignments, split_departments, AssignmentChange};
