//! Economic phases of a Technopoly quarter.
//!
//! - Market revenue distribution driven by product effectiveness
//! - Finance settlement: bonds, profit, market cap, loan amortization
//! - Random market events and the recession state machine
//! - Acquisition pricing

pub mod distribution;
pub mod events;
pub mod finance;
pub mod pricing;

pub use distribution::{distribute_all_markets, distribute_market, MarketReport, CHURN_RATE};
pub use events::{EventKind, EventManager, GameEvent};
pub use finance::{amortize_loans, realize_profit, settle_bonds, update_finances, CompanyLedger};
pub use pricing::{acquisition_price, has_breakout_growth};
