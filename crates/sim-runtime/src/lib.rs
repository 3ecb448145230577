//! Game engine for Technopoly.
//!
//! [`Engine`] owns the world and runs each quarter in a fixed order:
//! pending acquisitions, AI turns, periodic spawning, revenue
//! distribution, events, finances, snapshot and endgame checks. Player
//! operations live on the engine too and return [`ActionError`] instead of
//! silently skipping.

pub mod acquisitions;
pub mod config;
pub mod engine;
pub mod player;
pub mod setup;
pub mod snapshot;
pub mod spawn;

pub use acquisitions::{resolve_pending, AcquisitionResolution};
pub use config::{ConfigError, GameConfig};
pub use engine::{Engine, GameOutcome, QuarterReport, VictoryKind};
pub use player::{ActionError, BOND_OFFERS};
pub use setup::{new_world, INITIAL_MARKETS};
pub use snapshot::{CompanySummary, MarketSummary, QuarterSnapshot, SnapshotHistory};
pub use spawn::SPAWN_MARKETS;
