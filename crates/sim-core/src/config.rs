//! World-level simulation parameters.

use crate::campus::CampusCatalog;
use serde::{Deserialize, Serialize};

/// Simulation configuration. Every field has a default so partial YAML
/// documents deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the shared deterministic RNG.
    pub rng_seed: u64,
    /// Calendar year of turn 0.
    pub start_year: i32,
    /// New AI companies arrive every this many turns.
    pub ai_spawn_interval: u32,
    pub ai_spawn_batch: u32,
    /// Upper bound on AI companies spawned over a game.
    pub max_spawned_ai: u32,
    /// New markets open every this many turns.
    pub market_spawn_interval: u32,
    pub max_spawned_markets: u32,
    /// Base growth rates are redrawn every this many turns.
    pub growth_reroll_interval: u32,
    pub news_capacity: usize,
    pub history_capacity: usize,
    /// Share of total positive market cap the player must exceed to win.
    pub victory_share: f64,
    pub player_name: String,
    pub player_starting_cash: f64,
    pub player_starting_employees: u32,
    pub campus_catalog: CampusCatalog,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_year: 2000,
            ai_spawn_interval: 4,
            ai_spawn_batch: 3,
            max_spawned_ai: 100,
            market_spawn_interval: 3,
            max_spawned_markets: 12,
            growth_reroll_interval: 8,
            news_capacity: 100,
            history_capacity: 10,
            victory_share: 0.7,
            player_name: "Player Co".to_string(),
            player_starting_cash: 1_000_000.0,
            player_starting_employees: 5,
            campus_catalog: CampusCatalog::default(),
        }
    }
}
