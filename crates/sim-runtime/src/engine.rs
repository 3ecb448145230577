//! Quarter orchestration.

use crate::acquisitions::{resolve_pending, AcquisitionResolution};
use crate::config::{ConfigError, GameConfig};
use crate::player::ActionError;
use crate::setup::{new_world, BASE_GROWTH};
use crate::snapshot::{CompanySummary, MarketSummary, QuarterSnapshot, SnapshotHistory};
use crate::spawn::{spawn_ai_companies, spawn_market};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_ai::{AiController, TurnReport};
use sim_core::{rng_from_seed, GameDate, SimRng, World};
use sim_econ::{distribute_all_markets, update_finances, CompanyLedger, EventManager, GameEvent, MarketReport};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VictoryKind {
    /// Player's share of the total positive market cap.
    MarketDominance { share: f64 },
    NoCompetitors,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameOutcome {
    PlayerBankrupt,
    Victory(VictoryKind),
}

/// Everything one call to [`Engine::advance_quarter`] did.
#[derive(Clone, Debug)]
pub struct QuarterReport {
    /// Turn that was processed.
    pub turn: u32,
    pub date: GameDate,
    pub event: Option<GameEvent>,
    pub acquisitions: Vec<AcquisitionResolution>,
    pub ai_turns: Vec<(String, TurnReport)>,
    pub spawned_companies: Vec<String>,
    pub spawned_market: Option<String>,
    pub markets: Vec<MarketReport>,
    pub ledgers: Vec<CompanyLedger>,
    pub news: Vec<String>,
    pub competitor_news: Vec<String>,
    pub outcome: Option<GameOutcome>,
}

impl QuarterReport {
    pub fn player_bankrupt(&self) -> bool {
        matches!(self.outcome, Some(GameOutcome::PlayerBankrupt))
    }

    pub fn victory(&self) -> bool {
        matches!(self.outcome, Some(GameOutcome::Victory(_)))
    }
}

/// Owns the world and every phase that mutates it.
///
/// One quarter runs to completion inside [`Engine::advance_quarter`]; the
/// driver reads state only between calls.
pub struct Engine {
    pub(crate) world: World,
    pub(crate) events: EventManager,
    pub(crate) ai: AiController,
    pub(crate) config: GameConfig,
    pub(crate) rng: SimRng,
    pub(crate) history: SnapshotHistory,
    spawned_ai: u32,
    spawned_markets: u32,
    pub(crate) outcome: Option<GameOutcome>,
}

impl Engine {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = rng_from_seed(config.sim.rng_seed);
        let world = new_world(&config.sim, &mut rng);
        let events = EventManager::new(world.markets.iter().map(|m| m.name.as_str()));
        let ai = AiController::new(config.ai.clone(), config.sim.campus_catalog.clone());
        info!(seed = config.sim.rng_seed, start_year = config.sim.start_year, "game created");
        Ok(Self {
            world,
            events,
            ai,
            history: SnapshotHistory::new(config.sim.history_capacity),
            config,
            rng,
            spawned_ai: 0,
            spawned_markets: 0,
            outcome: None,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for scenario setup. Mutations bypass the checks the
    /// player operations enforce.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn date(&self) -> GameDate {
        self.world.date()
    }

    pub fn company_summaries(&self) -> Vec<CompanySummary> {
        self.world.companies().map(CompanySummary::of).collect()
    }

    pub fn market_summaries(&self) -> Vec<MarketSummary> {
        self.world
            .markets
            .iter()
            .map(|m| MarketSummary::of(m, &self.world))
            .collect()
    }

    /// General headlines, oldest first.
    pub fn news(&self) -> impl Iterator<Item = &str> {
        self.world.news.iter()
    }

    pub fn competitor_news(&self) -> impl Iterator<Item = &str> {
        self.world.competitor_news.iter()
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Dated lines for recent events, newest first.
    pub fn event_headlines(&self) -> Vec<String> {
        self.events.headlines(self.world.start_year)
    }

    pub fn recession_active(&self) -> bool {
        self.events.recession_active
    }

    /// Run one full quarter.
    pub fn advance_quarter(&mut self) -> Result<QuarterReport, ActionError> {
        if self.outcome.is_some() {
            warn!(turn = self.world.turn, "advance requested after game over");
            return Err(ActionError::GameOver);
        }
        let turn = self.world.turn;
        let sim = &self.config.sim;
        let news_mark = self.world.news.mark();
        let competitor_mark = self.world.competitor_news.mark();
        debug!(turn, "quarter start");

        if turn > 0 && turn % sim.growth_reroll_interval == 0 {
            for m in &mut self.world.markets {
                m.base_growth_rate = self.rng.gen_range(BASE_GROWTH);
                m.reset_growth();
            }
            debug!(turn, "base growth redrawn");
        }

        let acquisitions = resolve_pending(&mut self.world);
        let ai_turns = self.ai.run_all(&mut self.world, &mut self.rng);

        let mut spawned_companies = Vec::new();
        if turn > 0 && turn % sim.ai_spawn_interval == 0 {
            spawned_companies =
                spawn_ai_companies(&mut self.world, sim, self.spawned_ai, &mut self.rng);
            self.spawned_ai += spawned_companies.len() as u32;
        }
        let mut spawned_market = None;
        if turn > 0 && turn % sim.market_spawn_interval == 0 {
            spawned_market = spawn_market(&mut self.world, sim, self.spawned_markets, &mut self.rng);
            if spawned_market.is_some() {
                self.spawned_markets += 1;
            }
        }

        let markets = distribute_all_markets(&mut self.world, turn == 0);

        let event = self.events.pick(&mut self.rng);
        if let Some(ev) = &event {
            self.world.news.push(format!("{}: {}", ev.name, ev.description));
            self.events.apply(ev.clone(), &mut self.world.markets, turn);
        }
        self.events.update_recession(&mut self.world.markets);

        let ledgers = update_finances(&mut self.world);
        self.world.player.update_negative_cash_quarters();

        self.history
            .record(QuarterSnapshot::capture(&self.world, turn + 1));

        let outcome = self.check_endgame();
        self.outcome = outcome;
        self.world.turn += 1;

        info!(
            turn,
            date = %GameDate::from_turn(self.world.start_year, turn),
            companies = self.world.ai_companies.len() + 1,
            markets = self.world.markets.len(),
            player_cash = self.world.player.cash,
            "quarter processed"
        );

        Ok(QuarterReport {
            turn,
            date: GameDate::from_turn(self.world.start_year, turn),
            event,
            acquisitions,
            ai_turns,
            spawned_companies,
            spawned_market,
            markets,
            ledgers,
            news: self.world.news.since(news_mark),
            competitor_news: self.world.competitor_news.since(competitor_mark),
            outcome,
        })
    }

    /// Bankruptcy wins over victory when both hold in the same quarter.
    fn check_endgame(&mut self) -> Option<GameOutcome> {
        if self.world.player.is_bankrupt() {
            self.world.news.push(format!(
                "{} has gone BANKRUPT! Game over.",
                self.world.player.name
            ));
            info!(player = %self.world.player.name, "player bankrupt");
            return Some(GameOutcome::PlayerBankrupt);
        }
        let total: f64 = self
            .world
            .companies()
            .map(|c| c.market_cap)
            .filter(|&cap| cap > 0.0)
            .sum();
        if total <= 0.0 {
            return None;
        }
        let share = self.world.player.market_cap.max(0.0) / total;
        let kind = if self.world.ai_companies.is_empty() {
            VictoryKind::NoCompetitors
        } else if share > self.config.sim.victory_share {
            VictoryKind::MarketDominance { share }
        } else {
            return None;
        };
        self.world.news.push(format!(
            "{} has achieved market dominance!",
            self.world.player.name
        ));
        info!(player = %self.world.player.name, share, "player victory");
        Some(GameOutcome::Victory(kind))
    }
}
