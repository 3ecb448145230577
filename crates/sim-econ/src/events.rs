//! Quarterly market shocks and the global recession state machine.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{GameDate, Market};
use std::collections::VecDeque;
use tracing::info;

/// Growth shift applied by a demand event.
pub const DEMAND_SHIFT: f64 = 0.05;
pub const RECESSION_QUARTERS: u32 = 3;
/// Applied events remembered for display.
pub const RECENT_EVENTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Shift one market's growth rate by `delta` for the quarter.
    Demand { market: String, delta: f64 },
    /// All markets stop growing and shrink for several quarters.
    GlobalRecession,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub name: String,
    pub description: String,
    pub kind: EventKind,
    /// Turn on which the event was applied.
    pub turn: Option<u32>,
}

impl GameEvent {
    fn demand(market: &str, delta: f64) -> Self {
        let (name, sign) = if delta >= 0.0 {
            (format!("Strong demand for {market}"), '+')
        } else {
            (format!("Weak demand for {market}"), '-')
        };
        Self {
            name,
            description: format!(
                "{sign}{:.0}% growth this quarter in {market}",
                delta.abs() * 100.0
            ),
            kind: EventKind::Demand {
                market: market.to_string(),
                delta,
            },
            turn: None,
        }
    }

    pub fn global_recession() -> Self {
        Self {
            name: "Global Recession".to_string(),
            description: format!(
                "All markets freeze growth and shrink 5% each quarter for {RECESSION_QUARTERS} quarters"
            ),
            kind: EventKind::GlobalRecession,
            turn: None,
        }
    }

    pub fn is_breaking(&self) -> bool {
        matches!(self.kind, EventKind::GlobalRecession)
    }
}

/// Picks and applies one event per quarter.
///
/// Demand events exist for the markets known at construction; one draw in
/// `demand_events + 1` is the recession. No events are drawn while a
/// recession is running.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventManager {
    demand_events: Vec<GameEvent>,
    recent: VecDeque<GameEvent>,
    pub recession_active: bool,
    pub recession_quarters_left: u32,
}

impl EventManager {
    pub fn new<'a>(markets: impl IntoIterator<Item = &'a str>) -> Self {
        let demand_events = markets
            .into_iter()
            .flat_map(|m| {
                [
                    GameEvent::demand(m, DEMAND_SHIFT),
                    GameEvent::demand(m, -DEMAND_SHIFT),
                ]
            })
            .collect();
        Self {
            demand_events,
            recent: VecDeque::with_capacity(RECENT_EVENTS),
            recession_active: false,
            recession_quarters_left: 0,
        }
    }

    pub fn demand_events(&self) -> &[GameEvent] {
        &self.demand_events
    }

    /// Most recent last.
    pub fn recent(&self) -> impl Iterator<Item = &GameEvent> {
        self.recent.iter()
    }

    /// Draw this quarter's event, or `None` during a recession.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GameEvent> {
        if self.recession_active {
            return None;
        }
        let outcomes = self.demand_events.len() as u32 + 1;
        if rng.gen_range(1..=outcomes) == outcomes {
            return Some(GameEvent::global_recession());
        }
        self.demand_events.choose(rng).cloned()
    }

    /// Apply an event to the markets and log it.
    pub fn apply(&mut self, mut event: GameEvent, markets: &mut [Market], turn: u32) {
        match &event.kind {
            EventKind::GlobalRecession => {
                self.recession_active = true;
                self.recession_quarters_left = RECESSION_QUARTERS;
                for m in markets.iter_mut() {
                    m.enter_recession(RECESSION_QUARTERS);
                }
                info!(turn, "global recession begins");
            }
            EventKind::Demand { market, delta } => {
                for m in markets.iter_mut() {
                    m.reset_growth();
                }
                if let Some(m) = markets.iter_mut().find(|m| &m.name == market) {
                    m.growth_rate = (m.growth_rate + delta).max(0.0);
                }
            }
        }
        event.turn = Some(turn);
        self.recent.push_back(event);
        while self.recent.len() > RECENT_EVENTS {
            self.recent.pop_front();
        }
    }

    /// Count a recession quarter down; clear every market when it ends.
    pub fn update_recession(&mut self, markets: &mut [Market]) {
        if !self.recession_active {
            return;
        }
        self.recession_quarters_left = self.recession_quarters_left.saturating_sub(1);
        if self.recession_quarters_left == 0 {
            self.recession_active = false;
            for m in markets.iter_mut() {
                m.clear_recession();
            }
            info!("global recession over");
        }
    }

    /// Dated lines for the recent events, newest first.
    pub fn headlines(&self, start_year: i32) -> Vec<String> {
        self.recent
            .iter()
            .rev()
            .map(|ev| {
                let date = GameDate::from_turn(start_year, ev.turn.unwrap_or(0));
                if ev.is_breaking() {
                    format!(
                        "{date} - {} (remaining {} quarters)",
                        ev.name, self.recession_quarters_left
                    )
                } else {
                    format!("{date}: {}, {}", ev.name, ev.description)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn markets() -> Vec<Market> {
        ["AI", "Cloud"]
            .into_iter()
            .map(|n| Market::new(n, 1_000_000.0, 0.10))
            .collect()
    }

    #[test]
    fn recession_clears_after_three_updates() {
        let mut ms = markets();
        let mut mgr = EventManager::new(ms.iter().map(|m| m.name.as_str()).collect::<Vec<_>>());
        mgr.apply(GameEvent::global_recession(), &mut ms, 4);
        assert!(mgr.recession_active);
        assert_eq!(mgr.recession_quarters_left, 3);
        assert!(ms.iter().all(|m| m.is_in_global_recession && m.recession_quarters_left == 3));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(mgr.pick(&mut rng).is_none());
        for _ in 0..2 {
            mgr.update_recession(&mut ms);
            assert!(ms.iter().all(|m| m.is_in_global_recession));
        }
        mgr.update_recession(&mut ms);
        assert!(!mgr.recession_active);
        assert!(ms.iter().all(|m| !m.is_in_global_recession));
    }

    #[test]
    fn demand_event_resets_other_markets() {
        let mut ms = markets();
        ms[1].growth_rate = 0.30;
        let mut mgr = EventManager::new(["AI", "Cloud"]);
        assert_eq!(mgr.demand_events().len(), 4);
        let weak = mgr.demand_events()[1].clone();
        mgr.apply(weak, &mut ms, 0);
        assert!((ms[0].growth_rate - 0.05).abs() < 1e-12);
        assert_eq!(ms[1].growth_rate, 0.10);
    }

    #[test]
    fn weak_demand_floors_at_zero() {
        let mut ms = markets();
        ms[0].base_growth_rate = 0.02;
        let mut mgr = EventManager::new(["AI"]);
        let weak = mgr.demand_events()[1].clone();
        mgr.apply(weak, &mut ms, 0);
        assert_eq!(ms[0].growth_rate, 0.0);
    }

    #[test]
    fn log_keeps_last_five() {
        let mut ms = markets();
        let mut mgr = EventManager::new(["AI", "Cloud"]);
        for turn in 0..7 {
            let ev = mgr.demand_events()[turn as usize % 4].clone();
            mgr.apply(ev, &mut ms, turn);
        }
        assert_eq!(mgr.recent().count(), RECENT_EVENTS);
        assert_eq!(mgr.recent().next().and_then(|e| e.turn), Some(2));
        let lines = mgr.headlines(2000);
        assert!(lines[0].starts_with("2001 Q3: "));
    }

    #[test]
    fn draws_are_reproducible() {
        let mgr = EventManager::new(["AI", "Cloud", "FinTech"]);
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..20).map(|_| mgr.pick(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }
}
