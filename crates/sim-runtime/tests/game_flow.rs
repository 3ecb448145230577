use sim_core::{validate_world, SimConfig};
use sim_runtime::{Engine, GameConfig, QuarterReport};

fn seeded(seed: u64) -> GameConfig {
    GameConfig {
        sim: SimConfig {
            rng_seed: seed,
            ..SimConfig::default()
        },
        ..GameConfig::default()
    }
}

fn started(seed: u64) -> Engine {
    let mut engine = Engine::new(seeded(seed)).unwrap();
    engine.choose_initial_product("Artificial Intelligence").unwrap();
    engine
}

fn run(engine: &mut Engine, quarters: u32) -> Vec<QuarterReport> {
    let mut reports = Vec::new();
    for _ in 0..quarters {
        if engine.is_over() {
            break;
        }
        reports.push(engine.advance_quarter().unwrap());
    }
    reports
}

#[test]
fn same_seed_replays_identically() {
    let mut a = started(11);
    let mut b = started(11);
    let ra = run(&mut a, 12);
    let rb = run(&mut b, 12);
    assert_eq!(a.world(), b.world());
    assert_eq!(a.history(), b.history());
    let news_a: Vec<_> = ra.iter().flat_map(|r| r.news.clone()).collect();
    let news_b: Vec<_> = rb.iter().flat_map(|r| r.news.clone()).collect();
    assert_eq!(news_a, news_b);
}

#[test]
fn feeds_and_history_stay_bounded() {
    let mut engine = started(5);
    let reports = run(&mut engine, 40);
    assert!(!reports.is_empty());
    let world = engine.world();
    assert!(world.news.len() <= 100);
    assert!(world.competitor_news.len() <= 100);
    assert!(engine.history().len() <= 10);
    let latest = engine.history().latest().map(|s| s.turn);
    assert_eq!(latest, Some(world.turn));
}

#[test]
fn world_stays_consistent_every_quarter() {
    let mut engine = started(21);
    for _ in 0..24 {
        if engine.is_over() {
            break;
        }
        engine.advance_quarter().unwrap();
        validate_world(engine.world()).unwrap();
        for c in engine.world().companies() {
            assert!(c.assigned_total() <= c.employees, "{} over-assigned", c.name);
        }
    }
}

#[test]
fn reports_carry_quarter_news() {
    let mut engine = started(8);
    let reports = run(&mut engine, 4);
    let first = &reports[0];
    assert_eq!(first.turn, 0);
    if let Some(ev) = &first.event {
        let line = format!("{}: {}", ev.name, ev.description);
        assert!(first.news.contains(&line));
    }
    let ai_moves: usize = reports.iter().map(|r| r.competitor_news.len()).sum();
    assert!(ai_moves > 0);
    let dates: Vec<String> = reports.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, ["2000 Q1", "2000 Q2", "2000 Q3", "2000 Q4"]);
}

#[test]
fn summaries_cover_every_company_and_market() {
    let mut engine = started(3);
    run(&mut engine, 4);
    let companies = engine.company_summaries();
    assert_eq!(companies.len(), engine.world().ai_companies.len() + 1);
    assert_eq!(companies[0].name, "Player Co");
    let markets = engine.market_summaries();
    assert_eq!(markets.len(), engine.world().markets.len());
    let ai_market = markets
        .iter()
        .find(|m| m.name == "Artificial Intelligence")
        .unwrap();
    assert!(ai_market.competitors >= 1);
}
