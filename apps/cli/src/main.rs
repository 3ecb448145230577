//! Headless driver: runs a seeded game for a number of years and prints KPIs.

use anyhow::{bail, Context, Result};
use sim_runtime::{Engine, GameConfig, GameOutcome, VictoryKind, INITIAL_MARKETS};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    years: Option<u32>,
    seed: Option<u64>,
    market: Option<String>,
    name: Option<String>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--years" => args.years = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--market" => args.market = it.next(),
            "--name" => args.name = it.next(),
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

fn outcome_label(outcome: Option<GameOutcome>) -> String {
    match outcome {
        None => "running".to_string(),
        Some(GameOutcome::PlayerBankrupt) => "bankrupt".to_string(),
        Some(GameOutcome::Victory(VictoryKind::NoCompetitors)) => "victory (no competitors)".to_string(),
        Some(GameOutcome::Victory(VictoryKind::MarketDominance { share })) => {
            format!("victory ({:.1}% of market cap)", share * 100.0)
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting technopoly"
    );

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.sim.rng_seed = seed;
    }

    let mut engine = Engine::new(config).context("creating game")?;
    if let Some(name) = &args.name {
        engine.rename_player(name)?;
    }
    let market = args.market.as_deref().unwrap_or(INITIAL_MARKETS[0]);
    engine
        .choose_initial_product(market)
        .with_context(|| format!("choosing initial market {market}"))?;

    let quarters = args.years.unwrap_or(1) * 4;
    for _ in 0..quarters {
        let report = engine.advance_quarter()?;
        for line in &report.news {
            info!(date = %report.date, "{line}");
        }
        if report.outcome.is_some() {
            break;
        }
    }

    if args.json {
        let Some(snapshot) = engine.history().latest() else {
            bail!("no snapshot recorded");
        };
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    let world = engine.world();
    let player = &world.player;
    let total_cap: f64 = world
        .companies()
        .map(|c| c.market_cap)
        .filter(|&cap| cap > 0.0)
        .sum();
    let share = if total_cap > 0.0 {
        player.market_cap.max(0.0) / total_cap
    } else {
        0.0
    };
    println!(
        "World OK | date: {} | markets: {} | competitors: {}",
        engine.date(),
        world.markets.len(),
        world.ai_companies.len()
    );
    println!(
        "KPI | quarters: {} | cash: ${:.0} | revenue: ${:.0} | employees: {} | market cap: ${:.0} | share: {:.1}% | products: {} | status: {}",
        world.turn,
        player.cash,
        player.total_revenue(),
        player.employees,
        player.market_cap,
        share * 100.0,
        player.products.len(),
        outcome_label(engine.outcome())
    );

    Ok(())
}
