use sim_runtime::{AcquisitionResolution, Engine, GameConfig};

fn engine_with_offer() -> (Engine, String) {
    let mut engine = Engine::new(GameConfig::default()).unwrap();
    engine.choose_initial_product("FinTech").unwrap();
    engine.world_mut().player.cash = 200_000_000.0;
    let target = engine.world().ai_companies[0].name.clone();
    engine.initiate_acquisition(&target).unwrap();
    (engine, target)
}

fn calm_target(engine: &mut Engine, target: &str) {
    if let Some(c) = engine.world_mut().company_mut(target) {
        for p in c.products.values_mut() {
            p.recent_growth.clear();
        }
    }
}

#[test]
fn offer_settles_one_quarter_later() {
    let (mut engine, target) = engine_with_offer();
    let first = engine.advance_quarter().unwrap();
    assert!(first.acquisitions.is_empty());
    assert_eq!(engine.world().pending_acquisitions.len(), 1);

    calm_target(&mut engine, &target);
    let target_products = engine.world().company(&target).unwrap().products.len();
    let before = engine.world().player.products.len();

    let second = engine.advance_quarter().unwrap();
    assert_eq!(second.acquisitions.len(), 1);
    assert!(second.acquisitions[0].succeeded());
    assert!(engine.world().company(&target).is_none());
    assert_eq!(
        engine.world().player.products.len(),
        before + target_products
    );
    assert!(second
        .news
        .iter()
        .any(|line| line.starts_with("Player Co acquired")));
    assert!(engine.world().pending_acquisitions.is_empty());
}

#[test]
fn offer_fails_when_cash_runs_out() {
    let (mut engine, target) = engine_with_offer();
    engine.advance_quarter().unwrap();
    engine.world_mut().player.cash = 0.0;
    let report = engine.advance_quarter().unwrap();
    assert!(matches!(
        report.acquisitions[0],
        AcquisitionResolution::InsufficientFunds(_)
    ));
    assert!(engine.world().company(&target).is_some());
    let expected = format!("Acquisition of {target} failed; insufficient funds.");
    assert!(report.competitor_news.contains(&expected));
}
