use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sim_runtime::{Engine, GameConfig};

fn started_engine() -> Engine {
    let mut engine = Engine::new(GameConfig::default()).expect("default config is valid");
    engine
        .choose_initial_product("Cloud Computing")
        .expect("opening market exists");
    engine
}

fn bench_quarters(c: &mut Criterion) {
    c.bench_function("sim_quarter", |b| {
        b.iter_batched(
            started_engine,
            |mut engine| black_box(engine.advance_quarter()),
            BatchSize::SmallInput,
        )
    });
    c.bench_function("sim_five_years", |b| {
        b.iter_batched(
            started_engine,
            |mut engine| {
                for _ in 0..20 {
                    if engine.advance_quarter().is_err() {
                        break;
                    }
                }
                black_box(engine.world().turn)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_quarters);
criterion_main!(benches);
