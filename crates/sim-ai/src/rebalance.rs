//! Deterministic redistribution of a company's staff across its products.

use sim_core::{Department, PerDepartment, ProductKey, QualityRank, World};
use tracing::error;

/// Spread between the best and worst product, as a share of an even split.
pub const HEADCOUNT_DEVIATION: f64 = 0.1;

/// A department's headcount change on one product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentChange {
    pub product: String,
    pub department: Department,
    pub delta: i64,
}

/// Round to nearest, ties to even.
fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        r
    }
}

fn share(fraction: f64, total: u32) -> u32 {
    round_half_even(fraction * f64::from(total)).max(0.0) as u32
}

/// Per-product headcount for `total` employees, indexed like `effectiveness`.
///
/// The least effective product gets ×0.9 of an even split and the most
/// effective ×1.1.
///
/// Products are ordered by ascending effectiveness and positions are mapped
/// linearly onto `[-1, 1]` between those two factors. Rounding leftovers
/// are added starting from the last position, or removed starting from
/// position 0, never going below zero. The result always sums to `total`.
pub fn plan_headcount(effectiveness: &[f64], total: u32) -> Vec<u32> {
    let n = effectiveness.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![total];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| effectiveness[a].total_cmp(&effectiveness[b]));

    let baseline = f64::from(total) / n as f64;
    let mid = (n - 1) as f64 / 2.0;
    // Indexed by sorted position.
    let mut planned: Vec<u32> = (0..n)
        .map(|i| {
            let factor = (i as f64 - mid) / mid;
            round_half_even(baseline + factor * HEADCOUNT_DEVIATION * baseline).max(0.0) as u32
        })
        .collect();

    let mut diff = i64::from(total) - planned.iter().map(|&v| i64::from(v)).sum::<i64>();
    let mut step = 0usize;
    while diff > 0 {
        planned[n - 1 - step % n] += 1;
        diff -= 1;
        step += 1;
    }
    while diff < 0 {
        let pos = step % n;
        if planned[pos] > 0 {
            planned[pos] -= 1;
            diff += 1;
        }
        step += 1;
    }

    let mut out = vec![0; n];
    for (pos, &idx) in order.iter().enumerate() {
        out[idx] = planned[pos];
    }
    out
}

/// Department split for a product with `target` staff at quality `rank`.
///
/// Weak products lean on research, strong ones on QA and marketing. The
/// last department named in each band takes whatever rounding leaves over.
pub fn split_departments(target: u32, rank: QualityRank) -> PerDepartment<u32> {
    let pair = |a: f64, b: f64| {
        let first = share(a, target).min(target);
        let second = share(b, target).min(target - first);
        (first, second, target - first - second)
    };
    match rank {
        QualityRank::VeryBad | QualityRank::Bad => {
            let (research, marketing, qa) = pair(0.6, 0.3);
            PerDepartment::new(research, qa, marketing)
        }
        QualityRank::Moderate => {
            let (research, qa, marketing) = pair(0.4, 0.3);
            PerDepartment::new(research, qa, marketing)
        }
        QualityRank::Good | QualityRank::VeryGood => {
            let (qa, marketing, research) = pair(0.4, 0.5);
            PerDepartment::new(research, qa, marketing)
        }
    }
}

/// Reassign every employee of `company` across its products and departments.
///
/// Returns the non-zero department deltas in product-name order. A company
/// without products keeps its assignments untouched.
pub fn rebalance_assignments(world: &mut World, company: &str) -> Vec<AssignmentChange> {
    let Some(c) = world.company(company) else {
        return Vec::new();
    };
    if c.products.is_empty() {
        return Vec::new();
    }
    let employees = c.employees;
    let names: Vec<String> = c.products.keys().cloned().collect();
    let effectiveness: Vec<f64> = c.products.values().map(|p| p.effectiveness).collect();
    let headcount = plan_headcount(&effectiveness, employees);
    let ranks: Vec<QualityRank> = names
        .iter()
        .map(|n| {
            world
                .quality_rank(&ProductKey::owned(company, n.as_str()))
                .unwrap_or(QualityRank::Moderate)
        })
        .collect();

    let Some(c) = world.company_mut(company) else {
        return Vec::new();
    };
    let mut changes = Vec::new();
    for ((name, target), rank) in names.iter().zip(headcount).zip(ranks) {
        let Some(product) = c.products.get_mut(name) else {
            continue;
        };
        let split = split_departments(target, rank);
        for dept in Department::ALL {
            let delta = i64::from(split[dept]) - i64::from(product.assigned[dept]);
            if delta != 0 {
                changes.push(AssignmentChange {
                    product: name.clone(),
                    department: dept,
                    delta,
                });
            }
        }
        product.assigned = split;
    }

    let assigned = c.assigned_total();
    if assigned != employees {
        error!(company, assigned, employees, "assignment total does not match headcount");
        debug_assert_eq!(assigned, employees, "rebalance lost employees for {company}");
    }
    changes
}

/// Competitor-feed line for an assignment change.
pub fn change_headline(company: &str, change: &AssignmentChange) -> String {
    if change.delta > 0 {
        format!(
            "{company} assigned {} additional employees to {} for product '{}'.",
            change.delta, change.department, change.product
        )
    } else {
        format!(
            "{company} removed {} employees from {} for product '{}'.",
            -change.delta, change.department, change.product
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{Campus, Company, Market, Product, SimConfig, Tier};

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(2.4), 2.0);
        assert_eq!(round_half_even(2.6), 3.0);
    }

    #[test]
    fn least_effective_gets_fewer_staff() {
        // Two products: baseline 50, least effective 45, most effective 55.
        assert_eq!(plan_headcount(&[3.0, 1.0], 100), vec![55, 45]);
        assert_eq!(plan_headcount(&[2.0], 7), vec![7]);
        assert!(plan_headcount(&[], 7).is_empty());
    }

    #[test]
    fn most_effective_gets_the_larger_share_whatever_the_input_order() {
        // Baseline 100: worst ×0.9, middle ×1.0, best ×1.1.
        assert_eq!(plan_headcount(&[1.0, 5.0, 3.0], 300), vec![90, 110, 100]);
    }

    #[test]
    fn rounding_leftover_goes_to_last_position() {
        // One employee: every share rounds to 0 and the leftover goes to the
        // most effective product. Two: every share rounds to 1 and the extra
        // comes off the least effective.
        assert_eq!(plan_headcount(&[1.0, 2.0, 3.0], 1), vec![0, 0, 1]);
        assert_eq!(plan_headcount(&[1.0, 2.0, 3.0], 2), vec![0, 1, 1]);
    }

    #[test]
    fn split_follows_rank_bands() {
        assert_eq!(split_departments(10, QualityRank::VeryBad), PerDepartment::new(6, 1, 3));
        assert_eq!(split_departments(10, QualityRank::Moderate), PerDepartment::new(4, 3, 3));
        assert_eq!(split_departments(10, QualityRank::VeryGood), PerDepartment::new(1, 4, 5));
        assert_eq!(split_departments(0, QualityRank::Good).total(), 0);
        assert_eq!(split_departments(1, QualityRank::Good), PerDepartment::new(1, 0, 0));
    }

    #[test]
    fn rebalance_reports_deltas() {
        let player = Company::new("Player Co", None, 0.0, 0).with_campus(Campus::garage());
        let mut w = World::new(&SimConfig::default(), player);
        w.markets.push(Market::new("Cloud", 1_000_000.0, 0.1));
        let mut good = Product::new("Acme", "Cloud").with_staff(5, 0, 0);
        good.effectiveness = 2.0;
        let c = Company::new("Acme", Some(Tier::Startup), 0.0, 10).with_product("Solo", good);
        w.ai_companies.push(c);

        let changes = rebalance_assignments(&mut w, "Acme");
        let p = &w.company("Acme").unwrap().products["Solo"];
        // Sole product in its market ranks very good.
        assert_eq!(p.assigned, PerDepartment::new(1, 4, 5));
        assert_eq!(changes.len(), 3);
        let research = changes.iter().find(|c| c.department == Department::Research).unwrap();
        assert_eq!(research.delta, -4);
        assert_eq!(
            change_headline("Acme", research),
            "Acme removed 4 employees from r&d for product 'Solo'."
        );
        assert!(rebalance_assignments(&mut w, "Acme").is_empty());
    }

    proptest! {
        #[test]
        fn plan_sums_to_total(eff in proptest::collection::vec(0.0f64..10.0, 1..12), total in 0u32..5_000) {
            let plan = plan_headcount(&eff, total);
            prop_assert_eq!(plan.len(), eff.len());
            prop_assert_eq!(plan.iter().sum::<u32>(), total);
        }

        #[test]
        fn split_sums_to_target(target in 0u32..10_000, rank in 0usize..5) {
            let rank = [
                QualityRank::VeryBad,
                QualityRank::Bad,
                QualityRank::Moderate,
                QualityRank::Good,
                QualityRank::VeryGood,
            ][rank];
            prop_assert_eq!(split_departments(target, rank).total(), target);
        }
    }
}
