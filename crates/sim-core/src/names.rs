//! Unique company and product names.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const COMPANY_PREFIXES: &[&str] = &[
    "Neuro", "Quantum", "Cyber", "Hyper", "Vertex", "Nexus", "Strato", "Zenith", "Titan", "Echo",
    "Horizon", "Aether", "Aurora", "Byte", "Nano", "Synth", "Vortex", "Sigma", "Meta", "Flux",
    "Pyro", "Velox", "Nova", "Sol", "Arc", "Phantom", "Neon", "Axion", "Helix", "Omni",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Tech", "AI", "Soft", "Dynamics", "Labs", "Industries", "Solutions", "Cloud", "Systems",
    "Robotics", "Analytics", "Works", "Data", "Networks", "Ventures", "Ops", "Forge", "Node",
    "Stream", "Hub",
];

const PRODUCT_PREFIXES: &[&str] = &[
    "Sky", "Neo", "Prime", "Nova", "Aero", "Delta", "Zeta", "Omega", "Quantum", "Hyper", "Green",
    "Cyber", "Mono", "Alpha", "Aqua",
];

const PRODUCT_SUFFIXES: &[&str] = &[
    "Flow", "Boost", "Hub", "Core", "Link", "Edge", "Sphere", "Guard", "Gate", "Layer", "Matrix",
    "Flash", "Pulse", "Logic", "Sense",
];

/// Random draws tried per pool combination before falling back to a counter.
const ATTEMPTS_PER_COMBINATION: usize = 5;

/// Hands out names that are unique across the whole game.
///
/// Names are drawn from curated prefix/suffix pools. Once random draws stop
/// finding free combinations a counter (`Company1`, `Product1`, ...) takes
/// over, so generation always terminates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NameGenerator {
    used: BTreeSet<String>,
    company_counter: u64,
    product_counter: u64,
}

impl NameGenerator {
    /// Mark an externally chosen name as taken. Returns false if it already was.
    pub fn reserve(&mut self, name: impl Into<String>) -> bool {
        self.used.insert(name.into())
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn release(&mut self, name: &str) {
        self.used.remove(name);
    }

    pub fn company_name<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if let Some(name) = self.draw(rng, COMPANY_PREFIXES, COMPANY_SUFFIXES) {
            return name;
        }
        loop {
            self.company_counter += 1;
            let name = format!("Company{}", self.company_counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }

    pub fn product_name<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if let Some(name) = self.draw(rng, PRODUCT_PREFIXES, PRODUCT_SUFFIXES) {
            return name;
        }
        loop {
            self.product_counter += 1;
            let name = format!("Product{}", self.product_counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }

    fn draw<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        prefixes: &[&str],
        suffixes: &[&str],
    ) -> Option<String> {
        let attempts = prefixes.len() * suffixes.len() * ATTEMPTS_PER_COMBINATION;
        for _ in 0..attempts {
            let pre = prefixes.choose(rng)?;
            let suf = suffixes.choose(rng)?;
            let candidate = format!("{pre}{suf}");
            if self.used.insert(candidate.clone()) {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn product_names_stay_unique_past_pool_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut names = NameGenerator::default();
        let pool = PRODUCT_PREFIXES.len() * PRODUCT_SUFFIXES.len();
        let drawn: BTreeSet<String> = (0..pool + 20).map(|_| names.product_name(&mut rng)).collect();
        assert_eq!(drawn.len(), pool + 20);
        assert!(drawn.contains("Product1"));
    }

    #[test]
    fn counter_skips_reserved_names() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut names = NameGenerator::default();
        for pre in COMPANY_PREFIXES {
            for suf in COMPANY_SUFFIXES {
                names.reserve(format!("{pre}{suf}"));
            }
        }
        names.reserve("Company1");
        assert_eq!(names.company_name(&mut rng), "Company2");
    }
}
