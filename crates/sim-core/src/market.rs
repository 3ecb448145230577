//! Markets and their growth classification.

use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size multiplier applied to a market for each recession quarter.
pub const RECESSION_SHRINK: f64 = 0.95;

/// Coarse growth label shown to players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthCategory {
    Low,
    Moderate,
    High,
}

impl GrowthCategory {
    pub fn from_rate(rate: f64) -> Self {
        if rate <= 0.083 {
            GrowthCategory::Low
        } else if rate <= 0.1166 {
            GrowthCategory::Moderate
        } else {
            GrowthCategory::High
        }
    }
}

impl fmt::Display for GrowthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GrowthCategory::Low => "Low",
            GrowthCategory::Moderate => "Moderate",
            GrowthCategory::High => "High",
        })
    }
}

/// A product market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    /// Quarterly revenue scale; tracks realized revenue outside recessions.
    pub size: f64,
    pub base_growth_rate: f64,
    /// Annual growth currently in effect, shifted by events.
    pub growth_rate: f64,
    pub is_in_global_recession: bool,
    pub recession_quarters_left: u32,
    pub last_quarter_total_revenue: f64,
    /// Revenue not owned by any company, present on spawned markets.
    pub seed_product: Option<Product>,
}

impl Market {
    pub fn new(name: impl Into<String>, size: f64, growth_rate: f64) -> Self {
        Self {
            name: name.into(),
            size,
            base_growth_rate: growth_rate,
            growth_rate,
            is_in_global_recession: false,
            recession_quarters_left: 0,
            last_quarter_total_revenue: 0.0,
            seed_product: None,
        }
    }

    /// Market with an imaginary product holding its entire opening revenue.
    pub fn seeded(name: impl Into<String>, size: f64, growth_rate: f64) -> Self {
        let mut market = Self::new(name, size, growth_rate);
        market.seed_product = Some(Product::market_seed(market.name.clone(), size));
        market
    }

    /// One recession quarter: shrink and count down, clearing the flag at zero.
    pub fn apply_recession(&mut self) {
        if !self.is_in_global_recession {
            return;
        }
        self.size *= RECESSION_SHRINK;
        self.recession_quarters_left = self.recession_quarters_left.saturating_sub(1);
        if self.recession_quarters_left == 0 {
            self.is_in_global_recession = false;
        }
    }

    pub fn enter_recession(&mut self, quarters: u32) {
        self.is_in_global_recession = true;
        self.recession_quarters_left = quarters;
    }

    pub fn clear_recession(&mut self) {
        self.is_in_global_recession = false;
        self.recession_quarters_left = 0;
    }

    pub fn reset_growth(&mut self) {
        self.growth_rate = self.base_growth_rate;
    }

    pub fn growth_category(&self) -> GrowthCategory {
        GrowthCategory::from_rate(self.growth_rate)
    }
}
