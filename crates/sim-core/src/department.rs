//! Product departments and per-department storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A department employees can be assigned to on a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    /// Research and development ("r&d").
    Research,
    /// Quality assurance ("q&a").
    QualityAssurance,
    /// Marketing.
    Marketing,
}

impl Department {
    /// All departments in display order.
    pub const ALL: [Department; 3] = [
        Department::Research,
        Department::QualityAssurance,
        Department::Marketing,
    ];

    /// Order in which assignments are released when a company downsizes.
    pub const RELEASE_ORDER: [Department; 3] = [
        Department::Marketing,
        Department::QualityAssurance,
        Department::Research,
    ];

    /// Divisor of the exponential smoothing applied to department spend.
    /// Slower departments use a larger divisor.
    pub const fn smoothing_delay(self) -> f64 {
        match self {
            Department::Research => 5.0,
            Department::QualityAssurance => 3.0,
            Department::Marketing => 1.0,
        }
    }

    /// Weight of the department's smoothed spend in product effectiveness.
    pub const fn spend_weight(self) -> f64 {
        match self {
            Department::Research => 0.5,
            Department::QualityAssurance => 0.3,
            Department::Marketing => 0.2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Department::Research => "r&d",
            Department::QualityAssurance => "q&a",
            Department::Marketing => "marketing",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per department.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDepartment<T> {
    pub research: T,
    pub quality_assurance: T,
    pub marketing: T,
}

impl<T> PerDepartment<T> {
    pub fn new(research: T, quality_assurance: T, marketing: T) -> Self {
        Self {
            research,
            quality_assurance,
            marketing,
        }
    }

    /// Iterate `(department, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Department, &T)> {
        Department::ALL.into_iter().map(move |d| (d, &self[d]))
    }
}

impl PerDepartment<u32> {
    /// Sum of all department counts.
    pub fn total(&self) -> u32 {
        self.research + self.quality_assurance + self.marketing
    }
}

impl<T> Index<Department> for PerDepartment<T> {
    type Output = T;

    fn index(&self, dept: Department) -> &T {
        match dept {
            Department::Research => &self.research,
            Department::QualityAssurance => &self.quality_assurance,
            Department::Marketing => &self.marketing,
        }
    }
}

impl<T> IndexMut<Department> for PerDepartment<T> {
    fn index_mut(&mut self, dept: Department) -> &mut T {
        match dept {
            Department::Research => &mut self.research,
            Department::QualityAssurance => &mut self.quality_assurance,
            Department::Marketing => &mut self.marketing,
        }
    }
}
