//! Campuses: owned office space that caps headcount and sets overhead.

use serde::{Deserialize, Serialize};

/// A campus a company owns or can build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campus {
    pub label: String,
    /// Purchase cost in USD, also its book value.
    pub cost: f64,
    /// Overhead as a fraction of base employee cost.
    pub overhead: f64,
    /// Employees the campus can hold.
    pub capacity: u32,
}

impl Campus {
    pub fn new(label: impl Into<String>, cost: f64, overhead: f64, capacity: u32) -> Self {
        Self {
            label: label.into(),
            cost,
            overhead,
            capacity,
        }
    }

    pub fn garage() -> Self {
        Self::new("Garage", 0.0, 0.0, 10)
    }
}

/// Campus types available for construction, kept sorted by cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Campus>", into = "Vec<Campus>")]
pub struct CampusCatalog {
    entries: Vec<Campus>,
}

impl From<Vec<Campus>> for CampusCatalog {
    fn from(entries: Vec<Campus>) -> Self {
        Self::new(entries)
    }
}

impl From<CampusCatalog> for Vec<Campus> {
    fn from(catalog: CampusCatalog) -> Self {
        catalog.entries
    }
}

impl CampusCatalog {
    pub fn new(mut entries: Vec<Campus>) -> Self {
        entries.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        Self { entries }
    }

    pub fn entries(&self) -> &[Campus] {
        &self.entries
    }

    pub fn find(&self, label: &str) -> Option<&Campus> {
        self.entries.iter().find(|c| c.label == label)
    }

    /// Campuses costing strictly less than `cash`, cheapest first.
    pub fn affordable(&self, cash: f64) -> Vec<&Campus> {
        self.entries.iter().filter(|c| c.cost < cash).collect()
    }
}

impl Default for CampusCatalog {
    fn default() -> Self {
        Self::new(vec![
            Campus::garage(),
            Campus::new("Small Office", 250_000.0, 0.02, 50),
            Campus::new("Medium Office", 1_000_000.0, 0.03, 90),
            Campus::new("Large Office", 2_500_000.0, 0.04, 125),
            Campus::new("Large Building", 5_000_000.0, 0.08, 250),
            Campus::new("Corporate Park", 12_000_000.0, 0.10, 600),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affordable_is_sorted_and_bounded() {
        let catalog = CampusCatalog::default();
        let labels: Vec<_> = catalog
            .affordable(1_000_000.5)
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, ["Garage", "Small Office", "Medium Office"]);
    }

    #[test]
    fn yaml_shape_is_a_plain_list() {
        let catalog = CampusCatalog::new(vec![Campus::new("Loft", 10.0, 0.01, 5), Campus::garage()]);
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());
        assert_eq!(catalog.entries()[0].label, "Garage");
    }
}
