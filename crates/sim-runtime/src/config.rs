//! Game configuration loaded from YAML.

use serde::{Deserialize, Serialize};
use sim_ai::AiConfig;
use sim_core::{validate_config, SimConfig, ValidationError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// World parameters plus AI tier policies.
///
/// ```yaml
/// sim:
///   rng_seed: 7
///   start_year: 1995
/// ai:
///   acquisition_cooldown: 8
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub ai: AiConfig,
}

impl GameConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(&self.sim)?;
        for tier in sim_core::Tier::ALL {
            let p = self.ai.policy(tier);
            for (value, field) in [
                (p.bond.probability, "bond probability"),
                (p.campus_trigger, "campus trigger"),
                (p.entry_cash_fraction, "entry cash fraction"),
            ] {
                if !value.is_finite() {
                    return Err(ValidationError::NonFinite(field));
                }
                if !(0.0..=1.0).contains(&value) {
                    return Err(ValidationError::OutOfUnitRange(field));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.ai.bond_investment_share) {
            return Err(ValidationError::OutOfUnitRange("bond investment share"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let cfg = GameConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_yaml_str(include_str!("../../../configs/game.yaml")).unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = GameConfig::from_yaml_str("sim:\n  rng_seed: 7\nai:\n  acquisition_cooldown: 8\n").unwrap();
        assert_eq!(cfg.sim.rng_seed, 7);
        assert_eq!(cfg.sim.start_year, 2000);
        assert_eq!(cfg.ai.acquisition_cooldown, 8);
        assert_eq!(cfg.ai.acquisition_min_turn, 12);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.ai.large.bond.probability = 1.5;
        assert_eq!(
            cfg.validate(),
            Err(ValidationError::OutOfUnitRange("bond probability"))
        );
        let err = GameConfig::from_yaml_str("sim:\n  victory_share: 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
