//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Kind;
use serde::{Deserialize, Serialize};

/// Grid geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Initial number of rows
    pub height: i32,
    /// Initial number of columns
    pub width: i32,
    /// Cells added on every side each time the grid grows
    pub growth_margin: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height: 100,
            width: 100,
            growth_margin: 5,
        }
    }
}

/// Life-cycle thresholds for one kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindRules {
    /// The entity dies once its age reaches this value
    pub max_age: u32,
    /// Minimum age of both partners for sexual reproduction
    pub maturity_age: u32,
}

/// Per-kind life-cycle thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub plant: KindRules,
    pub herbivore: KindRules,
    pub omnivore: KindRules,
    pub carnivore: KindRules,
}

impl RulesConfig {
    pub fn for_kind(&self, kind: Kind) -> &KindRules {
        match kind {
            Kind::Plant => &self.plant,
            Kind::Herbivore => &self.herbivore,
            Kind::Omnivore => &self.omnivore,
            Kind::Carnivore => &self.carnivore,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        let animal = KindRules {
            max_age: 30,
            maturity_age: 20,
        };
        Self {
            // Plants reproduce asexually, maturity does not apply
            plant: KindRules {
                max_age: 30,
                maturity_age: 0,
            },
            herbivore: animal,
            omnivore: animal,
            carnivore: animal,
        }
    }
}

/// Relative creation weights per kind (normalised when drawn)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindWeights {
    pub plant: f64,
    pub herbivore: f64,
    pub omnivore: f64,
    pub carnivore: f64,
}

impl KindWeights {
    pub fn weight(&self, kind: Kind) -> f64 {
        match kind {
            Kind::Plant => self.plant,
            Kind::Herbivore => self.herbivore,
            Kind::Omnivore => self.omnivore,
            Kind::Carnivore => self.carnivore,
        }
    }

    pub fn total(&self) -> f64 {
        Kind::all().iter().map(|kind| self.weight(*kind)).sum()
    }
}

impl Default for KindWeights {
    fn default() -> Self {
        // Half plants, the other half split evenly between the animals
        Self {
            plant: 3.0,
            herbivore: 1.0,
            omnivore: 1.0,
            carnivore: 1.0,
        }
    }
}

/// Initial world seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of creation attempts (placement failures are not retried)
    pub total_entity_count: usize,
    pub kind_weights: KindWeights,
    /// Start ages are drawn uniformly from `0..max_start_age`
    pub max_start_age: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            total_entity_count: 10_000,
            kind_weights: KindWeights::default(),
            max_start_age: 30,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Safety cap on the number of ticks the driver runs (`None` = until extinct)
    pub max_ticks: Option<u64>,
    pub world: WorldConfig,
    pub rules: RulesConfig,
    pub generation: GenerationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_ticks: Some(10_000),
            world: WorldConfig::default(),
            rules: RulesConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.width < 3 || self.world.height < 3 {
            return Err(Error::Validation(format!(
                "grid must be at least 3x3, got {}x{}",
                self.world.height, self.world.width
            )));
        }
        if self.world.growth_margin < 1 {
            return Err(Error::Validation(format!(
                "growth margin must be positive, got {}",
                self.world.growth_margin
            )));
        }
        for kind in Kind::all() {
            let rules = self.rules.for_kind(kind);
            if rules.max_age == 0 {
                return Err(Error::Validation(format!("{} max_age must be positive", kind)));
            }
            let weight = self.generation.kind_weights.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Validation(format!(
                    "{} weight must be a non-negative number, got {}",
                    kind, weight
                )));
            }
        }
        if self.generation.total_entity_count > 0 && self.generation.kind_weights.total() <= 0.0 {
            return Err(Error::Validation(
                "at least one kind weight must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_start_ages_stay_below_max_age() {
        let config = SimulationConfig::default();
        assert_eq!(config.generation.max_start_age, 30);
        for rules in [
            &config.rules.plant,
            &config.rules.herbivore,
            &config.rules.omnivore,
            &config.rules.carnivore,
        ] {
            assert!(config.generation.max_start_age <= rules.max_age);
        }
    }

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 100);
        assert_eq!(config.world.height, 100);
        assert_eq!(config.world.growth_margin, 5);
        assert_eq!(config.rules.carnivore.max_age, 30);
        assert_eq!(config.generation.total_entity_count, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_weights_half_plants() {
        let weights = KindWeights::default();
        assert!((weights.plant / weights.total() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json(r#"{ "seed": 7, "world": { "width": 40 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.world.width, 40);
        assert_eq!(config.world.height, 100);
        assert_eq!(config.rules.herbivore.maturity_age, 20);
    }

    #[test]
    fn test_validation_rejects_bad_margin() {
        let mut config = SimulationConfig::default();
        config.world.growth_margin = 0;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_zero_weights() {
        let mut config = SimulationConfig::default();
        config.generation.kind_weights = KindWeights {
            plant: 0.0,
            herbivore: 0.0,
            omnivore: 0.0,
            carnivore: 0.0,
        };
        assert!(config.validate().is_err());
    }
}
