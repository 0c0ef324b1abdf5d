//! Initial world population.

use crate::dice::Dice;
use crate::simulation::Ecosystem;
use ecogrid_core::{GenerationConfig, Kind, KindWeights, Population};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Outcome of [`Ecosystem::populate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub attempted: usize,
    pub placed: Population,
    pub placement_failures: usize,
}

/// Draw a kind proportionally to its weight.
pub fn pick_kind(weights: &KindWeights, dice: &mut impl Dice) -> Kind {
    let mut target = dice.unit() * weights.total();
    let mut last = Kind::Plant;
    for kind in Kind::all() {
        let weight = weights.weight(kind);
        if weight <= 0.0 {
            continue;
        }
        if target < weight {
            return kind;
        }
        target -= weight;
        last = kind;
    }
    last
}

impl<D: Dice> Ecosystem<D> {
    /// Create `total_entity_count` entities at random locations. Entities
    /// that cannot be placed are dropped, not retried.
    #[instrument(skip_all, fields(count = config.total_entity_count))]
    pub fn populate(&mut self, config: &GenerationConfig) -> GenerationSummary {
        let mut summary = GenerationSummary {
            attempted: config.total_entity_count,
            ..Default::default()
        };
        let max_start_age = i32::try_from(config.max_start_age).unwrap_or(i32::MAX);

        for _ in 0..config.total_entity_count {
            let kind = pick_kind(&config.kind_weights, &mut self.dice);
            let age = self.dice.int(0, max_start_age).max(0) as u32;
            match self.create_and_place(kind, age) {
                Ok(_) => summary.placed.record(kind),
                Err(_) => summary.placement_failures += 1,
            }
        }

        info!(
            placed = summary.placed.total(),
            plants = summary.placed.plants,
            herbivores = summary.placed.herbivores,
            omnivores = summary.placed.omnivores,
            carnivores = summary.placed.carnivores,
            placement_failures = summary.placement_failures,
            height = self.grid().height,
            width = self.grid().width,
            "World generated"
        );
        summary
    }
}
