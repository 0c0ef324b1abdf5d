//! Simulation engine for running an ecosystem.

use crate::clock::{Clock, ClockState, TickReport};
use crate::dice::{Dice, SeededDice};
use crate::entity::{Creature, Entity, Vitality, Vitals};
use crate::grid::Grid;
use crate::observe::WorldSnapshot;
use crate::registry::Registry;
use ecogrid_core::{
    Coord, DeathCause, EntityId, InvariantViolation, Kind, PlacementFailure, Population, Result,
    RulesConfig, Sex, SimulationConfig, WorldConfig,
};
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// Initial mass is drawn from `[1, 300)`.
pub const MASS_RANGE: (i32, i32) = (1, 300);
pub const HIT_POWER_RANGE: (i32, i32) = (15, 45);
pub const AGGRESSION_RANGE: (i32, i32) = (0, 100);
/// Plants propagate instead of growing with probability `1 / PROPAGATION_ODDS`.
pub const PROPAGATION_ODDS: i32 = 10;

/// The grid, the live population and the rules that drive them.
pub struct Ecosystem<D: Dice = SeededDice> {
    pub(crate) grid: Grid,
    pub(crate) registry: Registry,
    pub(crate) rules: RulesConfig,
    pub(crate) dice: D,
    clock: Clock,
    pub(crate) report: TickReport,
}

impl Ecosystem<SeededDice> {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_dice(
            &config.world,
            config.rules.clone(),
            SeededDice::new(config.seed),
        ))
    }
}

impl<D: Dice> Ecosystem<D> {
    pub fn with_dice(world: &WorldConfig, rules: RulesConfig, dice: D) -> Self {
        Self {
            grid: Grid::from_config(world),
            registry: Registry::new(),
            rules,
            dice,
            clock: Clock::new(),
            report: TickReport::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.registry.contains(id)
    }

    pub fn population(&self) -> Population {
        self.registry.population()
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    /// Report of the last completed tick
    pub fn last_report(&self) -> &TickReport {
        &self.report
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    /// Create an entity of `kind` with random attributes and place it at a
    /// random location. Nothing is registered if placement fails.
    pub fn create_and_place(
        &mut self,
        kind: Kind,
        age_seed: u32,
    ) -> std::result::Result<EntityId, PlacementFailure> {
        let entity = self.conceive(kind, age_seed);
        self.place_new(entity)
    }

    /// Place an entity with explicit attributes, claiming only empty
    /// neighbours of `start` like [`Ecosystem::create_and_place`] does.
    pub fn place_at(
        &mut self,
        age: u32,
        mass: f64,
        creature: Creature,
        start: Coord,
    ) -> std::result::Result<EntityId, PlacementFailure> {
        let id = self.registry.allocate_id();
        self.place_new_at(Entity::new(id, age, mass, creature), start)
    }

    /// Run one tick and return the population that survived it.
    ///
    /// Entities act in registration order. Entities removed earlier in the
    /// tick are skipped and newborns wait for the next tick.
    pub fn advance_tick(&mut self) -> Population {
        let tick = self.clock.begin();
        let growths_before = self.grid.growths();
        self.report = TickReport::new(tick);

        for id in self.registry.snapshot() {
            if !self.registry.contains(id) {
                continue;
            }
            self.act(id);
        }

        self.registry.compact();
        let population = self.registry.population();
        self.report.population = population;
        self.report.grid_growths = self.grid.growths() - growths_before;
        self.clock.finish(&population);

        debug_assert_eq!(self.verify_invariants(), Ok(()));

        debug!(
            tick,
            births = self.report.births,
            deaths = self.report.total_deaths(),
            grid_growths = self.report.grid_growths,
            population = population.total(),
            "Tick complete"
        );

        if self.clock.is_extinct() {
            info!(tick, "Population extinct");
        }

        population
    }

    fn act(&mut self, id: EntityId) {
        let Some(kind) = self.registry.get(id).map(Entity::kind) else {
            return;
        };
        if !self.pass_time(id) {
            return;
        }
        match kind {
            Kind::Plant => {}
            Kind::Herbivore => {
                self.wander(id);
                self.eat(id);
                self.reproduce(id);
            }
            Kind::Omnivore => {
                self.wander(id);
                self.eat(id);
                self.attack(id);
                self.reproduce(id);
            }
            Kind::Carnivore => {
                self.wander(id);
                self.roll_aggressiveness(id);
                self.attack(id);
                self.reproduce(id);
            }
        }
    }

    /// Passive update of one tick. Returns whether the entity survived.
    pub(crate) fn pass_time(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.registry.get_mut(id) else {
            return false;
        };
        let max_age = self.rules.for_kind(entity.kind()).max_age;

        if let Vitality::Dead(cause) = entity.grow_older(max_age) {
            self.kill(id, cause);
            return false;
        }

        match entity.kind() {
            Kind::Plant => return self.tend_plant(id),
            Kind::Herbivore | Kind::Omnivore | Kind::Carnivore => {}
        }

        let mass = entity.mass;
        let outcome = match entity.vitals_mut().map(|vitals| vitals.metabolize(mass)) {
            Some(Vitality::Dead(cause)) => Vitality::Dead(cause),
            Some(Vitality::Alive) | None => entity.decay_mass(),
        };
        if !self.settle(id, outcome, None) {
            return false;
        }
        self.refresh_size(id);
        true
    }

    /// A plant either propagates or grows each tick, never both.
    fn tend_plant(&mut self, id: EntityId) -> bool {
        if self.dice.one_in(PROPAGATION_ODDS) {
            self.propagate(id);
        } else {
            if let Some(plant) = self.registry.get_mut(id) {
                plant.grow();
            }
            self.refresh_size(id);
        }
        true
    }

    fn wander(&mut self, id: EntityId) {
        if self.is_alive(id) && self.dice.flip() {
            self.relocate(id);
        }
    }

    fn roll_aggressiveness(&mut self, id: EntityId) {
        let roll = self.dice.int(AGGRESSION_RANGE.0, AGGRESSION_RANGE.1);
        if let Some(Creature::Carnivore { aggressiveness, .. }) =
            self.registry.get_mut(id).map(|entity| &mut entity.creature)
        {
            *aggressiveness = roll;
        }
    }

    /// Remove an entity from the registry and retract its footprint in the
    /// same step. Killing an already removed entity is a no-op.
    pub(crate) fn kill(&mut self, id: EntityId, cause: DeathCause) -> bool {
        let Some(mut entity) = self.registry.remove(id) else {
            return false;
        };
        entity.footprint.release_all(&mut self.grid, id);
        self.report.record_death(cause);
        debug!(
            entity_id = %id,
            kind = %entity.kind(),
            age = entity.age,
            mass = entity.mass,
            cause = ?cause,
            tick = self.clock.tick(),
            "Entity died"
        );
        true
    }

    pub(crate) fn adjust_hunger(&mut self, id: EntityId, delta: f64) -> bool {
        let outcome = match self.registry.get_mut(id).and_then(Entity::vitals_mut) {
            Some(vitals) => vitals.adjust_hunger(delta),
            None => return self.is_alive(id),
        };
        self.settle(id, outcome, None)
    }

    /// Change health; `cause` overrides the death cause if it drops to zero.
    pub(crate) fn adjust_health(
        &mut self,
        id: EntityId,
        delta: f64,
        cause: Option<DeathCause>,
    ) -> bool {
        let outcome = match self.registry.get_mut(id).and_then(Entity::vitals_mut) {
            Some(vitals) => vitals.adjust_health(delta),
            None => return self.is_alive(id),
        };
        self.settle(id, outcome, cause)
    }

    /// Change mass and re-derive the footprint if the size changed.
    pub(crate) fn adjust_mass(&mut self, id: EntityId, delta: f64) -> bool {
        let outcome = match self.registry.get_mut(id) {
            Some(entity) => entity.adjust_mass(delta),
            None => return false,
        };
        if !self.settle(id, outcome, None) {
            return false;
        }
        self.refresh_size(id);
        true
    }

    fn refresh_size(&mut self, id: EntityId) {
        let changed = self
            .registry
            .get_mut(id)
            .map_or(false, Entity::refresh_size);
        if changed {
            self.reshape(id);
        }
    }

    fn settle(&mut self, id: EntityId, outcome: Vitality, cause: Option<DeathCause>) -> bool {
        match outcome {
            Vitality::Alive => true,
            Vitality::Dead(natural) => {
                self.kill(id, cause.unwrap_or(natural));
                false
            }
        }
    }

    /// A detached entity of `kind` with freshly rolled attributes.
    pub(crate) fn conceive(&mut self, kind: Kind, age: u32) -> Entity {
        let id = self.registry.allocate_id();
        let mass = self.dice.int(MASS_RANGE.0, MASS_RANGE.1) as f64;
        let creature = match kind {
            Kind::Plant => Creature::Plant {
                toxic: self.dice.flip(),
            },
            Kind::Herbivore => Creature::Herbivore(self.roll_vitals()),
            Kind::Omnivore => Creature::Omnivore(self.roll_vitals()),
            Kind::Carnivore => Creature::Carnivore {
                vitals: self.roll_vitals(),
                aggressiveness: 0,
            },
        };
        Entity::new(id, age, mass, creature)
    }

    fn roll_vitals(&mut self) -> Vitals {
        let sex = Sex::from_bool(self.dice.flip());
        let hit_power = self.dice.int(HIT_POWER_RANGE.0, HIT_POWER_RANGE.1) as f64;
        Vitals::newborn(sex, hit_power)
    }

    /// Read-only view of the world, consistent between ticks.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self.clock.tick(), &self.grid, &self.registry)
    }

    /// Check that the grid and every footprint agree in both directions.
    pub fn verify_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        for entity in self.registry.iter() {
            let cells = entity.footprint.len();
            if cells > entity.size as usize {
                return Err(InvariantViolation::Oversized {
                    entity: entity.id,
                    cells,
                    size: entity.size,
                });
            }
            for &coord in entity.footprint.cells() {
                if !self.grid.in_bounds(coord) {
                    return Err(InvariantViolation::OutOfBounds {
                        entity: entity.id,
                        coord,
                    });
                }
                if !self.grid.cell(coord).contains(entity.id) {
                    return Err(InvariantViolation::MissingOccupant {
                        entity: entity.id,
                        coord,
                    });
                }
            }
        }

        for (coord, cell) in self.grid.occupied() {
            let mut seen = HashSet::new();
            for &id in cell.occupants() {
                if !seen.insert(id) {
                    return Err(InvariantViolation::Duplicate { entity: id, coord });
                }
                match self.registry.get(id) {
                    None => return Err(InvariantViolation::DanglingHandle { entity: id, coord }),
                    Some(entity) if !entity.footprint.contains(coord) => {
                        return Err(InvariantViolation::UnlistedOccupant { entity: id, coord })
                    }
                    Some(_) => {}
                }
            }
        }

        trace!(entities = self.registry.len(), "Invariants verified");
        Ok(())
    }
}
