//! Entity state and the pure per-tick transitions.

use crate::footprint::Footprint;
use ecogrid_core::{DeathCause, EntityId, Kind, Sex};
use serde::{Deserialize, Serialize};

pub const MAX_SIZE: u8 = 3;
/// Fraction of its mass an animal loses every tick.
pub const MASS_DECAY: f64 = 0.2;
pub const PLANT_GROWTH: f64 = 50.0;
pub const PLANT_MAX_MASS: f64 = 300.0;
pub const HUNGER_BASE: f64 = 15.0;
pub const HUNGER_PER_MASS: f64 = 0.2;
pub const LETHAL_HUNGER: f64 = 100.0;
pub const MAX_HEALTH: f64 = 100.0;

/// Number of cells an entity of the given mass occupies.
pub fn size_for_mass(mass: f64) -> u8 {
    let size = (mass / 100.0).floor() as i64 + 1;
    size.clamp(1, MAX_SIZE as i64) as u8
}

/// Outcome of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    Dead(DeathCause),
}

impl Vitality {
    pub fn is_alive(&self) -> bool {
        matches!(self, Vitality::Alive)
    }
}

/// Hunger, health and the stats derived from them, shared by all animals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub sex: Sex,
    pub hunger: f64,
    pub health: f64,
    pub speed: i32,
    pub hit_power: f64,
}

impl Vitals {
    pub fn newborn(sex: Sex, hit_power: f64) -> Self {
        let mut vitals = Self {
            sex,
            hunger: 0.0,
            health: MAX_HEALTH,
            speed: 0,
            hit_power,
        };
        vitals.refresh_speed();
        vitals
    }

    /// Per-tick hunger and health from the current mass.
    ///
    /// Hunger is replaced, not accumulated, and health mirrors it.
    pub fn metabolize(&mut self, mass: f64) -> Vitality {
        self.hunger = HUNGER_BASE + HUNGER_PER_MASS * mass;
        if self.hunger >= LETHAL_HUNGER {
            return Vitality::Dead(DeathCause::Starvation);
        }
        self.health = MAX_HEALTH - self.hunger;
        self.refresh_speed();
        Vitality::Alive
    }

    pub fn adjust_hunger(&mut self, delta: f64) -> Vitality {
        self.hunger = (self.hunger + delta).max(0.0);
        if self.hunger >= LETHAL_HUNGER {
            return Vitality::Dead(DeathCause::Starvation);
        }
        Vitality::Alive
    }

    pub fn adjust_health(&mut self, delta: f64) -> Vitality {
        self.health = (self.health + delta).min(MAX_HEALTH);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.refresh_speed();
            return Vitality::Dead(DeathCause::Exhaustion);
        }
        self.refresh_speed();
        Vitality::Alive
    }

    fn refresh_speed(&mut self) {
        self.speed = (self.health / 20.0).floor() as i32;
    }
}

/// Kind-specific state. Every rule matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Creature {
    Plant { toxic: bool },
    Herbivore(Vitals),
    Omnivore(Vitals),
    Carnivore { vitals: Vitals, aggressiveness: i32 },
}

impl Creature {
    pub fn kind(&self) -> Kind {
        match self {
            Creature::Plant { .. } => Kind::Plant,
            Creature::Herbivore(_) => Kind::Herbivore,
            Creature::Omnivore(_) => Kind::Omnivore,
            Creature::Carnivore { .. } => Kind::Carnivore,
        }
    }

    pub fn vitals(&self) -> Option<&Vitals> {
        match self {
            Creature::Plant { .. } => None,
            Creature::Herbivore(vitals) | Creature::Omnivore(vitals) => Some(vitals),
            Creature::Carnivore { vitals, .. } => Some(vitals),
        }
    }

    pub fn vitals_mut(&mut self) -> Option<&mut Vitals> {
        match self {
            Creature::Plant { .. } => None,
            Creature::Herbivore(vitals) | Creature::Omnivore(vitals) => Some(vitals),
            Creature::Carnivore { vitals, .. } => Some(vitals),
        }
    }

    /// Carnivore aggressiveness; zero for every other kind.
    pub fn aggressiveness(&self) -> i32 {
        match self {
            Creature::Carnivore { aggressiveness, .. } => *aggressiveness,
            Creature::Plant { .. } | Creature::Herbivore(_) | Creature::Omnivore(_) => 0,
        }
    }

    pub fn is_toxic(&self) -> bool {
        matches!(self, Creature::Plant { toxic: true })
    }
}

/// An entity in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub age: u32,
    pub mass: f64,
    pub size: u8,
    pub creature: Creature,
    pub footprint: Footprint,
}

impl Entity {
    /// A detached entity; its footprint is empty until placement.
    pub fn new(id: EntityId, age: u32, mass: f64, creature: Creature) -> Self {
        Self {
            id,
            age,
            mass,
            size: size_for_mass(mass),
            creature,
            footprint: Footprint::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.creature.kind()
    }

    pub fn sex(&self) -> Option<Sex> {
        self.creature.vitals().map(|vitals| vitals.sex)
    }

    pub fn vitals(&self) -> Option<&Vitals> {
        self.creature.vitals()
    }

    pub fn vitals_mut(&mut self) -> Option<&mut Vitals> {
        self.creature.vitals_mut()
    }

    pub fn hunger(&self) -> f64 {
        self.vitals().map_or(0.0, |vitals| vitals.hunger)
    }

    pub fn grow_older(&mut self, max_age: u32) -> Vitality {
        self.age += 1;
        if self.age >= max_age {
            Vitality::Dead(DeathCause::OldAge)
        } else {
            Vitality::Alive
        }
    }

    /// Exponential mass loss of one tick.
    pub fn decay_mass(&mut self) -> Vitality {
        self.adjust_mass(-MASS_DECAY * self.mass)
    }

    pub fn adjust_mass(&mut self, delta: f64) -> Vitality {
        self.mass += delta;
        if self.mass <= 0.0 {
            return Vitality::Dead(DeathCause::Wasting);
        }
        Vitality::Alive
    }

    /// Plant growth, capped at [`PLANT_MAX_MASS`].
    pub fn grow(&mut self) {
        self.mass = (self.mass + PLANT_GROWTH).min(PLANT_MAX_MASS);
    }

    /// Re-derive the size from the mass, returning whether it changed.
    pub fn refresh_size(&mut self) -> bool {
        let size = size_for_mass(self.mass);
        let changed = size != self.size;
        self.size = size;
        changed
    }
}
