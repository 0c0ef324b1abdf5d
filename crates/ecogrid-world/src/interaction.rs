//! Encounters between entities sharing a cell: fights, feeding and mating.

use crate::dice::Dice;
use crate::entity::{Creature, Entity};
use crate::simulation::Ecosystem;
use ecogrid_core::{Coord, DeathCause, EntityId, Kind};
use tracing::{debug, trace};

/// Minimum hunger before an animal picks a fight.
pub const ATTACK_HUNGER: f64 = 30.0;
/// Minimum aggressiveness for a carnivore to attack another carnivore.
pub const RIVAL_AGGRESSION: i32 = 30;
/// Hunger at which a carnivore's bias against herbivores flips sign.
pub const HUNGER_PIVOT: f64 = 50.0;
pub const HUNGER_BIAS: f64 = 0.1;
pub const CARNIVORE_MASS_FACTOR: f64 = 0.3;
pub const AGGRESSION_FACTOR: f64 = 0.2;
pub const OMNIVORE_MASS_FACTOR: f64 = 0.5;
/// The defender scales the attacker's mass by this, not its own.
pub const DEFENDER_MASS_FACTOR: f64 = 0.5;

/// Share of the food's mass subtracted from the eater's hunger.
pub const SATIATION: f64 = 0.3;
/// Share of the food's mass the eater gains.
pub const MASS_GAIN: f64 = 0.5;
pub const HEALING: f64 = 0.3;

/// Whether `attacker` starts a fight with `defender`.
pub fn will_attack(attacker: &Entity, defender: &Entity) -> bool {
    if attacker.id == defender.id {
        return false;
    }
    let hungry = attacker.hunger() > ATTACK_HUNGER;
    match (attacker.kind(), defender.kind()) {
        (_, Kind::Plant) => false,
        (Kind::Carnivore, Kind::Carnivore) => {
            hungry && attacker.creature.aggressiveness() > RIVAL_AGGRESSION
        }
        (Kind::Carnivore, Kind::Herbivore | Kind::Omnivore) => hungry,
        (Kind::Omnivore, Kind::Herbivore | Kind::Omnivore | Kind::Carnivore) => hungry,
        (Kind::Plant | Kind::Herbivore, _) => false,
    }
}

/// Roll bonus of a hunting animal against a herbivore.
fn hunger_bias(hunger: f64) -> f64 {
    if hunger > HUNGER_PIVOT {
        hunger * HUNGER_BIAS
    } else if hunger < HUNGER_PIVOT {
        -hunger * HUNGER_BIAS
    } else {
        0.0
    }
}

/// Combat-relevant stats captured before the dice are rolled.
#[derive(Debug, Clone, Copy)]
struct Fighter {
    id: EntityId,
    kind: Kind,
    mass: f64,
    hunger: f64,
    aggressiveness: i32,
    hit_power: f64,
}

impl From<&Entity> for Fighter {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind(),
            mass: entity.mass,
            hunger: entity.hunger(),
            aggressiveness: entity.creature.aggressiveness(),
            hit_power: entity.vitals().map_or(0.0, |vitals| vitals.hit_power),
        }
    }
}

impl<D: Dice> Ecosystem<D> {
    /// Fight every eligible animal sharing a cell with `id`, until `id` dies.
    pub(crate) fn attack(&mut self, id: EntityId) {
        self.for_each_neighbour(id, |eco, other| {
            let (Some(attacker), Some(defender)) = (eco.registry.get(id), eco.registry.get(other))
            else {
                return;
            };
            if will_attack(attacker, defender) {
                eco.fight(id, other);
            }
        });
    }

    /// Resolve one fight. Ties go to the attacker.
    pub(crate) fn fight(&mut self, attacker: EntityId, defender: EntityId) {
        let (Some(a), Some(d)) = (self.registry.get(attacker), self.registry.get(defender)) else {
            return;
        };
        let a = Fighter::from(a);
        let d = Fighter::from(d);

        let (attack, defence) = match d.kind {
            Kind::Plant => return,
            Kind::Herbivore => {
                let attack = self.dice.int(0, 100) as f64 + hunger_bias(a.hunger);
                (attack, self.dice.int(0, 100) as f64)
            }
            Kind::Omnivore | Kind::Carnivore => {
                let roll = self.dice.int(0, 100) as f64;
                let attack = match a.kind {
                    Kind::Carnivore => {
                        roll + a.mass * CARNIVORE_MASS_FACTOR
                            + a.aggressiveness as f64 * AGGRESSION_FACTOR
                    }
                    Kind::Plant | Kind::Herbivore | Kind::Omnivore => {
                        roll + a.mass * OMNIVORE_MASS_FACTOR
                    }
                };
                (attack, self.dice.int(0, 100) as f64 + a.mass * DEFENDER_MASS_FACTOR)
            }
        };

        let attacker_won = attack >= defence;
        debug!(
            attacker = %a.id,
            attacker_kind = %a.kind,
            defender = %d.id,
            defender_kind = %d.kind,
            attack,
            defence,
            attacker_won,
            "Fight"
        );

        if attacker_won {
            self.kill(d.id, DeathCause::LostFight);
            self.feed(a.id, d.mass, true);
            return;
        }
        match d.kind {
            Kind::Herbivore => {
                self.adjust_health(a.id, -d.hit_power, Some(DeathCause::LostFight));
            }
            Kind::Plant | Kind::Omnivore | Kind::Carnivore => {
                self.kill(a.id, DeathCause::LostFight);
                self.feed(d.id, a.mass, true);
            }
        }
    }

    /// Eat the plants sharing a cell with `id`.
    pub(crate) fn eat(&mut self, id: EntityId) {
        self.for_each_neighbour(id, |eco, other| {
            let (Some(eater), Some(food)) = (eco.registry.get(id), eco.registry.get(other)) else {
                return;
            };
            let Creature::Plant { toxic } = food.creature else {
                return;
            };
            let eater_kind = eater.kind();
            let food_mass = food.mass;

            if toxic {
                let poisoned = match eater_kind {
                    Kind::Herbivore => eco.dice.flip(),
                    Kind::Omnivore => true,
                    Kind::Plant | Kind::Carnivore => return,
                };
                if poisoned {
                    eco.kill(id, DeathCause::Poisoned);
                }
                return;
            }

            let heals = match eater_kind {
                Kind::Herbivore => false,
                Kind::Omnivore => true,
                Kind::Plant | Kind::Carnivore => return,
            };
            trace!(eater = %id, plant = %other, food_mass, "Plant eaten");
            eco.kill(other, DeathCause::Eaten);
            eco.feed(id, food_mass, heals);
        });
    }

    /// Mate with the first mature partner of the opposite sex found on the
    /// footprint. At most one child per call.
    pub(crate) fn reproduce(&mut self, id: EntityId) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let kind = entity.kind();
        let maturity = self.rules.for_kind(kind).maturity_age;
        let Some(sex) = entity.sex() else {
            return;
        };
        if entity.age < maturity {
            return;
        }

        let is_mate = |other: EntityId| {
            other != id
                && self.registry.get(other).map_or(false, |mate| {
                    mate.kind() == kind
                        && mate.age >= maturity
                        && mate.sex().map_or(false, |mate_sex| mate_sex != sex)
                })
        };
        let nest = entity
            .footprint
            .cells()
            .iter()
            .copied()
            .find(|&coord| self.grid.contents(coord).iter().any(|&other| is_mate(other)));

        if let Some(coord) = nest {
            self.spawn_child(kind, coord);
        }
    }

    /// Asexual reproduction of a plant at a random cell of its footprint.
    pub(crate) fn propagate(&mut self, id: EntityId) {
        let Some(len) = self.registry.get(id).map(|plant| plant.footprint.len()) else {
            return;
        };
        let index = self.dice.int(0, len as i32);
        let coord = self
            .registry
            .get(id)
            .and_then(|plant| plant.footprint.cells().get(index as usize).copied());
        if let Some(coord) = coord {
            self.spawn_child(Kind::Plant, coord);
        }
    }

    fn spawn_child(&mut self, kind: Kind, coord: Coord) -> EntityId {
        let child = self.conceive(kind, 0);
        let id = self.place_newborn(child, coord);
        self.report.births += 1;
        debug!(entity_id = %id, kind = %kind, at = %coord, tick = self.tick(), "Entity born");
        id
    }

    /// Apply the gains of eating something of `food_mass`.
    fn feed(&mut self, id: EntityId, food_mass: f64, heals: bool) {
        if !self.adjust_hunger(id, -SATIATION * food_mass) {
            return;
        }
        if !self.adjust_mass(id, MASS_GAIN * food_mass) {
            return;
        }
        if heals {
            self.adjust_health(id, HEALING * food_mass, None);
        }
    }

    /// Visit every other live occupant of the cells `id` holds, in footprint
    /// then arrival order, while `id` is alive.
    ///
    /// The footprint is read by index on each step because a visit may grow
    /// the grid or reshape the footprint; occupants are snapshotted per cell.
    fn for_each_neighbour(&mut self, id: EntityId, mut visit: impl FnMut(&mut Self, EntityId)) {
        let mut index = 0;
        loop {
            let Some(coord) = self
                .registry
                .get(id)
                .and_then(|entity| entity.footprint.cells().get(index).copied())
            else {
                return;
            };
            index += 1;

            let cell = self.grid.cell(coord);
            if !cell.is_shared() {
                continue;
            }
            for other in cell.occupants().to_vec() {
                if !self.registry.contains(id) {
                    return;
                }
                if other == id || !self.registry.contains(other) {
                    continue;
                }
                visit(self, other);
            }
        }
    }
}
