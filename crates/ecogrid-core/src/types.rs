//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of an entity in the registry.
///
/// Handles are allocated from a monotonic counter and never reused, so a
/// stale handle can always be detected by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cell coordinate on the grid. `row` indexes the outer dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn add(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Shift both axes by the same amount (used when the grid grows).
    pub fn shifted(&self, offset: i32) -> Self {
        self.add(offset, offset)
    }

    /// Chebyshev distance, i.e. the number of king moves between two cells.
    pub fn chebyshev_distance(&self, other: &Coord) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four kinds of entity living on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Plant,
    Herbivore,
    Omnivore,
    Carnivore,
}

impl Kind {
    pub fn all() -> [Kind; 4] {
        [Kind::Plant, Kind::Herbivore, Kind::Omnivore, Kind::Carnivore]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Plant => "plant",
            Kind::Herbivore => "herbivore",
            Kind::Omnivore => "omnivore",
            Kind::Carnivore => "carnivore",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_bool(male: bool) -> Self {
        if male {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

/// Why an entity left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Wasting,
    Exhaustion,
    LostFight,
    Eaten,
    Poisoned,
}

impl DeathCause {
    pub fn all() -> [DeathCause; 7] {
        [
            DeathCause::OldAge,
            DeathCause::Starvation,
            DeathCause::Wasting,
            DeathCause::Exhaustion,
            DeathCause::LostFight,
            DeathCause::Eaten,
            DeathCause::Poisoned,
        ]
    }
}

/// Live population broken down by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub plants: usize,
    pub herbivores: usize,
    pub omnivores: usize,
    pub carnivores: usize,
}

impl Population {
    pub fn record(&mut self, kind: Kind) {
        *self.slot_mut(kind) += 1;
    }

    pub fn of(&self, kind: Kind) -> usize {
        match kind {
            Kind::Plant => self.plants,
            Kind::Herbivore => self.herbivores,
            Kind::Omnivore => self.omnivores,
            Kind::Carnivore => self.carnivores,
        }
    }

    pub fn total(&self) -> usize {
        self.plants + self.herbivores + self.omnivores + self.carnivores
    }

    pub fn is_extinct(&self) -> bool {
        self.total() == 0
    }

    fn slot_mut(&mut self, kind: Kind) -> &mut usize {
        match kind {
            Kind::Plant => &mut self.plants,
            Kind::Herbivore => &mut self.herbivores,
            Kind::Omnivore => &mut self.omnivores,
            Kind::Carnivore => &mut self.carnivores,
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total ({} plants, {} herbivores, {} omnivores, {} carnivores)",
            self.total(),
            self.plants,
            self.herbivores,
            self.omnivores,
            self.carnivores
        )
    }
}
