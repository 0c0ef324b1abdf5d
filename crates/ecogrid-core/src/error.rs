//! Error types for the simulation.

use crate::types::{Coord, EntityId, Kind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Not enough free cells around the start coordinate for the entity's size.
///
/// The entity is discarded before it is ever registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not place {kind} of size {required} at {start}: only {claimed} cell(s) free")]
pub struct PlacementFailure {
    pub kind: Kind,
    pub start: Coord,
    pub required: usize,
    pub claimed: usize,
}

/// The grid and an entity's footprint disagree. Always a defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{entity} occupies {coord} but its footprint does not list it")]
    UnlistedOccupant { entity: EntityId, coord: Coord },

    #[error("{entity} lists {coord} in its footprint but the cell does not hold it")]
    MissingOccupant { entity: EntityId, coord: Coord },

    #[error("{entity} lists {coord} which is outside the grid")]
    OutOfBounds { entity: EntityId, coord: Coord },

    #[error("cell {coord} references {entity} which is not registered")]
    DanglingHandle { entity: EntityId, coord: Coord },

    #[error("{entity} holds {cells} cell(s) but has size {size}")]
    Oversized { entity: EntityId, cells: usize, size: u8 },

    #[error("cell {coord} lists {entity} more than once")]
    Duplicate { entity: EntityId, coord: Coord },
}
