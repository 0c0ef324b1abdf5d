//! Read-only views of the world for drivers and tests.

use crate::entity::Entity;
use crate::grid::Grid;
use crate::registry::Registry;
use ecogrid_core::{Coord, EntityId, Kind, Population, Sex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: Kind,
    pub age: u32,
    pub mass: f64,
    pub size: u8,
    pub footprint: Vec<Coord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunger: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toxic: Option<bool>,
}

impl From<&Entity> for EntityView {
    fn from(entity: &Entity) -> Self {
        let vitals = entity.vitals();
        let toxic = match entity.kind() {
            Kind::Plant => Some(entity.creature.is_toxic()),
            Kind::Herbivore | Kind::Omnivore | Kind::Carnivore => None,
        };
        Self {
            id: entity.id,
            kind: entity.kind(),
            age: entity.age,
            mass: entity.mass,
            size: entity.size,
            footprint: entity.footprint.cells().to_vec(),
            sex: vitals.map(|v| v.sex),
            hunger: vitals.map(|v| v.hunger),
            health: vitals.map(|v| v.health),
            toxic,
        }
    }
}

/// An occupied cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub coord: Coord,
    pub occupants: Vec<EntityId>,
}

/// Everything observable about the world between two ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub height: i32,
    pub width: i32,
    pub population: Population,
    /// Occupied cells only, in row-major order
    pub cells: Vec<CellView>,
    pub entities: Vec<EntityView>,
}

impl WorldSnapshot {
    pub(crate) fn capture(tick: u64, grid: &Grid, registry: &Registry) -> Self {
        Self {
            tick,
            height: grid.height,
            width: grid.width,
            population: registry.population(),
            cells: grid
                .occupied()
                .map(|(coord, cell)| CellView {
                    coord,
                    occupants: cell.occupants().to_vec(),
                })
                .collect(),
            entities: registry.iter().map(EntityView::from).collect(),
        }
    }

    /// Occupants of `coord`; empty for vacant or out-of-range cells.
    pub fn contents(&self, coord: Coord) -> &[EntityId] {
        match self
            .cells
            .binary_search_by_key(&(coord.row, coord.col), |cell| (cell.coord.row, cell.coord.col))
        {
            Ok(index) => &self.cells[index].occupants,
            Err(_) => &[],
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.iter().find(|view| view.id == id)
    }

    pub fn to_json(&self) -> ecogrid_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
