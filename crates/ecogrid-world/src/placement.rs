//! Placement of entities on the grid: creation, birth, movement and
//! footprint reshaping after a size change.

use crate::dice::Dice;
use crate::entity::Entity;
use crate::footprint::{neighbours, NEIGHBOUR_OFFSETS};
use crate::simulation::Ecosystem;
use ecogrid_core::{Coord, EntityId, PlacementFailure};
use tracing::{debug, info, trace};

impl<D: Dice> Ecosystem<D> {
    /// Place a freshly created entity at a random start cell.
    ///
    /// An occupied start is redrawn once; a second collision is tolerated.
    pub(crate) fn place_new(&mut self, entity: Entity) -> Result<EntityId, PlacementFailure> {
        let mut start = self.random_coord();
        if !self.grid.is_vacant(start) {
            start = self.random_coord();
        }
        self.place_new_at(entity, start)
    }

    /// Claim `start` plus empty in-bounds neighbours. The entity is
    /// discarded, not registered, when fewer than `size` cells are free.
    pub(crate) fn place_new_at(
        &mut self,
        mut entity: Entity,
        start: Coord,
    ) -> Result<EntityId, PlacementFailure> {
        let start = start.shifted(self.resize_if_needed(start));
        let id = entity.id;
        let required = entity.size as usize;

        entity.footprint.claim(&mut self.grid, id, start);
        for candidate in neighbours(start) {
            if entity.footprint.len() >= required {
                break;
            }
            if self.grid.in_bounds(candidate) && self.grid.is_vacant(candidate) {
                entity.footprint.claim(&mut self.grid, id, candidate);
            }
        }

        if entity.footprint.len() < required {
            let failure = PlacementFailure {
                kind: entity.kind(),
                start,
                required,
                claimed: entity.footprint.len(),
            };
            entity.footprint.release_all(&mut self.grid, id);
            self.report.placement_failures += 1;
            debug!(kind = %failure.kind, start = %start, required, claimed = failure.claimed, "Placement failed");
            return Err(failure);
        }

        trace!(entity_id = %id, kind = %entity.kind(), start = %start, size = entity.size, "Entity placed");
        self.registry.insert(entity);
        Ok(id)
    }

    /// Register a newborn at `coord`. Neighbours may already be occupied;
    /// out-of-bounds neighbours are skipped rather than grown into.
    pub(crate) fn place_newborn(&mut self, mut entity: Entity, coord: Coord) -> EntityId {
        let id = entity.id;
        let required = entity.size as usize;

        entity.footprint.claim(&mut self.grid, id, coord);
        for candidate in neighbours(coord) {
            if entity.footprint.len() >= required {
                break;
            }
            if self.grid.in_bounds(candidate) {
                entity.footprint.claim(&mut self.grid, id, candidate);
            }
        }

        self.registry.insert(entity);
        id
    }

    /// Move an animal by a random delta bounded by its speed.
    pub(crate) fn relocate(&mut self, id: EntityId) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let speed = entity.vitals().map_or(0, |vitals| vitals.speed);
        let Some(start) = entity.footprint.start() else {
            return;
        };
        if speed <= 0 {
            return;
        }

        let d_row = self.dice.int(-speed, speed + 1);
        let d_col = self.dice.int(-speed, speed + 1);
        let target = start.add(d_row, d_col);
        let target = target.shifted(self.resize_if_needed(target));

        if let Some(entity) = self.registry.get_mut(id) {
            entity.footprint.release_all(&mut self.grid, id);
            entity.footprint.claim(&mut self.grid, id, target);
        }
        self.claim_neighbours(id);

        trace!(entity_id = %id, from = %start, to = %target, "Entity moved");
    }

    /// Re-derive the footprint after a size change: every cell is released,
    /// then the start and `size - 1` neighbours are claimed again.
    pub(crate) fn reshape(&mut self, id: EntityId) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let Some(start) = entity.footprint.start() else {
            return;
        };
        entity.footprint.release_all(&mut self.grid, id);
        entity.footprint.claim(&mut self.grid, id, start);
        self.claim_neighbours(id);
    }

    /// Fill the footprint up to `size` cells around its start, stacking on
    /// occupied cells and growing the grid for out-of-bounds candidates.
    fn claim_neighbours(&mut self, id: EntityId) {
        for (d_row, d_col) in NEIGHBOUR_OFFSETS {
            // Re-read the start each time: a growth rebases every footprint.
            let Some(entity) = self.registry.get(id) else {
                return;
            };
            if entity.footprint.len() >= entity.size as usize {
                return;
            }
            let Some(start) = entity.footprint.start() else {
                return;
            };

            let candidate = start.add(d_row, d_col);
            let candidate = candidate.shifted(self.resize_if_needed(candidate));
            if let Some(entity) = self.registry.get_mut(id) {
                entity.footprint.claim(&mut self.grid, id, candidate);
            }
        }
    }

    /// Grow the grid until `coord` fits and rebase every footprint.
    /// Returns the offset the caller must apply to `coord`.
    pub(crate) fn resize_if_needed(&mut self, coord: Coord) -> i32 {
        let offset = self.grid.grow_to_fit(coord);
        if offset > 0 {
            self.registry.rebase(offset);
            info!(
                offset,
                margin = self.grid.margin(),
                height = self.grid.height,
                width = self.grid.width,
                tick = self.tick(),
                "Grid grown"
            );
        }
        offset
    }

    fn random_coord(&mut self) -> Coord {
        let row = self.dice.int(0, self.grid.height);
        let col = self.dice.int(0, self.grid.width);
        Coord::new(row, col)
    }
}
