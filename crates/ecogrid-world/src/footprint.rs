//! The cells one entity occupies.

use crate::grid::Grid;
use ecogrid_core::{Coord, EntityId};
use serde::{Deserialize, Serialize};

/// Neighbour offsets in claim order: rows {0, -1, +1} x columns {0, -1, +1},
/// without the centre cell.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (-1, 1),
    (1, 0),
    (1, -1),
    (1, 1),
];

/// Candidate cells around `start`, in claim order.
pub fn neighbours(start: Coord) -> impl Iterator<Item = Coord> {
    NEIGHBOUR_OFFSETS
        .into_iter()
        .map(move |(d_row, d_col)| start.add(d_row, d_col))
}

/// Ordered, duplicate-free list of the cells held by one entity.
///
/// The first cell is the start cell. Every grid write on behalf of an entity
/// goes through its footprint so the two never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    cells: Vec<Coord>,
}

impl Footprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Occupy `coord` for `owner` and record it. Returns `false` if the cell
    /// was already held.
    pub(crate) fn claim(&mut self, grid: &mut Grid, owner: EntityId, coord: Coord) -> bool {
        if self.contains(coord) {
            return false;
        }
        grid.occupy(coord, owner);
        self.cells.push(coord);
        true
    }

    /// Vacate every held cell and forget them.
    pub(crate) fn release_all(&mut self, grid: &mut Grid, owner: EntityId) {
        for coord in self.cells.drain(..) {
            grid.vacate(coord, owner);
        }
    }

    /// Translate every cell after the grid grew by `offset`.
    pub(crate) fn rebase(&mut self, offset: i32) {
        for coord in &mut self.cells {
            *coord = coord.shifted(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbour_order() {
        let start = Coord::new(50, 50);
        let order: Vec<Coord> = neighbours(start).collect();
        assert_eq!(order.len(), 8);
        assert_eq!(order[0], Coord::new(50, 49));
        assert_eq!(order[1], Coord::new(50, 51));
        assert_eq!(order[2], Coord::new(49, 50));
        assert_eq!(order[7], Coord::new(51, 51));
        assert!(!order.contains(&start));
    }

    #[test]
    fn test_claim_and_release() {
        let mut grid = Grid::new(10, 10, 5);
        let owner = EntityId(1);
        let mut footprint = Footprint::new();

        assert!(footprint.claim(&mut grid, owner, Coord::new(4, 4)));
        assert!(footprint.claim(&mut grid, owner, Coord::new(4, 3)));
        assert!(!footprint.claim(&mut grid, owner, Coord::new(4, 4)));

        assert_eq!(footprint.len(), 2);
        assert_eq!(footprint.start(), Some(Coord::new(4, 4)));
        assert_eq!(grid.contents(Coord::new(4, 3)), &[owner]);

        footprint.release_all(&mut grid, owner);
        assert!(footprint.is_empty());
        assert!(grid.occupied().next().is_none());
    }

    #[test]
    fn test_rebase() {
        let mut footprint = Footprint {
            cells: vec![Coord::new(0, 99), Coord::new(0, 98)],
        };
        footprint.rebase(5);
        assert_eq!(footprint.cells(), &[Coord::new(5, 104), Coord::new(5, 103)]);
    }
}
