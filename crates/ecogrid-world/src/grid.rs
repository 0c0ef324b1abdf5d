//! 2D occupancy grid for the world.

use ecogrid_core::{Coord, EntityId, WorldConfig};
use serde::{Deserialize, Serialize};

/// Contents of one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    One(EntityId),
    /// Two or more distinct occupants, in arrival order.
    Many(Vec<EntityId>),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Whether several entities share this cell.
    pub fn is_shared(&self) -> bool {
        matches!(self, Cell::Many(_))
    }

    pub fn occupants(&self) -> &[EntityId] {
        match self {
            Cell::Empty => &[],
            Cell::One(id) => std::slice::from_ref(id),
            Cell::Many(ids) => ids,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.occupants().contains(&id)
    }

    fn insert(&mut self, id: EntityId) {
        match self {
            Cell::Empty => *self = Cell::One(id),
            Cell::One(existing) if *existing == id => {}
            Cell::One(existing) => *self = Cell::Many(vec![*existing, id]),
            Cell::Many(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    fn remove(&mut self, id: EntityId) -> bool {
        match self {
            Cell::Empty => false,
            Cell::One(existing) => {
                if *existing == id {
                    *self = Cell::Empty;
                    true
                } else {
                    false
                }
            }
            Cell::Many(ids) => {
                let Some(index) = ids.iter().position(|occupant| *occupant == id) else {
                    return false;
                };
                ids.remove(index);
                match ids.len() {
                    0 => *self = Cell::Empty,
                    1 => *self = Cell::One(ids[0]),
                    _ => {}
                }
                true
            }
        }
    }
}

/// A bounded grid that grows by a fixed margin on every side.
///
/// Out-of-range coordinates are never wrapped or clamped: callers must grow
/// the grid first, and indexing outside it panics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub height: i32,
    pub width: i32,
    margin: i32,
    growths: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(height: i32, width: i32, margin: i32) -> Self {
        let size = (height * width) as usize;
        Self {
            height,
            width,
            margin,
            growths: 0,
            cells: vec![Cell::Empty; size],
        }
    }

    /// Create an empty grid from world configuration
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.height, config.width, config.growth_margin)
    }

    pub fn margin(&self) -> i32 {
        self.margin
    }

    /// How many times the grid has grown since creation
    pub fn growths(&self) -> u32 {
        self.growths
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        (0..self.height).contains(&coord.row) && (0..self.width).contains(&coord.col)
    }

    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.cells[self.index(coord)]
    }

    /// Occupants of a cell
    pub fn contents(&self, coord: Coord) -> &[EntityId] {
        self.cell(coord).occupants()
    }

    pub fn is_vacant(&self, coord: Coord) -> bool {
        self.cell(coord).is_empty()
    }

    /// Add `id` to the cell. Adding an occupant twice is a no-op.
    pub fn occupy(&mut self, coord: Coord, id: EntityId) {
        let index = self.index(coord);
        self.cells[index].insert(id);
    }

    /// Remove `id` from the cell, returning whether it was there.
    pub fn vacate(&mut self, coord: Coord, id: EntityId) -> bool {
        let index = self.index(coord);
        self.cells[index].remove(id)
    }

    /// Grow by one margin on every side and return the offset applied to
    /// every existing coordinate.
    pub fn grow(&mut self) -> i32 {
        let margin = self.margin;
        let new_height = self.height + 2 * margin;
        let new_width = self.width + 2 * margin;
        let mut cells = vec![Cell::Empty; (new_height * new_width) as usize];

        for (index, cell) in std::mem::take(&mut self.cells).into_iter().enumerate() {
            let row = index as i32 / self.width + margin;
            let col = index as i32 % self.width + margin;
            cells[(row * new_width + col) as usize] = cell;
        }

        self.cells = cells;
        self.height = new_height;
        self.width = new_width;
        self.growths += 1;
        margin
    }

    /// Grow until `coord` fits, returning the total offset applied (0 when it
    /// was already in bounds). `coord` itself is not translated.
    pub fn grow_to_fit(&mut self, coord: Coord) -> i32 {
        let mut offset = 0;
        while !self.in_bounds(coord.shifted(offset)) {
            offset += self.grow();
        }
        offset
    }

    fn index(&self, coord: Coord) -> usize {
        assert!(
            self.in_bounds(coord),
            "coordinate {} outside {}x{} grid",
            coord,
            self.height,
            self.width
        );
        (coord.row * self.width + coord.col) as usize
    }

    /// Get coordinate from index
    pub fn index_to_coord(&self, index: usize) -> Coord {
        let row = (index as i32) / self.width;
        let col = (index as i32) % self.width;
        Coord::new(row, col)
    }

    /// Iterator over all cells with coordinates
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_coord(i), cell))
    }

    /// Iterator over non-empty cells
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.iter().filter(|(_, cell)| !cell.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> EntityId {
        EntityId(n)
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(100, 100, 5);
        assert_eq!(grid.height, 100);
        assert_eq!(grid.width, 100);
        assert_eq!(grid.cells.len(), 10_000);
        assert!(grid.iter().all(|(_, cell)| cell.is_empty()));
    }

    #[test]
    fn test_occupy_promotes_cell() {
        let mut grid = Grid::new(10, 10, 5);
        let coord = Coord::new(3, 4);

        grid.occupy(coord, id(1));
        assert_eq!(grid.cell(coord), &Cell::One(id(1)));

        grid.occupy(coord, id(2));
        assert_eq!(grid.cell(coord), &Cell::Many(vec![id(1), id(2)]));

        grid.occupy(coord, id(3));
        assert_eq!(grid.contents(coord), &[id(1), id(2), id(3)]);
    }

    #[test]
    fn test_occupy_twice_is_noop() {
        let mut grid = Grid::new(10, 10, 5);
        let coord = Coord::new(0, 0);

        grid.occupy(coord, id(1));
        grid.occupy(coord, id(1));
        assert_eq!(grid.cell(coord), &Cell::One(id(1)));

        grid.occupy(coord, id(2));
        grid.occupy(coord, id(2));
        assert_eq!(grid.contents(coord).len(), 2);
    }

    #[test]
    fn test_vacate_demotes_cell() {
        let mut grid = Grid::new(10, 10, 5);
        let coord = Coord::new(9, 9);
        grid.occupy(coord, id(1));
        grid.occupy(coord, id(2));
        grid.occupy(coord, id(3));

        assert!(grid.vacate(coord, id(2)));
        assert_eq!(grid.cell(coord), &Cell::Many(vec![id(1), id(3)]));

        assert!(grid.vacate(coord, id(1)));
        assert_eq!(grid.cell(coord), &Cell::One(id(3)));

        assert!(grid.vacate(coord, id(3)));
        assert!(grid.is_vacant(coord));
    }

    #[test]
    fn test_vacate_absent_is_noop() {
        let mut grid = Grid::new(10, 10, 5);
        let coord = Coord::new(2, 2);
        assert!(!grid.vacate(coord, id(1)));

        grid.occupy(coord, id(1));
        assert!(!grid.vacate(coord, id(2)));
        assert_eq!(grid.cell(coord), &Cell::One(id(1)));
    }

    #[test]
    fn test_grow_rebases_occupants() {
        let mut grid = Grid::new(10, 10, 5);
        grid.occupy(Coord::new(0, 0), id(1));
        grid.occupy(Coord::new(9, 3), id(2));
        grid.occupy(Coord::new(9, 3), id(3));

        let offset = grid.grow();
        assert_eq!(offset, 5);
        assert_eq!(grid.height, 20);
        assert_eq!(grid.width, 20);
        assert_eq!(grid.growths(), 1);

        assert_eq!(grid.contents(Coord::new(5, 5)), &[id(1)]);
        assert_eq!(grid.contents(Coord::new(14, 8)), &[id(2), id(3)]);
        assert_eq!(grid.occupied().count(), 2);
    }

    #[test]
    fn test_grow_to_fit() {
        let mut grid = Grid::new(100, 100, 5);
        assert_eq!(grid.grow_to_fit(Coord::new(50, 50)), 0);
        assert_eq!(grid.growths(), 0);

        assert_eq!(grid.grow_to_fit(Coord::new(50, 104)), 5);
        assert_eq!(grid.growths(), 1);
        assert!(grid.in_bounds(Coord::new(55, 109)));

        // Far outside needs more than one margin
        assert_eq!(grid.grow_to_fit(Coord::new(-12, 0)), 15);
        assert_eq!(grid.growths(), 4);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let grid = Grid::new(10, 10, 5);
        grid.contents(Coord::new(10, 0));
    }
}
