//! Transient occupancy grid used while a layout is being generated.

use portal_snake_core::{Cell, GridBounds, WallSet};

/// Dense wall and forbidden-cell flags covering the border rectangle.
///
/// Cells outside the rectangle read as walls so that line and pillar placement
/// never escapes the border.
#[derive(Clone, Debug)]
pub(crate) struct Occupancy {
    bounds: GridBounds,
    width: usize,
    walls: Vec<bool>,
    forbidden: Vec<bool>,
}

impl Occupancy {
    pub(crate) fn new(bounds: GridBounds) -> Self {
        let width = usize::try_from(bounds.max_x() - bounds.min_x() + 1).unwrap_or(0);
        let height = usize::try_from(bounds.max_y() - bounds.min_y() + 1).unwrap_or(0);
        let capacity = width.checked_mul(height).unwrap_or(0);
        Self {
            bounds,
            width,
            walls: vec![false; capacity],
            forbidden: vec![false; capacity],
        }
    }

    pub(crate) fn set_wall(&mut self, cell: Cell) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = true;
        }
    }

    pub(crate) fn forbid(&mut self, cell: Cell) {
        if let Some(index) = self.index(cell) {
            self.forbidden[index] = true;
        }
    }

    pub(crate) fn is_wall(&self, cell: Cell) -> bool {
        self.index(cell).map_or(true, |index| self.walls[index])
    }

    pub(crate) fn is_blocked(&self, cell: Cell) -> bool {
        self.index(cell)
            .map_or(true, |index| self.walls[index] || self.forbidden[index])
    }

    /// Collects the wall flags into a wall set.
    pub(crate) fn walls(&self) -> WallSet {
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall)
            .map(|(index, _)| {
                let column = (index % self.width) as i32;
                let row = (index / self.width) as i32;
                Cell::new(self.bounds.min_x() + column, self.bounds.min_y() + row)
            })
            .collect()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.x() - self.bounds.min_x()).ok()?;
        let row = usize::try_from(cell.y() - self.bounds.min_y()).ok()?;
        row.checked_mul(self.width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_round_trip_through_flags() {
        let bounds = GridBounds::new(2, 3, 6, 7);
        let mut occupancy = Occupancy::new(bounds);
        occupancy.set_wall(Cell::new(4, 5));
        occupancy.forbid(Cell::new(3, 4));

        let walls = occupancy.walls();
        assert_eq!(walls.iter().collect::<Vec<_>>(), vec![Cell::new(4, 5)]);
        assert!(occupancy.is_blocked(Cell::new(3, 4)));
        assert!(!occupancy.is_wall(Cell::new(3, 4)));
        assert!(occupancy.is_wall(Cell::new(0, 0)), "outside cells read as walls");
    }
}
