//! Dense occupancy model backing the arena.

use light_bike_core::{cell_index, CellCoord, GridSize, InvariantViolation, OccupancyView};

/// Bounds and occupancy truth for a single round.
///
/// Every cell that any trail ever entered stays occupied until [`reset`]
/// clears the grid for the next round. Occupying a cell twice is reported as
/// an [`InvariantViolation`] because correct movement resolution never does it.
///
/// [`reset`]: GridWorld::reset
#[derive(Clone, Debug)]
pub struct GridWorld {
    size: GridSize,
    cells: Vec<bool>,
}

impl GridWorld {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        Self {
            size,
            cells: vec![false; capacity],
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        self.size.contains(cell)
    }

    /// Reports whether the cell belongs to any trail.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        cell_index(self.size, cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Marks the cell as part of a trail.
    pub fn occupy(&mut self, cell: CellCoord) -> Result<(), InvariantViolation> {
        let slot = cell_index(self.size, cell)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(InvariantViolation::OutOfBounds {
                cell,
                grid: self.size,
            })?;
        if *slot {
            return Err(InvariantViolation::DoubleOccupy { cell });
        }
        *slot = true;
        Ok(())
    }

    /// Clears every trail cell, keeping the dimensions.
    pub fn reset(&mut self) {
        self.cells.fill(false);
    }

    /// Replaces the grid with an empty one of new dimensions.
    pub(crate) fn resize(&mut self, size: GridSize) {
        if self.size == size {
            self.reset();
        } else {
            *self = Self::new(size);
        }
    }

    /// Captures a read-only view for systems.
    #[must_use]
    pub fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.size)
    }
}
