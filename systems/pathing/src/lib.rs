#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nearest-entity breadth-first search with line-of-sight path
//! simplification.
//!
//! A [`PathGrid`] is a disposable cell mesh covering the arena at the native
//! scenario resolution. One query buckets the candidate entities into their
//! cells, floods outward from the start cell over the four wrapped
//! axis-neighbors, and stops at the first dequeued cell that holds a
//! candidate; breadth-first order makes that the nearest reachable one. The
//! route back through the predecessor links is then cut down to a single
//! checkpoint: the farthest cell along the route still in unobstructed line
//! of sight of the start, so agents steer in straight lines instead of
//! tracing the grid lattice.

use std::collections::VecDeque;

use arena_nav_core::{cell_of, CellCoord, Entity, GridDims};
use arena_nav_grid::{clean_path, OccupancyGrid};
use glam::Vec2;

/// Neighbor expansion order for the breadth-first search.
///
/// The order is arbitrary but deterministic; it decides which of several
/// equally-distant entities wins a tie, so changing it changes observable
/// results.
const NEIGHBOR_ORDER: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Search node tied to one grid cell, valid for the lifetime of one query.
#[derive(Clone, Debug)]
struct PathCell {
    coord: CellCoord,
    position: Vec2,
    visited: bool,
    prev: Option<usize>,
    next: Option<usize>,
    entities: Vec<usize>,
}

/// Simplified route from a start cell toward a discovered entity.
///
/// The checkpoint is the farthest cell along the reconstructed route that
/// remains in unobstructed line of sight of the start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Path {
    start: CellCoord,
    start_position: Vec2,
    end: CellCoord,
    checkpoint: CellCoord,
    checkpoint_position: Vec2,
}

impl Path {
    /// Cell the search started from.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Center of the start cell in world units.
    #[must_use]
    pub const fn start_position(&self) -> Vec2 {
        self.start_position
    }

    /// Cell containing the discovered entity.
    #[must_use]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Farthest route cell still visible from the start.
    #[must_use]
    pub const fn checkpoint(&self) -> CellCoord {
        self.checkpoint
    }

    /// Center of the checkpoint cell in world units.
    #[must_use]
    pub const fn checkpoint_position(&self) -> Vec2 {
        self.checkpoint_position
    }

    /// Direction from the start cell toward the checkpoint, in cell units.
    ///
    /// This is the direct (unwrapped) delta: the checkpoint was admitted by a
    /// line-of-sight test over the direct segment, so the direct heading is
    /// the one known to be walkable.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(
            i64::from(self.checkpoint.column()) as f32 - i64::from(self.start.column()) as f32,
            i64::from(self.checkpoint.row()) as f32 - i64::from(self.start.row()) as f32,
        )
    }
}

/// Result of a nearest-entity query: which candidate won and how to reach it.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestEntity {
    /// Index of the discovered entity within the candidate slice.
    pub entity: usize,
    /// Simplified route toward the entity's cell.
    pub path: Path,
}

/// Disposable breadth-first search mesh over the arena's native cells.
///
/// A mesh serves exactly one query: [`PathGrid::seek_closest`] consumes the
/// value, so stale predecessor links can never leak into a later frame.
#[derive(Clone, Debug)]
pub struct PathGrid {
    dims: GridDims,
    cell_size: u32,
    cells: Vec<PathCell>,
}

impl PathGrid {
    /// Creates a fresh mesh with every cell unvisited.
    #[must_use]
    pub fn new(dims: GridDims, cell_size: u32) -> Self {
        let size = cell_size.max(1) as f32;
        let mut cells = Vec::with_capacity(dims.cell_count());
        for row in 0..dims.rows() {
            for column in 0..dims.columns() {
                cells.push(PathCell {
                    coord: CellCoord::new(column, row),
                    position: Vec2::new(
                        (column as f32 + 0.5) * size,
                        (row as f32 + 0.5) * size,
                    ),
                    visited: false,
                    prev: None,
                    next: None,
                    entities: Vec::new(),
                });
            }
        }
        Self {
            dims,
            cell_size,
            cells,
        }
    }

    /// Creates a mesh matching an occupancy grid's dimensions.
    #[must_use]
    pub fn matching(grid: &OccupancyGrid, cell_size: u32) -> Self {
        Self::new(grid.dims(), cell_size)
    }

    /// Mesh dimensions in cells.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Finds the nearest candidate entity reachable through open cells of
    /// `wall` and a simplified path toward it.
    ///
    /// Consumes the mesh; a new one must be built for the next query. Returns
    /// `None` when no candidate is reachable, a normal outcome callers
    /// handle every frame rather than an error. The start cell is expanded
    /// even when it is blocked, so an agent overlapping an obstacle edge can
    /// still escape through a free neighbor.
    #[must_use]
    pub fn seek_closest(
        mut self,
        start: Vec2,
        entities: &[Entity],
        wall: &OccupancyGrid,
    ) -> Option<NearestEntity> {
        if wall.dims() != self.dims {
            debug_assert!(
                false,
                "wall dims {:?} do not match mesh dims {:?}",
                wall.dims(),
                self.dims
            );
            log::error!(
                "seek_closest called with mismatched grids: wall {:?}, mesh {:?}",
                wall.dims(),
                self.dims
            );
            return None;
        }
        if self.cells.is_empty() {
            return None;
        }

        for (index, entity) in entities.iter().enumerate() {
            let cell = cell_of(entity.position, self.cell_size, self.dims);
            let slot = self.index_of(cell);
            self.cells[slot].entities.push(index);
        }

        let start_cell = self.index_of(cell_of(start, self.cell_size, self.dims));
        self.cells[start_cell].visited = true;

        let mut queue = VecDeque::new();
        queue.push_back(start_cell);
        while let Some(current) = queue.pop_front() {
            if let Some(&entity) = self.cells[current].entities.first() {
                let path = self.reconstruct(start_cell, current, wall)?;
                return Some(NearestEntity { entity, path });
            }

            let column = i64::from(self.cells[current].coord.column());
            let row = i64::from(self.cells[current].coord.row());
            for (dx, dy) in NEIGHBOR_ORDER {
                let neighbor = self.index_of(self.dims.wrap(column + dx, row + dy));
                let cell = &mut self.cells[neighbor];
                if cell.visited || wall.is_blocked(cell.coord) {
                    continue;
                }
                cell.visited = true;
                cell.prev = Some(current);
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// Reconstructs the route from `end` back to `start` and simplifies it to
    /// a single line-of-sight checkpoint.
    ///
    /// A predecessor chain that fails to reach the start is a defect in the
    /// search itself; it asserts in debug builds and degrades to "no path"
    /// in release builds rather than returning a wrong route.
    fn reconstruct(&mut self, start: usize, end: usize, wall: &OccupancyGrid) -> Option<Path> {
        let start_coord = self.cells[start].coord;
        let start_position = self.cells[start].position;
        let end_coord = self.cells[end].coord;

        if start == end {
            return Some(Path {
                start: start_coord,
                start_position,
                end: end_coord,
                checkpoint: start_coord,
                checkpoint_position: start_position,
            });
        }

        let mut next = end;
        let mut cursor = self.cells[end].prev;
        let mut reached_start = false;
        while let Some(current) = cursor {
            self.cells[current].next = Some(next);
            if current == start {
                reached_start = true;
                break;
            }
            next = current;
            cursor = self.cells[current].prev;
        }
        if !reached_start {
            debug_assert!(false, "predecessor chain from {end_coord:?} never reached {start_coord:?}");
            log::error!(
                "broken predecessor chain: {end_coord:?} does not lead back to {start_coord:?}"
            );
            return None;
        }

        let mut checkpoint = start;
        let mut cursor = self.cells[start].next;
        loop {
            let Some(current) = cursor else {
                debug_assert!(false, "successor chain ended before reaching {end_coord:?}");
                log::error!(
                    "broken successor chain: {start_coord:?} does not lead to {end_coord:?}"
                );
                return None;
            };
            if !clean_path(
                wall,
                self.cell_size,
                start_position,
                self.cells[current].position,
            ) {
                break;
            }
            checkpoint = current;
            if current == end {
                break;
            }
            cursor = self.cells[current].next;
        }

        Some(Path {
            start: start_coord,
            start_position,
            end: end_coord,
            checkpoint: self.cells[checkpoint].coord,
            checkpoint_position: self.cells[checkpoint].position,
        })
    }

    fn index_of(&self, cell: CellCoord) -> usize {
        self.dims
            .index_of(cell)
            .unwrap_or_else(|| unreachable!("wrapped coordinate {cell:?} is always in range"))
    }
}

#[cfg(test)]
mod tests {
    use super::{Path, PathGrid};
    use arena_nav_core::{CellCoord, GridDims};
    use glam::Vec2;

    #[test]
    fn cell_centers_sit_mid_cell() {
        let mesh = PathGrid::new(GridDims::new(4, 3), 10);
        assert_eq!(mesh.cells[0].position, Vec2::new(5.0, 5.0));
        assert_eq!(mesh.cells[5].position, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn direction_is_the_direct_cell_delta() {
        let path = Path {
            start: CellCoord::new(30, 2),
            start_position: Vec2::new(305.0, 25.0),
            end: CellCoord::new(2, 2),
            checkpoint: CellCoord::new(2, 2),
            checkpoint_position: Vec2::new(25.0, 25.0),
        };
        assert_eq!(path.direction(), Vec2::new(-28.0, 0.0));
    }
}
