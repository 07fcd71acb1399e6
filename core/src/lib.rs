#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Nav workspace.
//!
//! This crate defines the geometry vocabulary every other crate speaks: the
//! toroidal arena extent, wrapped cell coordinates, the entity snapshot type
//! delivered by the transport layer, and the fatal scenario-configuration
//! error. The arena has no edges: every position and every cell index wraps
//! modulo the world extent, and the helpers here are the single place that
//! wrapping arithmetic lives.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extent of the toroidal arena measured in world units.
///
/// Positions live in `[0, width) × [0, height)`; arithmetic that leaves that
/// range wraps around to the opposite edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaSize {
    width: u32,
    height: u32,
}

impl ArenaSize {
    /// Creates a new arena extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Arena width in world units.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Arena height in world units.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Center of the arena.
    #[must_use]
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Wraps a position back into `[0, width) × [0, height)`.
    #[must_use]
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.rem_euclid(self.width as f32),
            position.y.rem_euclid(self.height as f32),
        )
    }

    /// Shortest toroidal displacement from `b` to `a`.
    ///
    /// Each component lies in `[-extent / 2, extent / 2)`, so the returned
    /// vector always describes the short way around the torus.
    #[must_use]
    pub fn delta(&self, a: Vec2, b: Vec2) -> Vec2 {
        let w = self.width as f32;
        let h = self.height as f32;
        let mut dx = (a.x - b.x).rem_euclid(w);
        if dx >= w / 2.0 {
            dx -= w;
        }
        let mut dy = (a.y - b.y).rem_euclid(h);
        if dy >= h / 2.0 {
            dy -= h;
        }
        Vec2::new(dx, dy)
    }

    /// Squared toroidal distance between two positions.
    #[must_use]
    pub fn distance_squared(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length_squared()
    }

    /// Toroidal distance between two positions.
    #[must_use]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length()
    }
}

/// Location of a single grid cell expressed as wrapped column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Dimensions of a grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    columns: u32,
    rows: u32,
}

impl GridDims {
    /// Creates a new grid dimension descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        (self.columns as usize).saturating_mul(self.rows as usize)
    }

    /// Wraps signed column/row indices into a valid cell coordinate.
    ///
    /// Returns the cell the indices land on after travelling around the
    /// torus. An empty grid has no valid coordinate; `(0, 0)` is returned so
    /// callers stay panic-free, and no loaded scenario produces one.
    #[must_use]
    pub fn wrap(&self, column: i64, row: i64) -> CellCoord {
        if self.columns == 0 || self.rows == 0 {
            return CellCoord::new(0, 0);
        }
        let column = column.rem_euclid(i64::from(self.columns)) as u32;
        let row = row.rem_euclid(i64::from(self.rows)) as u32;
        CellCoord::new(column, row)
    }

    /// Whether the coordinate lies inside the grid without wrapping.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of an in-range cell.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = cell.row() as usize;
        let column = cell.column() as usize;
        Some(row * self.columns as usize + column)
    }
}

/// Maps a world position to the wrapped cell containing it.
#[must_use]
pub fn cell_of(position: Vec2, cell_size: u32, dims: GridDims) -> CellCoord {
    let size = cell_size.max(1) as f32;
    let column = (position.x / size).floor() as i64;
    let row = (position.y / size).floor() as i64;
    dims.wrap(column, row)
}

/// Axis-aligned direction of travel through the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// Column/row offset of a single step in this direction.
    #[must_use]
    pub const fn offset(&self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// World-space step of the given length in this direction.
    #[must_use]
    pub fn step(&self, length: f32) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f32 * length, dy as f32 * length)
    }
}

/// Closed set of entity kinds the spatial core distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Immovable terrain baked into the scenario grid.
    StaticWall,
    /// Destructible obstacle rasterized into the working grid every frame.
    DestructibleWall,
    /// Collectible item; never blocks movement.
    Pickup,
    /// In-flight projectile; never blocks movement.
    Projectile,
    /// Player- or bot-controlled agent.
    Agent,
}

impl EntityKind {
    /// Whether entities of this kind are rasterized as dynamic obstacles.
    #[must_use]
    pub const fn is_dynamic_obstacle(&self) -> bool {
        matches!(self, EntityKind::DestructibleWall)
    }
}

/// Snapshot of one live entity as delivered by the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Kind tag driving rasterization and search decisions.
    pub kind: EntityKind,
    /// Center position in world units.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Half-extent of the axis-aligned bounding box.
    pub half_size: Vec2,
}

impl Entity {
    /// Creates a stationary entity snapshot.
    #[must_use]
    pub const fn new(kind: EntityKind, position: Vec2, half_size: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            half_size,
        }
    }

    /// Minimum corner of the entity's bounding box.
    #[must_use]
    pub fn bottom_left(&self) -> Vec2 {
        self.position - self.half_size
    }

    /// Maximum corner of the entity's bounding box.
    #[must_use]
    pub fn top_right(&self) -> Vec2 {
        self.position + self.half_size
    }
}

/// Requested extent of a windowed grid view around the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sight {
    /// The full shifted grid, no windowing.
    Full,
    /// A square window reaching the given distance in world units.
    Square(u32),
    /// A rectangular window with per-axis reach in world units.
    Rect {
        /// Horizontal reach in world units.
        width: u32,
        /// Vertical reach in world units.
        height: u32,
    },
}

/// Fatal configuration error raised while loading a scenario.
///
/// A misconfigured grid would silently produce wrong answers for every
/// subsequent query, so setup must abort on any of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ScenarioError {
    /// The scenario grid has zero cells on at least one axis.
    #[error("scenario grid has no cells")]
    EmptyGrid,
    /// The arena extent does not match the native grid times its cell size.
    #[error(
        "native grid {columns}x{rows} at cell size {cell_size} does not cover arena {width}x{height}"
    )]
    AspectMismatch {
        /// Native grid columns.
        columns: u32,
        /// Native grid rows.
        rows: u32,
        /// Native cell size in world units.
        cell_size: u32,
        /// Arena width in world units.
        width: u32,
        /// Arena height in world units.
        height: u32,
    },
    /// The arena extent is not evenly divisible by the derived cell size.
    #[error("arena extent {extent} is not divisible by derived cell size {cell_size}")]
    CellSizeIndivisible {
        /// Offending arena extent in world units.
        extent: u32,
        /// Derived cell size in world units.
        cell_size: u32,
    },
    /// Native and derived cell sizes are not an integer multiple of each other.
    #[error("derived cell size {derived} is not an integer ratio of native cell size {native}")]
    FactorNotIntegral {
        /// Native cell size in world units.
        native: u32,
        /// Derived cell size in world units.
        derived: u32,
    },
}
