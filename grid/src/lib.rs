#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Occupancy-grid layer of the Arena Nav workspace.
//!
//! [`GridView`] owns the static picture of a loaded scenario: the native
//! terrain grid exactly as the scenario message delivered it, and a fixed
//! derived grid resampled once at the configured cell size. Every simulation
//! frame, [`GridView::update`] stamps the current dynamic obstacles on top of
//! the fixed grid and hands back a [`FrameGrid`], an owned value that answers
//! the windowed-view, line-of-sight, and region-collision queries for that
//! frame and is then discarded. Nothing here is thread-safe by design;
//! callers serialize one full update per frame.

mod occupancy;

pub use occupancy::OccupancyGrid;

use arena_nav_core::{
    cell_of, ArenaSize, CellCoord, Direction, Entity, GridDims, ScenarioError, Sight,
};
use glam::Vec2;

/// Native-resolution scenario description received at level load.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    arena: ArenaSize,
    cell_size: u32,
    grid: OccupancyGrid,
}

impl Scenario {
    /// Creates a scenario description from its transport-level pieces.
    #[must_use]
    pub const fn new(arena: ArenaSize, cell_size: u32, grid: OccupancyGrid) -> Self {
        Self {
            arena,
            cell_size,
            grid,
        }
    }

    /// Arena extent in world units.
    #[must_use]
    pub const fn arena(&self) -> ArenaSize {
        self.arena
    }

    /// World units covered by one native grid cell.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Native-resolution terrain grid.
    #[must_use]
    pub const fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }
}

/// Occupancy view of the arena at a configurable derived resolution.
///
/// Grid dimensions are fixed once a scenario loads; only cell contents change
/// per frame, and those live in the [`FrameGrid`] values produced by
/// [`GridView::update`].
#[derive(Clone, Debug)]
pub struct GridView {
    grid_factor: u32,
    arena: ArenaSize,
    native_cell_size: u32,
    native: OccupancyGrid,
    fixed: OccupancyGrid,
}

impl GridView {
    /// Builds the view for a freshly loaded scenario.
    ///
    /// `grid_factor` is the derived cell size in world units. Fails fast on
    /// any configuration mismatch: a misconfigured grid would serve wrong
    /// answers to every query, so these are load-time errors.
    pub fn from_scenario(grid_factor: u32, scenario: Scenario) -> Result<Self, ScenarioError> {
        let fixed = build_fixed_grid(grid_factor, &scenario)?;
        let Scenario {
            arena,
            cell_size,
            grid,
        } = scenario;
        Ok(Self {
            grid_factor,
            arena,
            native_cell_size: cell_size,
            native: grid,
            fixed,
        })
    }

    /// Replaces the loaded scenario, rebuilding the fixed grid.
    ///
    /// On error the previous scenario is left untouched.
    pub fn set_scenario(&mut self, scenario: Scenario) -> Result<(), ScenarioError> {
        *self = Self::from_scenario(self.grid_factor, scenario)?;
        Ok(())
    }

    /// Derived cell size in world units.
    #[must_use]
    pub const fn grid_factor(&self) -> u32 {
        self.grid_factor
    }

    /// Arena extent in world units.
    #[must_use]
    pub const fn arena(&self) -> ArenaSize {
        self.arena
    }

    /// World units covered by one native cell.
    #[must_use]
    pub const fn native_cell_size(&self) -> u32 {
        self.native_cell_size
    }

    /// Native-resolution terrain grid, unchanged since scenario load.
    #[must_use]
    pub const fn native(&self) -> &OccupancyGrid {
        &self.native
    }

    /// Dimensions of the derived grid in cells.
    #[must_use]
    pub fn derived_dims(&self) -> GridDims {
        self.fixed.dims()
    }

    /// Rebuilds the per-frame working grids from the current entity snapshot.
    ///
    /// The fixed grid is copied, every dynamic-obstacle entity is rasterized
    /// on top with toroidal splitting, and a second copy is circularly
    /// shifted so the viewer's cell lands at the grid center. Windowed views
    /// around the viewer then reduce to a centered slice.
    #[must_use]
    pub fn update(&self, entities: &[Entity], viewer: &Entity) -> FrameGrid {
        let mut working = self.fixed.clone();
        for entity in entities {
            if entity.kind.is_dynamic_obstacle() {
                self.rasterize(entity, &mut working);
            }
        }

        let factor = i64::from(self.grid_factor.max(1));
        let half = self.arena.half();
        let shift_x = ((viewer.position.x - half.x).floor() as i64).div_euclid(factor);
        let shift_y = ((viewer.position.y - half.y).floor() as i64).div_euclid(factor);
        let shifted = working.shifted(shift_x, shift_y);

        FrameGrid {
            grid_factor: self.grid_factor,
            working,
            shifted,
        }
    }

    /// Casts an axis-aligned ray against the native terrain grid.
    ///
    /// Steps along `direction` in native-cell-size increments and returns the
    /// distance from `origin` to the near boundary of the first blocked cell,
    /// or `max_distance` when the ray stays clear. Sampling wraps around the
    /// arena seams; the returned distance never exceeds `max_distance`.
    #[must_use]
    pub fn ray(&self, origin: Vec2, direction: Direction, max_distance: f32) -> f32 {
        if max_distance <= 0.0 {
            return 0.0;
        }
        let cell_size = self.native_cell_size.max(1);
        let size = cell_size as f32;
        let step = direction.step(size);
        let dims = self.native.dims();
        let steps = (max_distance / size) as u64 + 1;

        let mut point = origin;
        for _ in 0..steps {
            point += step;
            if self.native.is_blocked(cell_of(point, cell_size, dims)) {
                let distance = match direction {
                    Direction::East => (point.x / size).floor() * size - origin.x,
                    Direction::West => origin.x - ((point.x / size).floor() + 1.0) * size,
                    Direction::North => (point.y / size).floor() * size - origin.y,
                    Direction::South => origin.y - ((point.y / size).floor() + 1.0) * size,
                };
                return distance.clamp(0.0, max_distance);
            }
        }
        max_distance
    }

    fn rasterize(&self, entity: &Entity, working: &mut OccupancyGrid) {
        let factor = self.grid_factor.max(1) as f32;
        let bottom_left = entity.bottom_left();
        let top_right = entity.top_right();
        let x1 = (bottom_left.x / factor).floor() as i64;
        let x2 = (top_right.x / factor).ceil() as i64;
        let y1 = (bottom_left.y / factor).floor() as i64;
        let y2 = (top_right.y / factor).ceil() as i64;
        log::trace!(
            "rasterize {:?} at ({}, {}) into cells [{x1}, {x2}) x [{y1}, {y2})",
            entity.kind,
            entity.position.x,
            entity.position.y,
        );
        working.fill_rect_wrapped(x1, y1, x2, y2);
    }
}

/// One frame's occupancy picture: fixed terrain plus rasterized dynamic
/// obstacles, owned by the frame that built it and discarded afterwards.
#[derive(Clone, Debug)]
pub struct FrameGrid {
    grid_factor: u32,
    working: OccupancyGrid,
    shifted: OccupancyGrid,
}

impl FrameGrid {
    /// Derived cell size in world units.
    #[must_use]
    pub const fn grid_factor(&self) -> u32 {
        self.grid_factor
    }

    /// Working grid in arena coordinates.
    #[must_use]
    pub const fn working(&self) -> &OccupancyGrid {
        &self.working
    }

    /// Working grid circularly shifted so the viewer sits at the center.
    #[must_use]
    pub const fn shifted(&self) -> &OccupancyGrid {
        &self.shifted
    }

    /// Half-extent of the window a sight request produces, in cells per axis,
    /// clamped to half the grid extent. [`Sight::Full`] reports the clamp
    /// bound itself; [`FrameGrid::view`] serves it as the whole grid.
    #[must_use]
    pub fn sight_extent(&self, sight: Sight) -> (u32, u32) {
        let dims = self.shifted.dims();
        let half_columns = dims.columns() / 2;
        let half_rows = dims.rows() / 2;
        let factor = self.grid_factor.max(1);
        match sight {
            Sight::Full => (half_columns, half_rows),
            Sight::Square(reach) => (
                (reach / factor).min(half_columns),
                (reach / factor).min(half_rows),
            ),
            Sight::Rect { width, height } => (
                (width / factor).min(half_columns),
                (height / factor).min(half_rows),
            ),
        }
    }

    /// Rectangular window of the shifted grid centered on the viewer.
    ///
    /// [`Sight::Full`] returns the entire shifted grid unwindowed, so odd
    /// grid dimensions lose no edge column or row.
    #[must_use]
    pub fn view(&self, sight: Sight) -> OccupancyGrid {
        if matches!(sight, Sight::Full) {
            return self.shifted.clone();
        }
        let (reach_x, reach_y) = self.sight_extent(sight);
        let dims = self.shifted.dims();
        let center_x = dims.columns() / 2;
        let center_y = dims.rows() / 2;
        let window = GridDims::new(reach_x * 2, reach_y * 2);
        OccupancyGrid::from_fn(window, |cell| {
            let source = CellCoord::new(
                center_x - reach_x + cell.column(),
                center_y - reach_y + cell.row(),
            );
            self.shifted.is_blocked(source)
        })
    }

    /// Whether the straight segment between two points is unobstructed.
    ///
    /// Samples at derived-cell-size step length against the working grid.
    #[must_use]
    pub fn is_clean_path(&self, p1: Vec2, p2: Vec2) -> bool {
        clean_path(&self.working, self.grid_factor, p1, p2)
    }

    /// Whether any derived cell overlapped by the axis-aligned region is
    /// blocked.
    ///
    /// The region wraps around the arena seams; a degenerate region with no
    /// interior counts as blocked, the conservative answer for navigation.
    #[must_use]
    pub fn is_region_collision(&self, bottom_left: Vec2, top_right: Vec2) -> bool {
        let factor = self.grid_factor.max(1) as f32;
        let x1 = (bottom_left.x / factor).floor() as i64;
        let x2 = (top_right.x / factor).ceil() as i64;
        let y1 = (bottom_left.y / factor).floor() as i64;
        let y2 = (top_right.y / factor).ceil() as i64;

        let dims = self.working.dims();
        let span_x = x2 - x1;
        let span_y = y2 - y1;
        if span_x <= 0 || span_y <= 0 {
            return true;
        }
        let span_x = span_x.min(i64::from(dims.columns()));
        let span_y = span_y.min(i64::from(dims.rows()));

        for dy in 0..span_y {
            for dx in 0..span_x {
                if self.working.is_blocked(dims.wrap(x1 + dx, y1 + dy)) {
                    return true;
                }
            }
        }
        false
    }
}

/// Whether the straight segment from `p1` to `p2` crosses no blocked cell of
/// `grid`, sampling at `cell_size` step length.
///
/// The segment is the direct Euclidean segment between the two points; only
/// the per-sample cell lookup wraps around the torus. Both endpoints are
/// always sampled.
#[must_use]
pub fn clean_path(grid: &OccupancyGrid, cell_size: u32, p1: Vec2, p2: Vec2) -> bool {
    let dims = grid.dims();
    let diff = p2 - p1;
    let step = cell_size.max(1) as f32;
    let steps = (diff.length() / step).ceil() as u32;
    for sample in 0..=steps {
        let t = if steps == 0 {
            0.0
        } else {
            sample as f32 / steps as f32
        };
        let point = p1 + diff * t;
        if grid.is_blocked(cell_of(point, cell_size, dims)) {
            return false;
        }
    }
    true
}

fn build_fixed_grid(grid_factor: u32, scenario: &Scenario) -> Result<OccupancyGrid, ScenarioError> {
    let arena = scenario.arena();
    let cell_size = scenario.cell_size();
    let native_dims = scenario.grid().dims();

    if native_dims.cell_count() == 0 || cell_size == 0 {
        return Err(ScenarioError::EmptyGrid);
    }
    if native_dims.columns() * cell_size != arena.width()
        || native_dims.rows() * cell_size != arena.height()
    {
        return Err(ScenarioError::AspectMismatch {
            columns: native_dims.columns(),
            rows: native_dims.rows(),
            cell_size,
            width: arena.width(),
            height: arena.height(),
        });
    }
    if grid_factor == 0 || arena.width() % grid_factor != 0 {
        return Err(ScenarioError::CellSizeIndivisible {
            extent: arena.width(),
            cell_size: grid_factor,
        });
    }
    if arena.height() % grid_factor != 0 {
        return Err(ScenarioError::CellSizeIndivisible {
            extent: arena.height(),
            cell_size: grid_factor,
        });
    }
    if cell_size % grid_factor != 0 && grid_factor % cell_size != 0 {
        return Err(ScenarioError::FactorNotIntegral {
            native: cell_size,
            derived: grid_factor,
        });
    }

    let dims = GridDims::new(arena.width() / grid_factor, arena.height() / grid_factor);
    let mut fixed = OccupancyGrid::new(dims);
    let size = u64::from(cell_size);
    let factor = u64::from(grid_factor);
    for row in 0..native_dims.rows() {
        for column in 0..native_dims.columns() {
            if !scenario.grid().is_blocked(CellCoord::new(column, row)) {
                continue;
            }
            let x_start = size * u64::from(column) / factor;
            let x_end = (size * u64::from(column + 1)).div_ceil(factor);
            let y_start = size * u64::from(row) / factor;
            let y_end = (size * u64::from(row + 1)).div_ceil(factor);
            for y in y_start..y_end {
                for x in x_start..x_end {
                    fixed.block(CellCoord::new(x as u32, y as u32));
                }
            }
        }
    }
    Ok(fixed)
}
